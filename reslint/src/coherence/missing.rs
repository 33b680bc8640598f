use crate::{
    report::{ReportItem, ReportItemType},
    traits::FamilyValidator,
    types::{ResourceFamilyView, join_file_names},
};

/// Reports keys translated in some locales but not in others.
///
/// The root file is left out of the count. A key missing from every locale
/// but one is considered not yet translated and is not reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingTranslationValidator;

impl FamilyValidator for MissingTranslationValidator {
    fn validate(&self, view: &ResourceFamilyView<'_>) -> Vec<ReportItem> {
        let total = view.family().non_root_files().count();
        let missing = view.missing_files(true);
        if missing.is_empty() || missing.len() + 1 >= total {
            return Vec::new();
        }

        let reference = view
            .family()
            .root_file()
            .and_then(|root| root.get(view.key()))
            .or_else(|| view.existing().first().map(|(_, value)| *value))
            .unwrap_or_default();
        vec![ReportItem::new(
            ReportItemType::MissingTranslation,
            join_file_names(missing.iter().copied()),
            view.key(),
            reference,
            format!(
                "missing in {} of {} locales: {}",
                missing.len(),
                total,
                join_file_names(missing.iter().copied())
            ),
        )]
    }
}

use crate::{
    report::{ReportItem, ReportItemType},
    traits::FamilyValidator,
    types::{ResourceFamilyView, join_file_names},
};

use super::group_files;

/// Spots values copied across locales instead of being translated.
///
/// All existing values equal is an `IDENTICAL_TRANSLATION` notice. A single
/// value shared by more than half of the files is an
/// `ALMOST_IDENTICAL_TRANSLATION` warning located on the files that differ.
/// The root file takes part like any locale.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdenticalTranslationValidator;

impl FamilyValidator for IdenticalTranslationValidator {
    fn validate(&self, view: &ResourceFamilyView<'_>) -> Vec<ReportItem> {
        let existing = view.existing();
        if existing.len() < 2 {
            return Vec::new();
        }
        let groups = group_files(existing.iter().map(|(file, value)| (*file, *value)));
        let Some((majority, minorities)) = groups.split_first() else {
            return Vec::new();
        };

        if minorities.is_empty() {
            return vec![ReportItem::new(
                ReportItemType::IdenticalTranslation,
                join_file_names(majority.files.iter().copied()),
                view.key(),
                majority.key,
                format!("identical in all {} files", majority.files.len()),
            )];
        }

        if majority.files.len() * 2 <= existing.len() {
            return Vec::new();
        }
        let mut minority_files: Vec<_> = minorities
            .iter()
            .flat_map(|group| group.files.iter().copied())
            .collect();
        minority_files.sort_by(|a, b| a.file_name().cmp(b.file_name()));
        vec![ReportItem::new(
            ReportItemType::AlmostIdenticalTranslation,
            join_file_names(minority_files.iter().copied()),
            view.key(),
            majority.key,
            format!(
                "{} of {} files share this value ({}); only {} differ",
                majority.files.len(),
                existing.len(),
                join_file_names(majority.files.iter().copied()),
                join_file_names(minority_files.iter().copied())
            ),
        )]
    }
}

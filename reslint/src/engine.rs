//! The validation engine: one configured pipeline, run over whole families.

use std::{path::Path, sync::Arc};

use rayon::prelude::*;

use crate::{
    coherence::{
        HtmlTagCoherenceValidator, IdenticalTranslationValidator, MissingTranslationValidator,
        ParametricCoherenceValidator,
    },
    config::LintConfig,
    error::Error,
    formatter::Formatter,
    report::{Report, ReportItem, ReportItemType},
    spelling::SpellCheckResolver,
    traits::{FamilyValidator, ResourceValidator},
    types::{Resource, ResourceFamily},
    validators::{KeyClassifier, ResourceDispatcher, SpellCheckValidator},
};

/// A configured validation pipeline.
///
/// Building the engine compiles every regex and loads the schema and the
/// dictionaries, so all configuration errors surface here. Validation itself
/// never fails; findings go to the [`Report`].
///
/// ```rust,no_run
/// use reslint::{Engine, LintConfig};
///
/// let config = LintConfig::from_file("reslint.toml")?;
/// let engine = Engine::new(config)?;
/// let report = engine.validate_directory("src/main/resources/messages")?;
/// println!("{} errors", report.error_count());
/// # Ok::<(), reslint::Error>(())
/// ```
pub struct Engine {
    config: LintConfig,
    formatter: Arc<dyn Formatter>,
    excluded: KeyClassifier,
    dispatcher: ResourceDispatcher,
    family_validators: Vec<Box<dyn FamilyValidator>>,
    resolver: Option<Arc<SpellCheckResolver>>,
}

impl Engine {
    pub fn new(config: LintConfig) -> Result<Self, Error> {
        let formatter = config.formatter.build();

        let schema = config.html_schema.load()?;
        tracing::debug!(schema = %schema.name, elements = schema.elements.len(), "selected HTML schema");

        let resolver = match &config.dictionary_dir {
            Some(dir) => Some(Arc::new(SpellCheckResolver::from_dir(dir)?)),
            None => None,
        };
        let spellcheck = resolver
            .clone()
            .map(|resolver| Arc::new(SpellCheckValidator::new(resolver, formatter.clone())));

        let dispatcher =
            ResourceDispatcher::from_config(&config, formatter.clone(), Arc::new(schema), spellcheck)?;
        let family_validators: Vec<Box<dyn FamilyValidator>> = vec![
            Box::new(MissingTranslationValidator),
            Box::new(IdenticalTranslationValidator),
            Box::new(ParametricCoherenceValidator::new(formatter.clone())),
            Box::new(HtmlTagCoherenceValidator::new(
                KeyClassifier::new(&config.html_keys),
                formatter.clone(),
            )),
        ];

        Ok(Engine {
            excluded: KeyClassifier::new(&config.excluded_keys),
            config,
            formatter,
            dispatcher,
            family_validators,
            resolver,
        })
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    pub fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    /// Loads the directory as one family and validates it.
    pub fn validate_directory<P: AsRef<Path>>(&self, dir: P) -> Result<Report, Error> {
        let family = ResourceFamily::load_dir(dir, &self.config.file_extension)?;
        Ok(self.validate_family(&family))
    }

    /// Validates every key of the family. Keys are independent, so they are
    /// processed in parallel; the report keeps key order.
    pub fn validate_family(&self, family: &ResourceFamily) -> Report {
        let keys: Vec<&String> = family.keys().iter().collect();
        let per_key: Vec<Vec<ReportItem>> = keys
            .par_iter()
            .map(|key| self.validate_key(family, key))
            .collect();

        let mut report = Report::new();
        report.extend(per_key.into_iter().flatten());
        tracing::info!(
            family = %family.base_name(),
            keys = keys.len(),
            items = report.len(),
            errors = report.error_count(),
            "validation finished"
        );
        if let Some(resolver) = &self.resolver {
            tracing::debug!(locales = resolver.resolved_locales(), "spell checkers resolved");
        }
        report
    }

    /// Every finding for one key: per-file findings in file order, then the
    /// family-level ones. An excluded key only yields its `EXCLUDED` notice.
    pub fn validate_key(&self, family: &ResourceFamily, key: &str) -> Vec<ReportItem> {
        if self.excluded.matches(key) {
            let reference = family
                .root_file()
                .and_then(|root| root.get(key))
                .or_else(|| family.files().iter().find_map(|file| file.get(key)))
                .unwrap_or_default();
            return vec![ReportItem::new(
                ReportItemType::Excluded,
                family.base_name(),
                key,
                reference,
                "key excluded from validation",
            )];
        }

        let mut items = Vec::new();
        for file in family.files() {
            if let Some(value) = file.get(key) {
                let resource = Resource::new(family, file, key, value);
                items.extend(self.dispatcher.validate(&resource));
            }
        }
        let view = family.view(key);
        for validator in &self.family_validators {
            items.extend(validator.validate(&view));
        }
        items
    }
}

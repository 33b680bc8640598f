use regex::Regex;

use crate::{
    error::Error,
    report::{ReportItem, ReportItemType},
    traits::ResourceValidator,
    types::Resource,
};

/// Checks that references to other keys, located with a configured regex,
/// name keys present in the family. The referenced key is the first capture
/// group, or the whole match when the regex has no group.
#[derive(Debug, Clone)]
pub struct InnerResourceValidator {
    regex: Regex,
}

impl InnerResourceValidator {
    pub fn new(pattern: &str) -> Result<Self, Error> {
        Ok(InnerResourceValidator {
            regex: Regex::new(pattern)?,
        })
    }
}

impl ResourceValidator for InnerResourceValidator {
    fn validate(&self, resource: &Resource<'_>) -> Vec<ReportItem> {
        self.regex
            .captures_iter(resource.value)
            .filter_map(|captures| captures.get(1).or_else(|| captures.get(0)))
            .map(|reference| reference.as_str())
            .filter(|reference| !resource.family.contains_key(reference))
            .map(|reference| {
                ReportItem::new(
                    ReportItemType::InnerResource,
                    resource.file_name(),
                    resource.key,
                    resource.value,
                    format!("reference to unknown key \"{}\"", reference),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::test_support::family_with;

    #[test]
    fn test_reference_with_group() {
        let family = family_with("app.name", "Acme", "welcome = ${app.name} and ${app.missing}\n");
        let file = &family.files()[0];
        let value = file.get("welcome").unwrap();
        let validator = InnerResourceValidator::new(r"\$\{([\w.]+)\}").unwrap();
        let items = validator.validate(&Resource::new(&family, file, "welcome", value));
        assert_eq!(items.len(), 1);
        assert!(items[0].message.contains("app.missing"));
    }

    #[test]
    fn test_reference_without_group_uses_whole_match() {
        let family = family_with("app.name", "Acme", "welcome = see app.name or app.title\n");
        let file = &family.files()[0];
        let value = file.get("welcome").unwrap();
        let validator = InnerResourceValidator::new(r"app\.\w+").unwrap();
        let items = validator.validate(&Resource::new(&family, file, "welcome", value));
        assert_eq!(items.len(), 1);
        assert!(items[0].message.contains("app.title"));
    }

    #[test]
    fn test_invalid_regex() {
        assert!(matches!(
            InnerResourceValidator::new("("),
            Err(Error::Regex(_))
        ));
    }
}

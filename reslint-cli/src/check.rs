use reslint::{Engine, Error, LintConfig, Report, Severity};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Inputs of one `check` run.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub directory: PathBuf,
    pub config: Option<PathBuf>,
}

impl CheckOptions {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            config: None,
        }
    }

    pub fn with_config(mut self, config: impl Into<PathBuf>) -> Self {
        self.config = Some(config.into());
        self
    }
}

/// Loads the configuration (defaults when no file is given) and validates the directory.
pub fn run_check(options: &CheckOptions) -> Result<Report, Error> {
    let config = match &options.config {
        Some(path) => load_config(path)?,
        None => LintConfig::default(),
    };
    let engine = Engine::new(config)?;
    engine.validate_directory(&options.directory)
}

fn load_config(path: &Path) -> Result<LintConfig, Error> {
    if !path.is_file() {
        return Err(Error::InvalidConfig(format!(
            "configuration file not found: {}",
            path.display()
        )));
    }
    LintConfig::from_file(path)
}

/// Plain-text rendering: one line per collapsed finding, then a summary line.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    for (item, count) in report.collapsed() {
        if count > 1 {
            out.push_str(&format!("{} (x{})\n", item, count));
        } else {
            out.push_str(&format!("{}\n", item));
        }
    }
    out.push_str(&format!(
        "{} errors, {} warnings, {} notices\n",
        report.count(Severity::Error),
        report.count(Severity::Warn),
        report.count(Severity::Info)
    ));
    out
}

/// JSON rendering with a summary block and the sorted items.
pub fn render_json(report: &Report) -> Result<String, serde_json::Error> {
    let items: Vec<_> = report
        .collapsed()
        .into_iter()
        .map(|(item, count)| {
            json!({
                "severity": item.severity,
                "type": item.item_type,
                "title": item.item_type.title(),
                "file": item.location_file,
                "key": item.location_key,
                "raw_value": item.raw_value,
                "formatted_value": item.formatted_value,
                "message": item.message,
                "occurrences": count,
            })
        })
        .collect();
    let body = json!({
        "summary": {
            "errors": report.count(Severity::Error),
            "warnings": report.count(Severity::Warn),
            "notices": report.count(Severity::Info),
            "items": report.len(),
        },
        "items": items,
    });
    serde_json::to_string_pretty(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reslint::{ReportItem, ReportItemType};

    fn sample_report() -> Report {
        let mut report = Report::new();
        report.push(ReportItem::new(
            ReportItemType::TrailingWhitespace,
            "messages_fr.properties",
            "title",
            "Bonjour ",
            "value ends with whitespace",
        ));
        report.push(ReportItem::new(
            ReportItemType::HtmlValidation,
            "messages.properties",
            "intro.html",
            "<b>x",
            "unclosed element b",
        ));
        report.push(ReportItem::new(
            ReportItemType::HtmlValidation,
            "messages.properties",
            "intro.html",
            "<b>x",
            "unclosed element b",
        ));
        report
    }

    #[test]
    fn test_render_text_collapses_and_sorts() {
        let text = render_text(&sample_report());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("[ERROR] HTML_VALIDATION"));
        assert!(lines[0].ends_with("(x2)"));
        assert!(lines[1].starts_with("[WARN] TRAILING_WHITESPACE"));
        assert_eq!(lines[2], "2 errors, 1 warnings, 0 notices");
    }

    #[test]
    fn test_render_json_summary() {
        let json = render_json(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["errors"], 2);
        assert_eq!(value["summary"]["items"], 3);
        assert_eq!(value["items"][0]["type"], "HTML_VALIDATION");
        assert_eq!(value["items"][0]["occurrences"], 2);
    }

    #[test]
    fn test_missing_config_file() {
        let options = CheckOptions::new(".").with_config("/nonexistent/reslint.toml");
        assert!(matches!(run_check(&options), Err(Error::InvalidConfig(_))));
    }
}

use reslint::report::{ReportItemType, Severity};
use reslint::{Engine, Error, LintConfig, ResourceFamily};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_family(dir: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        fs::write(dir.join(name), content).expect("write fixture");
    }
}

fn items_of(report: &reslint::Report, item_type: ReportItemType) -> Vec<&reslint::ReportItem> {
    report
        .items()
        .iter()
        .filter(|item| item.item_type == item_type)
        .collect()
}

fn web_config() -> LintConfig {
    LintConfig::new()
        .with_html_keys(&[".html"])
        .with_js_keys(&[".js"])
        .with_url_keys(&[".url"])
        .with_text_keys(&[".text"])
        .with_excluded_keys(&["internal."])
}

#[test]
fn test_clean_family_has_no_errors() {
    let dir = TempDir::new().unwrap();
    write_family(
        dir.path(),
        &[
            (
                "messages.properties",
                "title.text = Welcome\nhelp.html = Read the <a href=\"/help\">guide</a>\nhome.url = https://example.com/\n",
            ),
            (
                "messages_fr.properties",
                "title.text = Bienvenue\nhelp.html = Lisez le <a href=\"/help\">guide</a>\nhome.url = https://example.fr/\n",
            ),
            (
                "messages_de.properties",
                "title.text = Willkommen\nhelp.html = Lesen Sie die <a href=\"/help\">Anleitung</a>\nhome.url = https://example.de/\n",
            ),
        ],
    );

    let report = Engine::new(web_config())
        .unwrap()
        .validate_directory(dir.path())
        .unwrap();
    assert_eq!(report.error_count(), 0, "{:#?}", report.items());
}

#[test]
fn test_findings_across_validators() {
    let dir = TempDir::new().unwrap();
    write_family(
        dir.path(),
        &[
            (
                "messages.properties",
                concat!(
                    "greeting.html = Hello <b>{0}</b>\n",
                    "quote.js = Say \"hi\"\n",
                    "logo.url = http://cdn.example.com/logo.png\n",
                    "plain.text = Visit http://example.com\n",
                    "internal.debug = <broken\n",
                    "count = {0} of {1}\n",
                    "count = {0} sur {1}\n",
                ),
            ),
            (
                "messages_fr.properties",
                concat!(
                    "greeting.html = Bonjour <i>{0}</i>\n",
                    "quote.js = Dites \\\\\"salut\\\\\"\n",
                    "logo.url = //cdn.example.com/logo.png\n",
                    "plain.text = Texte\n",
                    "count = {0} sur {2}\n",
                ),
            ),
        ],
    );

    let report = Engine::new(web_config())
        .unwrap()
        .validate_directory(dir.path())
        .unwrap();

    assert_eq!(items_of(&report, ReportItemType::DuplicateKey).len(), 1);
    assert_eq!(
        items_of(&report, ReportItemType::JsDoubleQuotedValidation).len(),
        1
    );
    let url = items_of(&report, ReportItemType::UrlValidation);
    assert_eq!(url.len(), 1);
    assert_eq!(url[0].location_file, "messages.properties");
    assert_eq!(items_of(&report, ReportItemType::TextValidationNoUrl).len(), 1);
    assert_eq!(items_of(&report, ReportItemType::Excluded).len(), 1);
    assert_eq!(items_of(&report, ReportItemType::IncoherentTags).len(), 1);
    assert_eq!(
        items_of(&report, ReportItemType::IncoherentParameters).len(),
        1
    );
    assert_eq!(report.error_count(), 4);
}

#[test]
fn test_missing_translations_ignore_root() {
    let dir = TempDir::new().unwrap();
    write_family(
        dir.path(),
        &[
            ("messages.properties", "a = A\nb = B\n"),
            ("messages_de.properties", "a = A-de\nb = B-de\n"),
            ("messages_fr.properties", "a = A-fr\nb = B-fr\n"),
            ("messages_it.properties", "a = A-it\n"),
            ("messages_es.properties", "a = A-es\n"),
        ],
    );
    let report = Engine::new(LintConfig::new())
        .unwrap()
        .validate_directory(dir.path())
        .unwrap();
    let missing = items_of(&report, ReportItemType::MissingTranslation);
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].location_key, "b");
    assert_eq!(
        missing[0].location_file,
        "messages_es.properties, messages_it.properties"
    );
    assert_eq!(missing[0].severity, Severity::Warn);
}

#[test]
fn test_spellcheck_with_locale_hierarchy() {
    let dir = TempDir::new().unwrap();
    let family_dir = dir.path().join("family");
    let dictionary_dir = dir.path().join("dictionaries");
    fs::create_dir_all(&family_dir).unwrap();
    fs::create_dir_all(&dictionary_dir).unwrap();

    write_family(
        &family_dir,
        &[
            ("app.properties", "intro.text = Welcome to Acme\n"),
            ("app_fr.properties", "intro.text = Bienvenu chez Acme\n"),
            ("app_fr_CA.properties", "intro.text = Bienvenue chez Acme\n"),
        ],
    );
    write_family(
        &dictionary_dir,
        &[
            ("words_fr.dic", "# French\nbienvenue\nchez\n"),
            ("names.dic", "Acme\n"),
        ],
    );

    let config = LintConfig::new()
        .with_text_keys(&[".text"])
        .with_dictionary_dir(dictionary_dir.clone());
    let report = Engine::new(config)
        .unwrap()
        .validate_directory(&family_dir)
        .unwrap();

    let spelling = items_of(&report, ReportItemType::Spellcheck);
    assert_eq!(spelling.len(), 1, "{:#?}", spelling);
    assert_eq!(spelling[0].location_file, "app_fr.properties");
    assert!(spelling[0].message.contains("Bienvenu (bienvenue)"));
    assert_eq!(report.error_count(), 0);
}

#[test]
fn test_config_file_round() {
    let dir = TempDir::new().unwrap();
    let family_dir = dir.path().join("family");
    fs::create_dir_all(&family_dir).unwrap();
    write_family(
        &family_dir,
        &[
            ("colors.txt", "primary.color = #00ff00\nsecondary.color = green\n"),
            ("colors_fr.txt", "primary.color = #00ff00\nsecondary.color = vert\n"),
        ],
    );
    let config_path = dir.path().join("reslint.toml");
    fs::write(
        &config_path,
        concat!(
            "file_extension = \"txt\"\n",
            "html_schema = \"strict\"\n",
            "[[custom_patterns]]\n",
            "name = \"hex color\"\n",
            "regex = \"#[0-9a-fA-F]{6}\"\n",
            "keys = [\".color\"]\n",
        ),
    )
    .unwrap();

    let config = LintConfig::from_file(&config_path).unwrap();
    let report = Engine::new(config)
        .unwrap()
        .validate_directory(&family_dir)
        .unwrap();
    assert_eq!(
        items_of(&report, ReportItemType::CustomPatternValidation).len(),
        2
    );
    assert_eq!(
        items_of(&report, ReportItemType::IdenticalTranslation).len(),
        1
    );
}

#[test]
fn test_malformed_escape_is_fatal() {
    let dir = TempDir::new().unwrap();
    write_family(
        dir.path(),
        &[
            ("messages.properties", "ok = fine\n"),
            ("messages_fr.properties", "bad = \\u12G4\n"),
        ],
    );
    let result = Engine::new(LintConfig::new())
        .unwrap()
        .validate_directory(dir.path());
    assert!(matches!(result, Err(Error::Parse { line: 1, .. })));
}

#[test]
fn test_empty_directory_is_fatal() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        ResourceFamily::load_dir(dir.path(), "properties"),
        Err(Error::InvalidFamily(_))
    ));
}

#[test]
fn test_report_sorting_and_collapsing() {
    let dir = TempDir::new().unwrap();
    write_family(
        dir.path(),
        &[
            ("messages.properties", "a = x \nb = <b>y</b>\nc = z\n"),
            ("messages_fr.properties", "a = x \nb = <b>y</b>\nc = z \n"),
        ],
    );
    let report = Engine::new(LintConfig::new())
        .unwrap()
        .validate_directory(dir.path())
        .unwrap();

    let sorted = report.sorted();
    assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(sorted.first().unwrap().severity, Severity::Warn);
    assert_eq!(sorted.last().unwrap().severity, Severity::Info);

    let collapsed = report.collapsed();
    let total: usize = collapsed.iter().map(|(_, count)| count).sum();
    assert_eq!(total, report.len());
}

#[test]
fn test_oversized_placeholders_are_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    write_family(
        dir.path(),
        &[
            (
                "messages.properties",
                "a.html = <b>{0}</b>\nb.html = <i>{1}</i> left\n",
            ),
            (
                "messages_fr.properties",
                "a.html = <b>{184467440737095517,number,percent}</b>\nb.html = <i>{1}</i> restant\n",
            ),
        ],
    );
    let report = Engine::new(web_config())
        .unwrap()
        .validate_directory(dir.path())
        .unwrap();

    let malformed = items_of(&report, ReportItemType::MalformedParameter);
    assert_eq!(malformed.len(), 1, "{:#?}", report.items());
    assert_eq!(malformed[0].location_file, "messages_fr.properties");
    assert_eq!(malformed[0].location_key, "a.html");
}

#[test]
fn test_oversized_c_style_width_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    write_family(
        dir.path(),
        &[
            ("messages.properties", "a.html = <b>%1$s</b>\n"),
            (
                "messages_de.properties",
                "a.html = <b>%1$18446744073709551615s</b>\n",
            ),
        ],
    );
    let config = web_config().with_formatter(reslint::formatter::FormatterKind::CStyle);
    let report = Engine::new(config)
        .unwrap()
        .validate_directory(dir.path())
        .unwrap();

    let malformed = items_of(&report, ReportItemType::MalformedParameter);
    assert_eq!(malformed.len(), 1, "{:#?}", report.items());
    assert_eq!(malformed[0].location_file, "messages_de.properties");
    assert!(malformed[0].message.contains("width or precision out of range"));
}

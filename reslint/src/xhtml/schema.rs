//! Element and attribute rules for markup inside resource values.
//!
//! Three schemas are built in; a custom one can be loaded from JSON with the
//! same shape as [`HtmlSchema`].

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::error::Error;

use super::{Element, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinSchema {
    /// XHTML 1.0 Strict.
    Strict,
    /// XHTML 1.0 Transitional, with presentational elements reported as deprecated.
    #[default]
    Transitional,
    /// The HTML5 vocabulary in XML syntax.
    Html5,
}

/// Where the markup schema comes from: a built-in name or a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum HtmlSchemaSource {
    Builtin(BuiltinSchema),
    File { path: PathBuf },
}

impl Default for HtmlSchemaSource {
    fn default() -> Self {
        HtmlSchemaSource::Builtin(BuiltinSchema::default())
    }
}

impl HtmlSchemaSource {
    pub fn load(&self) -> Result<HtmlSchema, Error> {
        match self {
            HtmlSchemaSource::Builtin(builtin) => Ok(HtmlSchema::builtin(*builtin)),
            HtmlSchemaSource::File { path } => HtmlSchema::from_file(path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ElementRule {
    #[serde(default)]
    pub attributes: BTreeSet<String>,
    #[serde(default)]
    pub required_attributes: BTreeSet<String>,
    /// Elements allowed as children.
    #[serde(default)]
    pub children: BTreeSet<String>,
    /// Whether non-whitespace character data is allowed.
    #[serde(default = "default_true")]
    pub text: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HtmlSchema {
    pub name: String,
    #[serde(default)]
    pub global_attributes: BTreeSet<String>,
    /// Attribute name prefixes allowed on every element, e.g. `aria-`.
    #[serde(default)]
    pub global_attribute_prefixes: Vec<String>,
    pub elements: BTreeMap<String, ElementRule>,
    /// Elements that are valid but reported with a warning.
    #[serde(default)]
    pub deprecated: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ViolationLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub level: ViolationLevel,
    pub message: String,
}

impl SchemaViolation {
    fn error(message: String) -> Self {
        SchemaViolation {
            level: ViolationLevel::Error,
            message,
        }
    }

    fn warning(message: String) -> Self {
        SchemaViolation {
            level: ViolationLevel::Warning,
            message,
        }
    }
}

impl HtmlSchema {
    pub fn builtin(kind: BuiltinSchema) -> Self {
        match kind {
            BuiltinSchema::Strict => STRICT.clone(),
            BuiltinSchema::Transitional => TRANSITIONAL.clone(),
            BuiltinSchema::Html5 => HTML5.clone(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let schema: HtmlSchema = serde_json::from_str(json)?;
        schema.check()?;
        Ok(schema)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Schema(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
            .map_err(|e| Error::Schema(format!("{}: {}", path.display(), e)))
    }

    /// Every child name must itself be declared.
    fn check(&self) -> Result<(), Error> {
        if !self.elements.contains_key("div") {
            return Err(Error::Schema(format!(
                "schema {} must declare the div element",
                self.name
            )));
        }
        for (name, rule) in &self.elements {
            if let Some(unknown) = rule
                .children
                .iter()
                .find(|child| !self.elements.contains_key(*child))
            {
                return Err(Error::Schema(format!(
                    "element {} lists undeclared child {}",
                    name, unknown
                )));
            }
        }
        Ok(())
    }

    fn allows_attribute(&self, rule: &ElementRule, attribute: &str) -> bool {
        rule.attributes.contains(attribute)
            || self.global_attributes.contains(attribute)
            || self
                .global_attribute_prefixes
                .iter()
                .any(|prefix| attribute.starts_with(prefix.as_str()))
    }

    /// Checks the nodes of `wrapper` as content of a `<div>`.
    pub fn validate(&self, wrapper: &Element) -> Vec<SchemaViolation> {
        let mut violations = Vec::new();
        if let Some(rule) = self.elements.get("div") {
            self.validate_children("div", rule, wrapper, &mut violations);
        }
        violations
    }

    fn validate_children(
        &self,
        parent: &str,
        rule: &ElementRule,
        element: &Element,
        violations: &mut Vec<SchemaViolation>,
    ) {
        for node in &element.children {
            match node {
                Node::Text(text) => {
                    if !rule.text && !text.trim().is_empty() {
                        violations.push(SchemaViolation::error(format!(
                            "character data is not allowed in <{}>",
                            parent
                        )));
                    }
                }
                Node::Element(child) => self.validate_element(parent, rule, child, violations),
            }
        }
    }

    fn validate_element(
        &self,
        parent: &str,
        parent_rule: &ElementRule,
        element: &Element,
        violations: &mut Vec<SchemaViolation>,
    ) {
        let name = element.name.as_str();
        let Some(rule) = self.elements.get(name) else {
            violations.push(SchemaViolation::error(format!(
                "element <{}> is not allowed by the {} schema",
                name, self.name
            )));
            return;
        };

        if !parent_rule.children.contains(name) {
            violations.push(SchemaViolation::error(format!(
                "element <{}> is not allowed inside <{}>",
                name, parent
            )));
        }
        if self.deprecated.contains(name) {
            violations.push(SchemaViolation::warning(format!(
                "element <{}> is deprecated",
                name
            )));
        }
        for (attribute, _) in &element.attributes {
            if !self.allows_attribute(rule, attribute) {
                violations.push(SchemaViolation::error(format!(
                    "attribute \"{}\" is not allowed on <{}>",
                    attribute, name
                )));
            }
        }
        for required in &rule.required_attributes {
            if !element.attributes.iter().any(|(key, _)| key == required) {
                violations.push(SchemaViolation::error(format!(
                    "element <{}> is missing required attribute \"{}\"",
                    name, required
                )));
            }
        }

        self.validate_children(name, rule, element, violations);
    }
}

const CORE_ATTRIBUTES: &[&str] = &["id", "class", "style", "title", "lang", "xml:lang", "dir"];

const EVENT_ATTRIBUTES: &[&str] = &[
    "onclick",
    "ondblclick",
    "onmousedown",
    "onmouseup",
    "onmouseover",
    "onmousemove",
    "onmouseout",
    "onkeypress",
    "onkeydown",
    "onkeyup",
];

const HTML5_GLOBAL_ATTRIBUTES: &[&str] = &[
    "hidden",
    "tabindex",
    "accesskey",
    "contenteditable",
    "draggable",
    "spellcheck",
    "translate",
    "role",
];

const PHRASE: &[&str] = &[
    "a", "abbr", "b", "bdo", "br", "cite", "code", "dfn", "em", "i", "img", "kbd", "q", "samp",
    "small", "span", "strong", "sub", "sup", "var", "label", "input", "select", "textarea",
    "button", "ins", "del", "map",
];

const STRICT_ONLY_PHRASE: &[&str] = &["acronym", "big", "tt"];
const TRANSITIONAL_PHRASE: &[&str] = &["font", "u", "s", "strike", "basefont", "iframe"];
const HTML5_PHRASE: &[&str] = &[
    "s", "u", "mark", "time", "wbr", "data", "bdi", "meter", "progress", "output",
];

const BLOCK: &[&str] = &[
    "address",
    "blockquote",
    "div",
    "dl",
    "fieldset",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "ol",
    "p",
    "pre",
    "table",
    "ul",
    "noscript",
];

const TRANSITIONAL_BLOCK: &[&str] = &["center", "dir", "menu"];
const HTML5_BLOCK: &[&str] = &[
    "section",
    "article",
    "aside",
    "header",
    "footer",
    "nav",
    "main",
    "figure",
    "details",
];

/// Incremental construction of the built-in schemas.
struct SchemaBuilder {
    schema: HtmlSchema,
    phrase: Vec<&'static str>,
    flow: Vec<&'static str>,
}

impl SchemaBuilder {
    fn new(name: &str, phrase: Vec<&'static str>, block: Vec<&'static str>) -> Self {
        let flow = phrase.iter().chain(block.iter()).copied().collect();
        let global_attributes = CORE_ATTRIBUTES
            .iter()
            .chain(EVENT_ATTRIBUTES)
            .map(|a| a.to_string())
            .collect();
        SchemaBuilder {
            schema: HtmlSchema {
                name: name.to_string(),
                global_attributes,
                global_attribute_prefixes: Vec::new(),
                elements: BTreeMap::new(),
                deprecated: BTreeSet::new(),
            },
            phrase,
            flow,
        }
    }

    fn element(&mut self, names: &[&str], attributes: &[&str], children: &[&str], text: bool) {
        for name in names {
            let rule = ElementRule {
                attributes: attributes.iter().map(|a| a.to_string()).collect(),
                required_attributes: BTreeSet::new(),
                children: children.iter().map(|c| c.to_string()).collect(),
                text,
            };
            self.schema.elements.insert(name.to_string(), rule);
        }
    }

    fn phrasing(&mut self, names: &[&str], attributes: &[&str]) {
        let phrase = self.phrase.clone();
        self.element(names, attributes, &phrase, true);
    }

    fn flowing(&mut self, names: &[&str], attributes: &[&str]) {
        let flow = self.flow.clone();
        self.element(names, attributes, &flow, true);
    }

    fn empty(&mut self, names: &[&str], attributes: &[&str]) {
        self.element(names, attributes, &[], false);
    }

    fn allow_attributes(&mut self, names: &[&str], attributes: &[&str]) {
        for name in names {
            if let Some(rule) = self.schema.elements.get_mut(*name) {
                rule.attributes.extend(attributes.iter().map(|a| a.to_string()));
            }
        }
    }

    fn require(&mut self, name: &str, attributes: &[&str]) {
        if let Some(rule) = self.schema.elements.get_mut(name) {
            rule.required_attributes
                .extend(attributes.iter().map(|a| a.to_string()));
        }
    }

    fn forbid_child(&mut self, name: &str, child: &str) {
        if let Some(rule) = self.schema.elements.get_mut(name) {
            rule.children.remove(child);
        }
    }

    /// Elements shared by every vocabulary.
    fn common(&mut self) {
        let phrase = self.phrase.clone();
        let inline_names: Vec<&str> = phrase
            .iter()
            .copied()
            .filter(|n| !matches!(*n, "a" | "br" | "img" | "input" | "select" | "textarea" | "map"))
            .collect();
        self.phrasing(&inline_names, &[]);
        self.phrasing(&["a"], &["href", "hreflang", "type", "rel", "accesskey", "tabindex"]);
        self.forbid_child("a", "a");
        self.phrasing(&["p", "h1", "h2", "h3", "h4", "h5", "h6", "address", "pre", "dt"], &[]);
        self.phrasing(&["label"], &["for", "accesskey"]);
        self.phrasing(&["legend", "caption"], &[]);
        self.allow_attributes(&["q"], &["cite"]);
        self.allow_attributes(&["bdo"], &["dir"]);
        self.allow_attributes(&["button"], &["name", "value", "type", "disabled"]);
        self.flowing(&["div", "li", "dd", "td", "th", "noscript", "fieldset"], &[]);
        self.flowing(&["ins", "del"], &["cite", "datetime"]);
        self.allow_attributes(
            &["td", "th"],
            &["colspan", "rowspan", "headers", "scope", "abbr", "align", "valign"],
        );

        self.empty(&["br"], &[]);
        self.empty(&["hr"], &[]);
        self.empty(
            &["img"],
            &["src", "alt", "width", "height", "usemap", "ismap", "longdesc"],
        );
        self.require("img", &["src", "alt"]);
        self.empty(
            &["input"],
            &["type", "name", "value", "checked", "disabled", "readonly", "size", "maxlength"],
        );
        self.element(&["textarea"], &["name", "rows", "cols", "disabled", "readonly"], &[], true);
        self.element(&["select"], &["name", "size", "multiple", "disabled"], &["option", "optgroup"], false);
        self.element(&["optgroup"], &["label", "disabled"], &["option"], false);
        self.element(&["option"], &["value", "selected", "disabled", "label"], &[], true);
        self.element(&["map"], &["name"], &["area"], false);
        self.empty(&["area"], &["href", "alt", "shape", "coords"]);

        self.element(&["ul", "ol"], &[], &["li"], false);
        self.element(&["dl"], &[], &["dt", "dd"], false);
        self.element(
            &["table"],
            &["summary", "width", "border", "frame", "rules", "cellspacing", "cellpadding"],
            &["caption", "colgroup", "col", "thead", "tbody", "tfoot", "tr"],
            false,
        );
        self.element(&["colgroup"], &["span", "width"], &["col"], false);
        self.empty(&["col"], &["span", "width"]);
        self.element(&["thead", "tbody", "tfoot"], &[], &["tr"], false);
        self.element(&["tr"], &[], &["td", "th"], false);

        let mut form_children = self.flow.clone();
        form_children.retain(|c| *c != "form");
        self.element(&["form"], &["action", "method", "name", "enctype"], &form_children, true);
        let mut fieldset_children = self.flow.clone();
        fieldset_children.push("legend");
        self.element(&["fieldset"], &[], &fieldset_children, true);
    }

    fn deprecate(&mut self, names: &[&str]) {
        self.schema
            .deprecated
            .extend(names.iter().map(|n| n.to_string()));
    }

    fn build(self) -> HtmlSchema {
        self.schema
    }
}

fn concat(parts: &[&[&'static str]]) -> Vec<&'static str> {
    parts.iter().flat_map(|p| p.iter().copied()).collect()
}

fn build_strict() -> HtmlSchema {
    let mut builder = SchemaBuilder::new(
        "strict",
        concat(&[PHRASE, STRICT_ONLY_PHRASE]),
        BLOCK.to_vec(),
    );
    builder.common();
    let block = BLOCK.to_vec();
    builder.element(&["blockquote"], &["cite"], &block, false);
    builder.element(&["noscript"], &[], &block, false);
    builder.build()
}

fn build_transitional() -> HtmlSchema {
    let mut builder = SchemaBuilder::new(
        "transitional",
        concat(&[PHRASE, STRICT_ONLY_PHRASE, TRANSITIONAL_PHRASE]),
        concat(&[BLOCK, TRANSITIONAL_BLOCK]),
    );
    builder.common();
    builder.flowing(&["blockquote"], &["cite"]);
    builder.flowing(&["center"], &[]);
    builder.element(&["dir", "menu"], &["compact"], &["li"], false);
    builder.phrasing(&["u", "s", "strike"], &[]);
    builder.phrasing(&["font"], &["size", "color", "face"]);
    builder.empty(&["basefont"], &["size", "color", "face"]);
    builder.flowing(
        &["iframe"],
        &["src", "name", "width", "height", "frameborder", "scrolling", "marginwidth", "marginheight", "longdesc"],
    );
    builder.allow_attributes(
        &["p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "caption", "legend"],
        &["align"],
    );
    builder.allow_attributes(&["a", "form", "area"], &["target"]);
    builder.allow_attributes(&["a"], &["name", "charset", "rev"]);
    builder.allow_attributes(&["img"], &["align", "border", "hspace", "vspace", "name"]);
    builder.allow_attributes(&["br"], &["clear"]);
    builder.allow_attributes(&["hr"], &["align", "noshade", "size", "width"]);
    builder.allow_attributes(&["ul", "ol", "li"], &["type", "compact"]);
    builder.allow_attributes(&["ol"], &["start"]);
    builder.allow_attributes(&["li"], &["value"]);
    builder.allow_attributes(&["table", "tr", "td", "th"], &["bgcolor", "align"]);
    builder.allow_attributes(&["td", "th"], &["width", "height", "nowrap"]);
    builder.deprecate(&[
        "font", "center", "u", "s", "strike", "basefont", "dir", "menu", "iframe",
    ]);
    builder.build()
}

fn build_html5() -> HtmlSchema {
    let mut builder = SchemaBuilder::new(
        "html5",
        concat(&[PHRASE, HTML5_PHRASE]),
        concat(&[BLOCK, HTML5_BLOCK]),
    );
    builder.common();
    builder.flowing(&["blockquote"], &["cite"]);
    builder.flowing(
        &["section", "article", "aside", "header", "footer", "nav", "main"],
        &[],
    );
    let mut figure_children = builder.flow.clone();
    figure_children.push("figcaption");
    builder.element(&["figure"], &[], &figure_children, true);
    builder.flowing(&["figcaption"], &[]);
    let mut details_children = builder.flow.clone();
    details_children.push("summary");
    builder.element(&["details"], &["open"], &details_children, true);
    builder.phrasing(&["summary"], &[]);
    builder.phrasing(&["s", "u", "mark", "bdi"], &[]);
    builder.phrasing(&["time"], &["datetime"]);
    builder.phrasing(&["data"], &["value"]);
    builder.phrasing(&["meter"], &["value", "min", "max", "low", "high", "optimum"]);
    builder.phrasing(&["progress"], &["value", "max"]);
    builder.phrasing(&["output"], &["for", "name"]);
    builder.empty(&["wbr"], &[]);
    builder.allow_attributes(&["a"], &["target", "download", "ping", "referrerpolicy"]);
    builder.allow_attributes(&["area"], &["target", "download", "rel"]);
    builder.allow_attributes(
        &["img"],
        &["srcset", "sizes", "loading", "decoding", "crossorigin", "referrerpolicy"],
    );
    builder.allow_attributes(&["ol"], &["start", "reversed", "type"]);
    builder.allow_attributes(&["li"], &["value"]);
    builder.allow_attributes(
        &["input"],
        &["placeholder", "required", "autocomplete", "min", "max", "step", "pattern"],
    );
    builder
        .schema
        .global_attributes
        .extend(HTML5_GLOBAL_ATTRIBUTES.iter().map(|a| a.to_string()));
    builder.schema.global_attribute_prefixes.push("aria-".to_string());
    builder.build()
}

lazy_static! {
    static ref STRICT: HtmlSchema = build_strict();
    static ref TRANSITIONAL: HtmlSchema = build_transitional();
    static ref HTML5: HtmlSchema = build_html5();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xhtml::parse_strict;

    fn violations(kind: BuiltinSchema, value: &str) -> Vec<SchemaViolation> {
        let wrapper = parse_strict(value).unwrap();
        HtmlSchema::builtin(kind).validate(&wrapper)
    }

    fn errors(kind: BuiltinSchema, value: &str) -> usize {
        violations(kind, value)
            .iter()
            .filter(|v| v.level == ViolationLevel::Error)
            .count()
    }

    #[test]
    fn test_builtin_schemas_are_consistent() {
        for kind in [BuiltinSchema::Strict, BuiltinSchema::Transitional, BuiltinSchema::Html5] {
            HtmlSchema::builtin(kind).check().unwrap();
        }
    }

    #[test]
    fn test_valid_markup() {
        let value = r#"Click <a href="/help" class="x">here</a> for <b>help</b>.<br/>"#;
        for kind in [BuiltinSchema::Strict, BuiltinSchema::Transitional, BuiltinSchema::Html5] {
            assert!(violations(kind, value).is_empty(), "{:?}", kind);
        }
    }

    #[test]
    fn test_unknown_element_and_attribute() {
        assert_eq!(errors(BuiltinSchema::Strict, "<blink>x</blink>"), 1);
        assert_eq!(errors(BuiltinSchema::Strict, r#"<b foo="1">x</b>"#), 1);
    }

    #[test]
    fn test_content_model() {
        assert_eq!(errors(BuiltinSchema::Strict, "<p><div>x</div></p>"), 1);
        assert_eq!(errors(BuiltinSchema::Strict, "<ul>text<li>x</li></ul>"), 1);
        assert_eq!(errors(BuiltinSchema::Strict, "<a href='x'><a href='y'>z</a></a>"), 1);
        assert_eq!(errors(BuiltinSchema::Strict, "<ul>\n  <li>x</li>\n</ul>"), 0);
    }

    #[test]
    fn test_required_attributes() {
        assert_eq!(errors(BuiltinSchema::Strict, r#"<img src="x.png"/>"#), 1);
        assert_eq!(errors(BuiltinSchema::Strict, r#"<img src="x.png" alt=""/>"#), 0);
    }

    #[test]
    fn test_deprecated_elements_warn_in_transitional() {
        let found = violations(BuiltinSchema::Transitional, r#"<font color="red">x</font>"#);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].level, ViolationLevel::Warning);
        assert_eq!(errors(BuiltinSchema::Strict, r#"<font color="red">x</font>"#), 1);
    }

    #[test]
    fn test_html5_vocabulary() {
        assert_eq!(errors(BuiltinSchema::Html5, r#"<mark aria-label="x">y</mark>"#), 0);
        assert_eq!(errors(BuiltinSchema::Html5, "<acronym>x</acronym>"), 1);
        assert_eq!(errors(BuiltinSchema::Strict, "<mark>x</mark>"), 1);
    }

    #[test]
    fn test_custom_schema_from_json() {
        let json = r#"{
            "name": "tiny",
            "elements": {
                "div": { "children": ["b"] },
                "b": {}
            }
        }"#;
        let schema = HtmlSchema::from_json_str(json).unwrap();
        let wrapper = parse_strict("<b>x</b><i>y</i>").unwrap();
        assert_eq!(schema.validate(&wrapper).len(), 1);
    }

    #[test]
    fn test_custom_schema_rejects_undeclared_child() {
        let json = r#"{"name": "bad", "elements": {"div": {"children": ["b"]}}}"#;
        assert!(matches!(
            HtmlSchema::from_json_str(json),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn test_schema_source_deserialize() {
        #[derive(Deserialize)]
        struct Holder {
            schema: HtmlSchemaSource,
        }
        let builtin: Holder = toml::from_str(r#"schema = "html5""#).unwrap();
        assert_eq!(builtin.schema, HtmlSchemaSource::Builtin(BuiltinSchema::Html5));
        let file: Holder = toml::from_str(r#"schema = { path = "s.json" }"#).unwrap();
        assert_eq!(
            file.schema,
            HtmlSchemaSource::File {
                path: PathBuf::from("s.json")
            }
        );
    }
}

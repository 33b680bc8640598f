//! Synthetic XHTML documents built around resource values.
//!
//! A value is wrapped in `<html><body><div>…</div></body></html>` behind a
//! doctype that declares the common HTML named entities, then parsed into a
//! small element tree. The strict parse stops at the first well-formedness
//! error; the lenient parse swallows errors and keeps whatever it had built.

pub mod schema;

use indoc::formatdoc;
use lazy_static::lazy_static;
use quick_xml::{Reader, events::BytesStart, events::Event};
use regex::Regex;

pub use schema::{BuiltinSchema, HtmlSchema, HtmlSchemaSource, SchemaViolation, ViolationLevel};

lazy_static! {
    static ref DATA_ATTRIBUTE_REGEX: Regex =
        Regex::new(r#"\s+data-[A-Za-z0-9_.:-]+\s*=\s*(?:"[^"]*"|'[^']*')"#).unwrap();
    static ref SCAFFOLD_PREFIX: String = {
        let declarations: String = ENTITIES
            .iter()
            .map(|(name, value)| {
                let code = value.chars().next().map(u32::from).unwrap_or_default();
                format!("  <!ENTITY {} \"&#{};\">\n", name, code)
            })
            .collect();
        formatdoc! {r#"
                <?xml version="1.0" encoding="UTF-8"?>
                <!DOCTYPE html [
                {}]>
                <html xmlns="http://www.w3.org/1999/xhtml"><head><title>resource</title></head><body><div>"#,
            declarations
        }
    };
}

const SCAFFOLD_SUFFIX: &str = "</div></body></html>";

/// Named entities declared by the scaffold, beyond the five XML ones.
pub const ENTITIES: &[(&str, &str)] = &[
    ("nbsp", "\u{a0}"),
    ("iexcl", "¡"),
    ("cent", "¢"),
    ("pound", "£"),
    ("yen", "¥"),
    ("sect", "§"),
    ("copy", "©"),
    ("laquo", "«"),
    ("reg", "®"),
    ("deg", "°"),
    ("plusmn", "±"),
    ("micro", "µ"),
    ("para", "¶"),
    ("middot", "·"),
    ("raquo", "»"),
    ("iquest", "¿"),
    ("times", "×"),
    ("divide", "÷"),
    ("agrave", "à"),
    ("aacute", "á"),
    ("ccedil", "ç"),
    ("egrave", "è"),
    ("eacute", "é"),
    ("ecirc", "ê"),
    ("ntilde", "ñ"),
    ("ouml", "ö"),
    ("uuml", "ü"),
    ("szlig", "ß"),
    ("ndash", "–"),
    ("mdash", "—"),
    ("lsquo", "‘"),
    ("rsquo", "’"),
    ("sbquo", "‚"),
    ("ldquo", "“"),
    ("rdquo", "”"),
    ("bdquo", "„"),
    ("bull", "•"),
    ("hellip", "…"),
    ("permil", "‰"),
    ("lsaquo", "‹"),
    ("rsaquo", "›"),
    ("euro", "€"),
    ("trade", "™"),
    ("larr", "←"),
    ("rarr", "→"),
    ("thinsp", "\u{2009}"),
    ("zwnj", "\u{200c}"),
    ("zwj", "\u{200d}"),
    ("shy", "\u{ad}"),
];

/// Wraps `content` in the synthetic document.
pub fn scaffold(content: &str) -> String {
    let mut document =
        String::with_capacity(SCAFFOLD_PREFIX.len() + content.len() + SCAFFOLD_SUFFIX.len());
    document.push_str(&SCAFFOLD_PREFIX);
    document.push_str(content);
    document.push_str(SCAFFOLD_SUFFIX);
    document
}

/// Removes `data-*="…"` custom attributes, which no schema can enumerate.
pub fn strip_data_attributes(content: &str) -> String {
    DATA_ATTRIBUTE_REGEX.replace_all(content, "").into_owned()
}

/// Replaces character and entity references. Text with a malformed or
/// unknown reference is returned unchanged.
pub fn unescape_entities(text: &str) -> String {
    quick_xml::escape::unescape_with(text, resolve_entity)
        .map(|unescaped| unescaped.into_owned())
        .unwrap_or_else(|_| text.to_string())
}

fn resolve_entity(name: &str) -> Option<&'static str> {
    match name {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        _ => ENTITIES.iter().find(|(n, _)| *n == name).map(|(_, v)| *v),
    }
}

/// A node of the parsed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Element::default()
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Every text node below this element, in document order.
    pub fn text_nodes(&self) -> Vec<&str> {
        let mut texts = Vec::new();
        collect_text(self, &mut texts);
        texts
    }

    /// Canonical shape of the element tree below this element: tag names
    /// and nesting are kept, sibling order and text are not.
    pub fn tag_signature(&self) -> String {
        let mut children: Vec<String> = self
            .child_elements()
            .map(|child| format!("{}({})", child.name, child.tag_signature()))
            .collect();
        children.sort();
        children.concat()
    }
}

fn collect_text<'a>(element: &'a Element, texts: &mut Vec<&'a str>) {
    for child in &element.children {
        match child {
            Node::Text(text) => texts.push(text),
            Node::Element(e) => collect_text(e, texts),
        }
    }
}

/// A well-formedness error, with the offset into the original value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XhtmlError {
    pub message: String,
    pub offset: usize,
}

impl std::fmt::Display for XhtmlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (at offset {})", self.message, self.offset)
    }
}

/// Parses the value inside the scaffold, failing on the first error.
/// Returns the wrapper `<div>` holding the value's nodes.
pub fn parse_strict(content: &str) -> Result<Element, XhtmlError> {
    let (wrapper, error) = parse(content);
    match error {
        Some(error) => Err(error),
        None => Ok(wrapper),
    }
}

/// Parses the value inside the scaffold, ignoring malformed markup.
pub fn parse_lenient(content: &str) -> Element {
    parse(content).0
}

fn parse(content: &str) -> (Element, Option<XhtmlError>) {
    let document = scaffold(content);
    let prefix_len = SCAFFOLD_PREFIX.len();
    let mut reader = Reader::from_str(&document);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = vec![Element::new("#document")];
    let error = loop {
        let position = reader.buffer_position() as usize;
        let fail = |message: String| XhtmlError {
            message,
            offset: position.saturating_sub(prefix_len),
        };
        match reader.read_event() {
            Ok(Event::Start(e)) => match element_from(&e) {
                Ok(element) => stack.push(element),
                Err(message) => break Some(fail(message)),
            },
            Ok(Event::Empty(e)) => match element_from(&e) {
                Ok(element) => append(&mut stack, Node::Element(element)),
                Err(message) => break Some(fail(message)),
            },
            Ok(Event::End(_)) => {
                if stack.len() > 1
                    && let Some(element) = stack.pop()
                {
                    append(&mut stack, Node::Element(element));
                }
            }
            Ok(Event::Text(e)) => match e.unescape_with(resolve_entity) {
                Ok(text) => append(&mut stack, Node::Text(text.into_owned())),
                Err(err) => break Some(fail(err.to_string())),
            },
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                append(&mut stack, Node::Text(text));
            }
            Ok(Event::Eof) => {
                if stack.len() > 1 {
                    let open = stack.last().map(|e| e.name.clone()).unwrap_or_default();
                    break Some(fail(format!("element <{}> is never closed", open)));
                }
                break None;
            }
            Ok(_) => {}
            Err(err) => break Some(fail(err.to_string())),
        }
    };

    // Close whatever is still open so a partial tree is available
    while stack.len() > 1 {
        if let Some(element) = stack.pop() {
            append(&mut stack, Node::Element(element));
        }
    }
    let document_node = stack.pop().unwrap_or_default();
    (find_wrapper(document_node), error)
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, String> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attribute.value).into_owned();
        let value = quick_xml::escape::unescape_with(&raw, resolve_entity)
            .map_err(|e| format!("attribute {}: {}", key, e))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn append(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

/// Walks `html > body > div` down to the element wrapping the value.
fn find_wrapper(document: Element) -> Element {
    let mut current = document;
    for name in ["html", "body", "div"] {
        let next = current.children.into_iter().find_map(|n| match n {
            Node::Element(e) if e.name == name => Some(e),
            _ => None,
        });
        match next {
            Some(element) => current = element,
            None => return Element::new("div"),
        }
    }
    current
}

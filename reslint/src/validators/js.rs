//! JavaScript string literal content.

use std::sync::Arc;

use crate::{
    report::{ReportItem, ReportItemType},
    traits::ResourceValidator,
    types::Resource,
};

use super::HtmlValidator;

/// Validates values pasted into a JS string literal.
///
/// The quote terminating the literal and raw line breaks must be escaped.
/// The unescaped content then goes through the HTML validator, since it
/// usually ends up in the DOM.
#[derive(Debug)]
pub struct JsValidator {
    double_quoted: bool,
    html: Arc<HtmlValidator>,
}

impl JsValidator {
    pub fn new(double_quoted: bool, html: Arc<HtmlValidator>) -> Self {
        JsValidator {
            double_quoted,
            html,
        }
    }

    fn quote(&self) -> char {
        if self.double_quoted { '"' } else { '\'' }
    }
}

impl ResourceValidator for JsValidator {
    fn validate(&self, resource: &Resource<'_>) -> Vec<ReportItem> {
        let mut items = Vec::new();
        let item = |item_type: ReportItemType, message: String| {
            ReportItem::new(
                item_type,
                resource.file_name(),
                resource.key,
                resource.value,
                message,
            )
        };

        let quote = self.quote();
        if let Some(position) = find_unescaped(resource.value, quote) {
            let item_type = if self.double_quoted {
                ReportItemType::JsDoubleQuotedValidation
            } else {
                ReportItemType::JsSingleQuotedValidation
            };
            items.push(item(
                item_type,
                format!("unescaped {} at offset {}", quote, position),
            ));
        }
        if let Some(position) = resource.value.find(['\n', '\r']) {
            items.push(item(
                ReportItemType::JsNewlineValidation,
                format!("unescaped line break at offset {}", position),
            ));
        }

        let content = js_unescape(resource.value);
        items.extend(self.html.validate_markup(resource, &content));
        items
    }
}

/// Byte offset of the first `quote` not preceded by an odd run of backslashes.
fn find_unescaped(value: &str, quote: char) -> Option<usize> {
    let mut backslashes = 0;
    for (i, c) in value.char_indices() {
        if c == '\\' {
            backslashes += 1;
            continue;
        }
        if c == quote && backslashes % 2 == 0 {
            return Some(i);
        }
        backslashes = 0;
    }
    None
}

/// Interprets JS string escapes. Invalid numeric escapes are kept verbatim.
pub fn js_unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            out.push('\\');
            break;
        };
        match escaped {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !chars.peek().is_some_and(char::is_ascii_digit) => out.push('\0'),
            'x' => push_hex(&mut out, &mut chars, 2, "\\x"),
            'u' if chars.peek() == Some(&'{') => {
                chars.next();
                let digits: String = chars.by_ref().take_while(|c| *c != '}').collect();
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push_str("\\u{");
                        out.push_str(&digits);
                        out.push('}');
                    }
                }
            }
            'u' => push_hex(&mut out, &mut chars, 4, "\\u"),
            // Line continuation
            '\n' => {}
            other => out.push(other),
        }
    }
    out
}

fn push_hex(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    count: usize,
    prefix: &str,
) {
    let mut digits = String::with_capacity(count);
    while digits.len() < count {
        match chars.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                digits.push(*c);
                chars.next();
            }
            _ => break,
        }
    }
    let decoded = (digits.len() == count)
        .then(|| u32::from_str_radix(&digits, 16).ok())
        .flatten()
        .and_then(char::from_u32);
    match decoded {
        Some(ch) => out.push(ch),
        None => {
            out.push_str(prefix);
            out.push_str(&digits);
        }
    }
}

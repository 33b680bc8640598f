//! `{0}`-style parametric messages.
//!
//! Within a parametric value a single quote starts or ends a literal section
//! and `''` stands for one quote. Elements are `{index}`, `{index,type}` or
//! `{index,type,style}` with type `number`, `date`, `time` or `choice`.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;

use super::{Formatter, FormattingError, collapse_doubled_quotes};

lazy_static! {
    static ref PARAMETER_REGEX: Regex = Regex::new(r"\{(\d+)(?:,\w+){0,2}\}").unwrap();
    static ref QUOTE_RUN_REGEX: Regex = Regex::new(r"'+").unwrap();
}

const MAX_NESTING: usize = 8;
/// Argument numbers are non-negative `int`s.
const MAX_ARGUMENT_INDEX: u64 = i32::MAX as u64;

#[derive(Debug, Clone, Copy, Default)]
pub struct MessageFormatter;

impl MessageFormatter {
    pub fn new() -> Self {
        MessageFormatter
    }
}

impl Formatter for MessageFormatter {
    fn is_parametric(&self, value: &str) -> bool {
        PARAMETER_REGEX.is_match(value)
    }

    fn capture_parameters(&self, value: &str) -> Vec<usize> {
        PARAMETER_REGEX
            .captures_iter(value)
            .filter_map(|c| c[1].parse::<usize>().ok())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn default_format(&self, value: &str) -> Result<String, FormattingError> {
        if !self.is_parametric(value) {
            return Ok(collapse_doubled_quotes(value));
        }
        format_pattern(value, 0)
    }

    fn display_indexed_parameter(&self, index: usize) -> String {
        format!("{{{}}}", index)
    }

    /// An odd run of quotes opens or closes a literal section. Runs touching a
    /// brace are deliberate escapes of that brace and are not reported.
    fn has_unescaped_quote(&self, value: &str) -> bool {
        if !self.is_parametric(value) {
            return false;
        }
        QUOTE_RUN_REGEX.find_iter(value).any(|run| {
            let odd = run.as_str().len() % 2 == 1;
            let before = value[..run.start()].chars().next_back();
            let after = value[run.end()..].chars().next();
            let escapes_brace =
                matches!(before, Some('{' | '}')) || matches!(after, Some('{' | '}'));
            odd && !escapes_brace
        })
    }
}

fn format_pattern(pattern: &str, depth: usize) -> Result<String, FormattingError> {
    if depth > MAX_NESTING {
        return Err(FormattingError::malformed("choice formats nested too deeply"));
    }

    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut in_quote = false;

    while let Some(c) = chars.next() {
        match c {
            '\'' if chars.peek() == Some(&'\'') => {
                chars.next();
                out.push('\'');
            }
            '\'' => in_quote = !in_quote,
            '{' if !in_quote => {
                let mut element = String::new();
                let mut nesting = 1;
                let mut quoted = false;
                loop {
                    let Some(ch) = chars.next() else {
                        return Err(FormattingError::malformed("unmatched braces in the pattern"));
                    };
                    match ch {
                        '\'' => quoted = !quoted,
                        '{' if !quoted => nesting += 1,
                        '}' if !quoted => {
                            nesting -= 1;
                            if nesting == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    element.push(ch);
                }
                out.push_str(&format_element(&element, depth)?);
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn format_element(element: &str, depth: usize) -> Result<String, FormattingError> {
    let mut parts = element.splitn(3, ',');
    let index_part = parts.next().unwrap_or_default().trim();
    let index = index_part
        .parse::<u64>()
        .ok()
        .filter(|&index| index <= MAX_ARGUMENT_INDEX)
        .ok_or_else(|| {
            FormattingError::malformed(format!("can't parse argument number: {}", index_part))
        })?;
    let format_type = parts.next().map(|t| t.trim().to_ascii_lowercase());
    let style = parts.next().map(str::trim);

    match (format_type.as_deref(), style) {
        (None, _) => Ok(index.to_string()),
        (Some("number"), None | Some("integer")) => Ok(index.to_string()),
        (Some("number"), Some("percent")) => index
            .checked_mul(100)
            .map(|percent| format!("{}%", percent))
            .ok_or_else(|| FormattingError::malformed("percent value out of range")),
        (Some("number"), Some("currency")) => Ok(format!("¤{}.00", index)),
        (Some("number"), Some(_)) => Ok(index.to_string()),
        (Some("date" | "time"), _) => Ok(index.to_string()),
        (Some("choice"), Some(style)) => {
            let selected = select_choice(style, index as f64)?;
            if selected.contains('{') {
                format_pattern(&selected, depth + 1)
            } else {
                Ok(collapse_doubled_quotes(&selected))
            }
        }
        (Some("choice"), None) => Err(FormattingError::malformed("choice format without limits")),
        (Some(other), _) => Err(FormattingError::malformed(format!(
            "unknown format type: {}",
            other
        ))),
    }
}

/// Picks the sub-pattern of a choice style (`0#none|1#one|1<many`) for `value`.
fn select_choice(style: &str, value: f64) -> Result<String, FormattingError> {
    let mut selected: Option<String> = None;
    let mut first: Option<String> = None;

    for segment in split_choice_segments(style) {
        let relation = segment.find(['#', '<', '\u{2264}']).ok_or_else(|| {
            FormattingError::malformed(format!("choice without limit: {}", segment))
        })?;
        let limit_text = segment[..relation].trim();
        let relation_char = segment[relation..].chars().next().unwrap_or('#');
        let text = &segment[relation + relation_char.len_utf8()..];

        let limit = match limit_text {
            "\u{221E}" => f64::INFINITY,
            "-\u{221E}" => f64::NEG_INFINITY,
            _ => limit_text.parse::<f64>().map_err(|_| {
                FormattingError::malformed(format!("invalid choice limit: {}", limit_text))
            })?,
        };
        let matches = if relation_char == '<' {
            value > limit
        } else {
            value >= limit
        };

        if first.is_none() {
            first = Some(text.to_string());
        }
        if matches {
            selected = Some(text.to_string());
        }
    }

    selected
        .or(first)
        .ok_or_else(|| FormattingError::malformed("empty choice format"))
}

fn split_choice_segments(style: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut nesting = 0;
    for (i, c) in style.char_indices() {
        match c {
            '\'' => quoted = !quoted,
            '{' if !quoted => nesting += 1,
            '}' if !quoted => nesting -= 1,
            '|' if !quoted && nesting == 0 => {
                segments.push(&style[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&style[start..]);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatter() -> MessageFormatter {
        MessageFormatter::new()
    }

    #[test]
    fn test_is_parametric() {
        let f = formatter();
        assert!(f.is_parametric("Hello {0}"));
        assert!(f.is_parametric("{1,number,integer} items"));
        assert!(!f.is_parametric("Hello {name}"));
        assert!(!f.is_parametric("No parameters"));
    }

    #[test]
    fn test_capture_sorted_and_distinct() {
        let f = formatter();
        assert_eq!(f.capture_parameters("{2} and {0} then {2}"), vec![0, 2]);
        assert_eq!(
            f.capture_parameters("{1} {0}"),
            f.capture_parameters("{0} {1}")
        );
    }

    #[test]
    fn test_default_format_substitutes_indices() {
        let f = formatter();
        assert_eq!(f.default_format("{0} of {1}").unwrap(), "0 of 1");
        assert_eq!(f.default_format("{2,number}").unwrap(), "2");
        assert_eq!(f.default_format("{3,number,percent}").unwrap(), "300%");
    }

    #[test]
    fn test_default_format_quotes() {
        let f = formatter();
        assert_eq!(f.default_format("it''s {0}").unwrap(), "it's 0");
        assert_eq!(f.default_format("'{0}' is {0}").unwrap(), "{0} is 0");
    }

    #[test]
    fn test_non_parametric_quote_collapse_is_idempotent() {
        let f = formatter();
        let once = f.default_format("l''avion").unwrap();
        assert_eq!(once, "l'avion");
        assert_eq!(f.default_format(&once).unwrap(), once);
    }

    #[test]
    fn test_choice_format() {
        let f = formatter();
        let pattern = "{0,choice,0#no files|1#one file|1<{0,number,integer} files}";
        assert_eq!(f.default_format(pattern).unwrap(), "no files");
        let pattern = "{1,choice,0#none|1#one|1<many}";
        assert_eq!(f.default_format(pattern).unwrap(), "one");
        let pattern = "{2,choice,0#none|1<{2} files}";
        assert_eq!(f.default_format(pattern).unwrap(), "2 files");
    }

    #[test]
    fn test_malformed_patterns() {
        let f = formatter();
        assert!(f.default_format("{0} and {1").is_err());
        assert!(f.default_format("{0} {1,currency}").is_err());
        assert!(f.default_format("{0} {x}").is_err());
        assert!(f.default_format("{0,choice,abc}").is_err());
    }

    #[test]
    fn test_oversized_argument_numbers() {
        let f = formatter();
        let err = f
            .default_format("{184467440737095517,number,percent}")
            .unwrap_err();
        assert!(err.to_string().contains("can't parse argument number"));
        assert!(f.default_format("{99999999999999999999999}").is_err());
        assert!(f.default_format("{2147483648}").is_err());
        assert_eq!(f.default_format("{2147483647}").unwrap(), "2147483647");
        assert_eq!(
            f.default_format("{2147483647,number,percent}").unwrap(),
            "214748364700%"
        );
    }

    #[test]
    fn test_unescaped_quote_detection() {
        let f = formatter();
        assert!(f.has_unescaped_quote("Don't delete {0}"));
        assert!(!f.has_unescaped_quote("Don''t delete {0}"));
        assert!(!f.has_unescaped_quote("Don't worry"));
        assert!(!f.has_unescaped_quote("Use '{' for {0}"));
        assert!(f.has_unescaped_quote("'''x {0}"));
    }

    #[test]
    fn test_quote_scan_handles_long_values() {
        let f = formatter();
        let value = format!("{{0}} {}", "a''b ".repeat(5000));
        assert!(!f.has_unescaped_quote(&value));
        assert!(f.default_format(&value).is_ok());
    }

    #[test]
    fn test_display_indexed_parameter() {
        assert_eq!(formatter().display_indexed_parameter(3), "{3}");
    }
}

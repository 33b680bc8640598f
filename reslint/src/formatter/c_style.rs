//! `%1$s`-style parametric messages.
//!
//! Rendering understands positional (`%2$s`), ordinary (`%s`) and relative
//! (`%<s`) argument indexing. Parameter capture only sees explicit positional
//! indices: values written with ordinary or relative indexing are not treated
//! as parametric.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;

use super::{Formatter, FormattingError, collapse_doubled_quotes};

lazy_static! {
    // An even run of `%` before the placeholder keeps `%%1$s` from matching
    static ref PARAMETER_REGEX: Regex = Regex::new(r"(?:^|[^%])(?:%%)*%(\d+)\$").unwrap();
    static ref SPECIFIER_REGEX: Regex =
        Regex::new(r"^%(\d+\$)?([-#+ 0,(<]*)(\d+)?(\.\d+)?([tT])?([a-zA-Z%])").unwrap();
}

/// Upper bound on a width or precision; larger fields are malformed.
const MAX_FIELD_WIDTH: usize = 4096;
const MAX_ARGUMENT_INDEX: usize = i32::MAX as usize;

#[derive(Debug, Clone, Copy, Default)]
pub struct CStyleFormatter;

impl CStyleFormatter {
    pub fn new() -> Self {
        CStyleFormatter
    }
}

impl Formatter for CStyleFormatter {
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
        format_specifiers(value)
    }

    fn display_indexed_parameter(&self, index: usize) -> String {
        format!("%{}$s", index)
    }
}

/// One parsed `%[index$][flags][width][.precision]conversion`.
#[derive(Debug)]
struct Specifier<'a> {
    index: Option<usize>,
    flags: &'a str,
    width: Option<usize>,
    precision: Option<usize>,
    date_time: bool,
    conversion: char,
}

fn format_specifiers(value: &str) -> Result<String, FormattingError> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    let mut ordinal = 0usize;
    let mut last_argument: Option<usize> = None;

    while let Some(percent) = rest.find('%') {
        out.push_str(&rest[..percent]);
        let candidate = &rest[percent..];
        let captures = SPECIFIER_REGEX.captures(candidate).ok_or_else(|| {
            FormattingError::malformed(format!(
                "unknown format conversion near '{}'",
                candidate.chars().take(4).collect::<String>()
            ))
        })?;
        let whole = captures.get(0).map_or(1, |m| m.end());

        let specifier = Specifier {
            index: captures
                .get(1)
                .map(|m| {
                    m.as_str()
                        .trim_end_matches('$')
                        .parse::<usize>()
                        .ok()
                        .filter(|&index| index <= MAX_ARGUMENT_INDEX)
                        .ok_or_else(|| FormattingError::malformed("argument index out of range"))
                })
                .transpose()?,
            flags: captures.get(2).map_or("", |m| m.as_str()),
            width: parse_number(captures.get(3).map(|m| m.as_str()))?,
            precision: parse_number(captures.get(4).map(|m| &m.as_str()[1..]))?,
            date_time: captures.get(5).is_some(),
            conversion: captures
                .get(6)
                .and_then(|m| m.as_str().chars().next())
                .unwrap_or('%'),
        };

        let argument = if matches!(specifier.conversion, '%' | 'n') && !specifier.date_time {
            None
        } else if specifier.flags.contains('<') {
            Some(last_argument.ok_or_else(|| {
                FormattingError::malformed("relative index '<' without a previous argument")
            })?)
        } else if let Some(index) = specifier.index {
            if index == 0 {
                return Err(FormattingError::malformed("argument index 0 is not allowed"));
            }
            Some(index)
        } else {
            ordinal += 1;
            Some(ordinal)
        };
        if argument.is_some() {
            last_argument = argument;
        }

        out.push_str(&render(&specifier, argument.unwrap_or_default() as i64)?);
        rest = &candidate[whole..];
    }
    out.push_str(rest);

    Ok(out)
}

fn parse_number(text: Option<&str>) -> Result<Option<usize>, FormattingError> {
    text.map(|t| {
        t.parse::<usize>()
            .ok()
            .filter(|&n| n <= MAX_FIELD_WIDTH)
            .ok_or_else(|| FormattingError::malformed("width or precision out of range"))
    })
    .transpose()
}

fn render(spec: &Specifier<'_>, argument: i64) -> Result<String, FormattingError> {
    let flags = spec.flags.replace('<', "");
    check_flag_set(&flags, spec.width)?;

    if spec.date_time {
        return Err(FormattingError::malformed(format!(
            "date/time conversion '{}' cannot format an integer",
            spec.conversion
        )));
    }

    let conversion = spec.conversion;
    let body = match conversion {
        'b' | 'B' | 'h' | 'H' | 's' | 'S' => {
            only_flags(&flags, "-", conversion)?;
            let text = match conversion.to_ascii_lowercase() {
                'b' => "true".to_string(),
                'h' => format!("{:x}", argument),
                _ => argument.to_string(),
            };
            let text = match spec.precision {
                Some(precision) => text.chars().take(precision).collect(),
                None => text,
            };
            if conversion.is_ascii_uppercase() {
                text.to_uppercase()
            } else {
                text
            }
        }
        'c' | 'C' => {
            only_flags(&flags, "-", conversion)?;
            no_precision(spec, conversion)?;
            let c = u32::try_from(argument)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| FormattingError::malformed("illegal code point"))?;
            if conversion == 'C' {
                c.to_uppercase().collect()
            } else {
                c.to_string()
            }
        }
        'd' => {
            only_flags(&flags, "-+ 0,(", conversion)?;
            no_precision(spec, conversion)?;
            let digits = if flags.contains(',') {
                group_thousands(argument.unsigned_abs())
            } else {
                argument.unsigned_abs().to_string()
            };
            let sign = if argument < 0 {
                if flags.contains('(') { "(" } else { "-" }
            } else if flags.contains('+') {
                "+"
            } else if flags.contains(' ') {
                " "
            } else {
                ""
            };
            let suffix = if argument < 0 && flags.contains('(') { ")" } else { "" };
            return Ok(pad_number(sign, &digits, suffix, &flags, spec.width));
        }
        'o' | 'x' | 'X' => {
            only_flags(&flags, "-#0", conversion)?;
            no_precision(spec, conversion)?;
            let (prefix, digits) = match conversion {
                'o' => ("0", format!("{:o}", argument as i32)),
                'x' => ("0x", format!("{:x}", argument as i32)),
                _ => ("0X", format!("{:X}", argument as i32)),
            };
            let prefix = if flags.contains('#') { prefix } else { "" };
            return Ok(pad_number(prefix, &digits, "", &flags, spec.width));
        }
        '%' => {
            only_flags(&flags, "-", conversion)?;
            no_precision(spec, conversion)?;
            "%".to_string()
        }
        'n' => {
            if !flags.is_empty() || spec.width.is_some() || spec.precision.is_some() {
                return Err(FormattingError::malformed(
                    "line separator takes no flags, width or precision",
                ));
            }
            return Ok("\n".to_string());
        }
        'e' | 'E' | 'f' | 'g' | 'G' | 'a' | 'A' => {
            return Err(FormattingError::malformed(format!(
                "conversion '{}' cannot format an integer",
                conversion
            )));
        }
        other => {
            return Err(FormattingError::malformed(format!(
                "unknown format conversion '{}'",
                other
            )));
        }
    };

    Ok(pad(&body, &flags, spec.width))
}

fn check_flag_set(flags: &str, width: Option<usize>) -> Result<(), FormattingError> {
    let mut seen = BTreeSet::new();
    for flag in flags.chars() {
        if !seen.insert(flag) {
            return Err(FormattingError::malformed(format!("duplicate flag '{}'", flag)));
        }
    }
    if (seen.contains(&'-') || seen.contains(&'0')) && width.is_none() {
        return Err(FormattingError::malformed("flag requires a width"));
    }
    if seen.contains(&'-') && seen.contains(&'0') {
        return Err(FormattingError::malformed("flags '-' and '0' are exclusive"));
    }
    if seen.contains(&'+') && seen.contains(&' ') {
        return Err(FormattingError::malformed("flags '+' and ' ' are exclusive"));
    }
    Ok(())
}

fn only_flags(flags: &str, allowed: &str, conversion: char) -> Result<(), FormattingError> {
    match flags.chars().find(|f| !allowed.contains(*f)) {
        Some(flag) => Err(FormattingError::malformed(format!(
            "flag '{}' does not apply to conversion '{}'",
            flag, conversion
        ))),
        None => Ok(()),
    }
}

fn no_precision(spec: &Specifier<'_>, conversion: char) -> Result<(), FormattingError> {
    match spec.precision {
        Some(_) => Err(FormattingError::malformed(format!(
            "conversion '{}' takes no precision",
            conversion
        ))),
        None => Ok(()),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn pad_number(
    prefix: &str,
    digits: &str,
    suffix: &str,
    flags: &str,
    width: Option<usize>,
) -> String {
    let len = prefix.chars().count() + digits.chars().count() + suffix.chars().count();
    match width {
        Some(width) if flags.contains('0') && width > len => {
            format!("{}{}{}{}", prefix, "0".repeat(width - len), digits, suffix)
        }
        _ => pad(&format!("{}{}{}", prefix, digits, suffix), flags, width),
    }
}

fn pad(body: &str, flags: &str, width: Option<usize>) -> String {
    let len = body.chars().count();
    match width {
        Some(width) if width > len && flags.contains('-') => {
            format!("{}{}", body, " ".repeat(width - len))
        }
        Some(width) if width > len => format!("{}{}", " ".repeat(width - len), body),
        _ => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatter() -> CStyleFormatter {
        CStyleFormatter::new()
    }

    #[test]
    fn test_is_parametric_requires_positional_index() {
        let f = formatter();
        assert!(f.is_parametric("Hello %1$s"));
        assert!(!f.is_parametric("Hello %s"));
        assert!(!f.is_parametric("100%% done"));
        assert!(!f.is_parametric("literal %%1$s"));
        assert!(f.is_parametric("%%%1$s"));
    }

    #[test]
    fn test_capture_is_order_independent() {
        let f = formatter();
        assert_eq!(f.capture_parameters("%2$s then %1$d"), vec![1, 2]);
        assert_eq!(
            f.capture_parameters("%1$d then %2$s"),
            f.capture_parameters("%2$s then %1$d")
        );
    }

    #[test]
    fn test_default_format_positional() {
        let f = formatter();
        assert_eq!(f.default_format("%2$s of %1$s").unwrap(), "2 of 1");
        assert_eq!(f.default_format("%1$05d|%2$-3s|").unwrap(), "00001|2  |");
        assert_eq!(f.default_format("%1$#x %2$+d").unwrap(), "0x1 +2");
        assert_eq!(f.default_format("%1$s 50%%").unwrap(), "1 50%");
        assert_eq!(f.default_format("%1$b %1$S").unwrap(), "true 1");
    }

    #[test]
    fn test_default_format_ordinary_and_relative() {
        let f = formatter();
        assert_eq!(f.default_format("%1$s %s %s %<s").unwrap(), "1 1 2 2");
    }

    #[test]
    fn test_malformed_conversions_are_uniform() {
        let f = formatter();
        for value in [
            "%1$f",
            "%1$q",
            "%1$#d",
            "%1$.2d",
            "%1$-d",
            "%1$tY",
            "%1$+x",
            "%0$s",
            "%1$s %",
            "%1$18446744073709551615s",
            "%1$1000000000000s",
            "%1$.99999999999999999999s",
            "%99999999999$s",
        ] {
            let err = f.default_format(value).unwrap_err();
            assert_eq!(
                err.kind,
                crate::formatter::FormattingErrorKind::MalformedParameter,
                "{}",
                value
            );
        }
    }

    #[test]
    fn test_grouping() {
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(12), "12");
    }

    #[test]
    fn test_display_indexed_parameter() {
        assert_eq!(formatter().display_indexed_parameter(2), "%2$s");
    }
}

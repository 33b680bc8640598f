//! Support for the `.properties` key/value resource format.
//!
//! Parsing follows the classic grammar: `#`/`!` comment lines, `=`, `:` or
//! whitespace separators, backslash line continuation, `\t \n \r \f \uXXXX`
//! escapes and `\<c>` → `<c>` for anything else. Malformed `\u` escapes are
//! fatal. Repeated keys are kept (last one wins) and recorded so they can be
//! reported.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::{error::Error, traits::Parser};

const WHITESPACE: [char; 3] = [' ', '\t', '\x0c'];

/// A parsed `.properties` file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertiesFile {
    /// Entries in file order. Keys are unique.
    pub entries: Vec<(String, String)>,
    /// Every key that was written more than once, in encounter order.
    pub duplicates: Vec<DuplicateKey>,
}

/// A key assigned a second time in the same file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey {
    pub key: String,
    /// The value the key had before this assignment.
    pub previous_value: String,
    pub value: String,
    /// 1-based line of the repeated assignment.
    pub line: usize,
}

impl PropertiesFile {
    /// Parses already decoded content. `file` is used for error messages only.
    pub fn parse(content: &str, file: &str) -> Result<Self, Error> {
        let lines = natural_lines(content);
        let mut entries: Vec<(String, String)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut duplicates = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            let line_number = i + 1;
            let first = lines[i].trim_start_matches(WHITESPACE);
            i += 1;
            if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
                continue;
            }

            let mut logical = first.to_string();
            let mut continued = has_continuation(first);
            while continued {
                logical.pop();
                let Some(next) = lines.get(i) else {
                    break;
                };
                let next = next.trim_start_matches(WHITESPACE);
                logical.push_str(next);
                continued = has_continuation(next);
                i += 1;
            }

            let (raw_key, raw_value) = split_key_value(&logical);
            let key = unescape(raw_key, file, line_number)?;
            let value = unescape(raw_value, file, line_number)?;

            match index.get(&key) {
                Some(&position) => {
                    let previous_value =
                        std::mem::replace(&mut entries[position].1, value.clone());
                    duplicates.push(DuplicateKey {
                        key,
                        previous_value,
                        value,
                        line: line_number,
                    });
                }
                None => {
                    index.insert(key.clone(), entries.len());
                    entries.push((key, value));
                }
            }
        }

        Ok(PropertiesFile {
            entries,
            duplicates,
        })
    }
}

impl Parser for PropertiesFile {
    fn from_reader<R: std::io::BufRead>(mut reader: R) -> Result<Self, Error> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::parse(&content, "<input>")
    }

    /// Override default file reading to support BOM-aware decoding (e.g. UTF-16 files).
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(Error::Io)?;
        // Auto-detect BOM, decode to UTF-8; invalid UTF-8 is replaced, not rejected
        let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .encoding(Some(encoding_rs::UTF_8))
            .bom_override(true)
            .build(file);

        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded).map_err(Error::Io)?;

        Self::parse(&decoded, &path.display().to_string())
    }
}

fn natural_lines(content: &str) -> Vec<&str> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = Vec::new();
    let mut start = 0;
    let bytes = content.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&content[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&content[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < content.len() {
        lines.push(&content[start..]);
    }
    lines
}

/// A natural line continues when it ends with an odd number of backslashes.
fn has_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_key_value(logical: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = logical.len();
    let mut separator = None;
    for (pos, c) in logical.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || WHITESPACE.contains(&c) {
            key_end = pos;
            separator = Some(c);
            break;
        }
    }

    let key = &logical[..key_end];
    let Some(separator) = separator else {
        return (key, "");
    };

    let mut rest = &logical[key_end + separator.len_utf8()..];
    if WHITESPACE.contains(&separator) {
        rest = rest.trim_start_matches(WHITESPACE);
        if let Some(stripped) = rest.strip_prefix(['=', ':']) {
            rest = stripped;
        }
    }
    (key, rest.trim_start_matches(WHITESPACE))
}

fn unescape(raw: &str, file: &str, line: usize) -> Result<String, Error> {
    if !raw.contains('\\') {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = (hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()))
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .ok_or_else(|| {
                        Error::parse_error(
                            file,
                            line,
                            format!("malformed \\uxxxx encoding: \\u{}", hex),
                        )
                    })?;
                push_code_unit(&mut out, code, &mut chars);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

/// Escapes encode UTF-16 code units; a high surrogate followed by an escaped
/// low surrogate forms one scalar value. Lone surrogates become U+FFFD.
fn push_code_unit(out: &mut String, code: u32, rest: &mut std::str::Chars<'_>) {
    if let Some(c) = char::from_u32(code) {
        out.push(c);
        return;
    }
    if (0xD800..0xDC00).contains(&code) {
        let lookahead = rest.as_str();
        if let Some(hex) = lookahead.strip_prefix("\\u").and_then(|s| s.get(..4))
            && let Ok(low) = u32::from_str_radix(hex, 16)
            && (0xDC00..0xE000).contains(&low)
        {
            let scalar = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
            if let Some(c) = char::from_u32(scalar) {
                out.push(c);
                for _ in 0..6 {
                    rest.next();
                }
                return;
            }
        }
    }
    out.push(char::REPLACEMENT_CHARACTER);
}

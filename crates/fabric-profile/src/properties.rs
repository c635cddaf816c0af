//! `.properties` codec
//!
//! Parsing accepts the usual line oriented format:
//!
//! - lines end at `\n`, `\r\n` or a lone `\r`
//! - `key=value`, `key: value` and `key value` entries
//! - `#` and `!` comment lines, blank lines
//! - a line ending in an odd number of backslashes continues on the next
//!   line, whose leading whitespace is dropped
//! - escapes `\t \n \r \f \uXXXX`; any other escaped character stands for
//!   itself (so `\=`, `\:`, `\ ` and `\#` are literal)
//!
//! Serialization writes one `key=value` line per entry in key order and
//! escapes whatever the parser would otherwise interpret, so a map survives
//! a write/read cycle unchanged.

use std::collections::BTreeMap;

use fabric_errors::ProfileError;

use crate::ProfileResult;

/// Decoded key/value content of a `.properties` file.
pub type Properties = BTreeMap<String, String>;

/// Parse `.properties` content.
///
/// `source_name` is only used in error messages.
///
/// # Errors
///
/// Returns [`ProfileError::InvalidFormat`] if the content is not UTF-8 or
/// contains a malformed `\u` escape.
pub fn parse(source_name: &str, bytes: &[u8]) -> ProfileResult<Properties> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ProfileError::invalid_format(source_name, e.to_string()))?;

    let mut props = Properties::new();
    let mut lines = natural_lines(text);

    while let Some(natural) = lines.next() {
        let line = natural.trim_start_matches(is_whitespace);
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let mut logical = line.to_string();
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start_matches(is_whitespace)),
                None => break,
            }
        }

        let (raw_key, raw_value) = split_entry(&logical);
        let key = unescape(source_name, &raw_key)?;
        let value = unescape(source_name, &raw_value)?;
        props.insert(key, value);
    }

    Ok(props)
}

/// Serialize properties, one `key=value` line per entry in key order.
pub fn to_bytes(props: &Properties) -> Vec<u8> {
    let mut out = String::new();
    for (key, value) in props {
        escape_into(&mut out, key, true);
        out.push('=');
        escape_into(&mut out, value, false);
        out.push('\n');
    }
    out.into_bytes()
}

/// Lines of `text`, each terminated by `\n`, `\r\n` or `\r`.
fn natural_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text).filter(|t| !t.is_empty());
    std::iter::from_fn(move || {
        let current = rest?;
        match current.find(['\n', '\r']) {
            Some(end) => {
                let (line, tail) = current.split_at(end);
                let skip = if tail.starts_with("\r\n") { 2 } else { 1 };
                rest = tail.get(skip..).filter(|t| !t.is_empty());
                Some(line)
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Split a logical line into raw (still escaped) key and value.
fn split_entry(line: &str) -> (String, String) {
    let mut chars = line.chars().peekable();
    let mut key = String::new();
    let mut escaped = false;

    while let Some(&c) = chars.peek() {
        if !escaped && (c == '=' || c == ':' || is_whitespace(c)) {
            break;
        }
        escaped = !escaped && c == '\\';
        key.push(c);
        chars.next();
    }

    while chars.next_if(|c| is_whitespace(*c)).is_some() {}
    if chars.next_if(|c| *c == '=' || *c == ':').is_some() {
        while chars.next_if(|c| is_whitespace(*c)).is_some() {}
    }

    (key, chars.collect())
}

fn unescape(source_name: &str, raw: &str) -> ProfileResult<String> {
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
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        ProfileError::invalid_format(
                            source_name,
                            format!("malformed \\u escape: \\u{hex}"),
                        )
                    })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            // Dangling backslash at end of input
            None => {}
        }
    }

    Ok(out)
}

fn escape_into(out: &mut String, text: &str, is_key: bool) {
    for (i, c) in text.chars().enumerate() {
        match c {
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                out.push_str(&format!("\\u{:04X}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
}

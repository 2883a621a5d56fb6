//! MIME media type handling.
//!
//! The same grammar covers `Content-Type` (RFC 2045) and
//! `Content-Disposition` (RFC 2183) values: a type token with optional
//! `; name=value` parameters. Parameter continuations and extended values
//! from RFC 2231 are merged and decoded.

use crate::error::{Error, Result};
use encoding_rs::Encoding;
use std::collections::HashMap;

/// Media type with parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    /// Lowercased value without parameters (e.g. "text/plain", "attachment").
    pub essence: String,
    /// Parameters keyed by lowercased name (e.g. charset=utf-8, boundary=xxx).
    pub parameters: HashMap<String, String>,
}

impl MediaType {
    /// Returns the value without parameters.
    #[must_use]
    pub fn essence(&self) -> &str {
        &self.essence
    }

    /// Main type (e.g. "text"), or the whole value when there is no slash.
    #[must_use]
    pub fn main_type(&self) -> &str {
        self.essence
            .split_once('/')
            .map_or(self.essence.as_str(), |(main, _)| main)
    }

    /// Returns a parameter by case-insensitive name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.parameters
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the charset parameter if present.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.param("charset")
    }

    /// Returns the boundary parameter if present.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.param("boundary")
    }

    /// Checks if this is a multipart content type.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.main_type() == "multipart"
    }

    /// Parses a media type string.
    ///
    /// Format: `type/subtype; param1=value1; param2="quoted value"`. The
    /// subtype may be absent, which is how disposition values look.
    ///
    /// Unquoted values run up to the next `;`, so sloppy values containing
    /// spaces or specials are accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is missing or not a token, if a
    /// parameter lacks `=` or a value, if a quoted string is unterminated,
    /// or if a parameter name repeats.
    pub fn parse(s: &str) -> Result<Self> {
        let (base, mut rest) = s.find(';').map_or((s, ""), |i| s.split_at(i));

        let essence = base.trim().to_ascii_lowercase();
        if essence.is_empty() {
            return Err(Error::media_type(s, "no media type"));
        }
        let valid = match essence.split_once('/') {
            Some((main, sub)) => is_token(main) && is_token(sub),
            None => is_token(&essence),
        };
        if !valid {
            return Err(Error::media_type(s, "type is not a token"));
        }

        let mut raw: Vec<(String, String)> = Vec::new();
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }
            rest = rest
                .strip_prefix(';')
                .ok_or_else(|| Error::media_type(s, format!("unexpected text {rest:?}")))?
                .trim_start();
            if rest.is_empty() || rest.starts_with(';') {
                continue;
            }

            let key_len = rest.find(|c: char| !is_token_char(c)).unwrap_or(rest.len());
            if key_len == 0 {
                return Err(Error::media_type(s, "invalid parameter name"));
            }
            let key = rest[..key_len].to_ascii_lowercase();
            rest = rest[key_len..]
                .trim_start()
                .strip_prefix('=')
                .ok_or_else(|| Error::media_type(s, format!("missing '=' after {key:?}")))?
                .trim_start();

            let (value, remaining) = consume_value(rest)
                .ok_or_else(|| Error::media_type(s, format!("invalid value for {key:?}")))?;
            rest = remaining;

            if raw.iter().any(|(existing, _)| *existing == key) {
                return Err(Error::media_type(s, format!("duplicate parameter {key:?}")));
            }
            raw.push((key, value));
        }

        Ok(Self {
            essence,
            parameters: merge_continuations(raw),
        })
    }
}

/// RFC 2045 token characters: printable ASCII minus tspecials.
const fn is_token_char(c: char) -> bool {
    c.is_ascii_graphic()
        && !matches!(
            c,
            '(' | ')' | '<' | '>' | '@' | ',' | ';' | ':' | '\\' | '"' | '/' | '[' | ']' | '?' | '='
        )
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_token_char)
}

/// Consumes a quoted string or a bare value, returning it with the rest of
/// the input.
fn consume_value(s: &str) -> Option<(String, &str)> {
    if let Some(quoted) = s.strip_prefix('"') {
        let mut value = String::new();
        let mut chars = quoted.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => return Some((value, &quoted[i + 1..])),
                '\\' => value.push(chars.next()?.1),
                _ => value.push(c),
            }
        }
        // Unterminated
        return None;
    }

    let end = s.find(';').unwrap_or(s.len());
    let value = s[..end].trim_end();
    (!value.is_empty()).then(|| (value.to_string(), &s[end..]))
}

/// Splits an RFC 2231 key into (name, section, is-encoded).
///
/// `title*` is an encoded single value, `title*0` a plain section and
/// `title*1*` an encoded section.
fn split_extended_key(key: &str) -> Option<(&str, u32, bool)> {
    let (name, rest) = key.split_once('*')?;
    if name.is_empty() {
        return None;
    }
    if rest.is_empty() {
        return Some((name, 0, true));
    }
    let (digits, encoded) = rest
        .strip_suffix('*')
        .map_or((rest, false), |digits| (digits, true));
    let section = digits.parse().ok()?;
    Some((name, section, encoded))
}

fn merge_continuations(raw: Vec<(String, String)>) -> HashMap<String, String> {
    let mut merged = HashMap::new();
    let mut sections: HashMap<String, Vec<(u32, bool, String)>> = HashMap::new();

    for (key, value) in raw {
        match split_extended_key(&key) {
            Some((name, section, encoded)) => sections
                .entry(name.to_string())
                .or_default()
                .push((section, encoded, value)),
            None => {
                merged.insert(key, value);
            }
        }
    }

    for (name, mut parts) in sections {
        parts.sort_by_key(|(section, ..)| *section);
        if let Some(value) = decode_sections(&parts) {
            merged.insert(name, value);
        }
    }

    merged
}

/// Joins contiguous sections starting at 0 and decodes the result with the
/// charset named by the first encoded section.
fn decode_sections(parts: &[(u32, bool, String)]) -> Option<String> {
    let mut bytes = Vec::new();
    let mut charset = None;

    for (expected, (section, encoded, value)) in (0..).zip(parts) {
        if *section != expected {
            break;
        }
        if !*encoded {
            bytes.extend_from_slice(value.as_bytes());
            continue;
        }
        let data = if expected == 0 {
            let mut fields = value.splitn(3, '\'');
            let (Some(name), Some(_language), Some(data)) =
                (fields.next(), fields.next(), fields.next())
            else {
                return None;
            };
            charset = Some(name);
            data
        } else {
            value.as_str()
        };
        bytes.extend(percent_encoding::percent_decode_str(data));
    }

    match charset.map(str::trim).filter(|name| !name.is_empty()) {
        Some(label) => {
            let encoding = Encoding::for_label_no_replacement(label.as_bytes())?;
            let (text, _) = encoding.decode_without_bom_handling(&bytes);
            Some(text.into_owned())
        }
        None => Some(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

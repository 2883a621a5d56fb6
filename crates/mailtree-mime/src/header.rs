//! MIME header handling.

use crate::error::{Error, Result};
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufRead;

/// Ordered collection of header fields.
///
/// Fields keep their document order and original casing. Lookup by name is
/// case-insensitive and a name may occur any number of times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Headers {
    fields: Vec<(String, String)>,
    /// Lowercased field name to positions in `fields`.
    #[cfg_attr(feature = "serde", serde(skip))]
    index: HashMap<String, Vec<usize>>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header field.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.index
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(self.fields.len());
        self.fields.push((name, value.into()));
    }

    /// Sets a header value, replacing any existing values.
    ///
    /// The replacement takes the position of the first existing field with
    /// that name, or is appended when there is none.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let key = name.to_ascii_lowercase();
        let Some(&first) = self.index.get(&key).and_then(|positions| positions.first()) else {
            self.add(name, value);
            return;
        };

        self.fields[first].1 = value.into();
        let mut position = 0;
        self.fields.retain(|(field, _)| {
            let keep = position == first || !field.eq_ignore_ascii_case(&key);
            position += 1;
            keep
        });
        self.reindex();
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.index
            .get(&name.to_ascii_lowercase())
            .and_then(|positions| positions.first())
            .map(|&i| self.fields[i].1.as_str())
    }

    /// Gets all values for a header, in document order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.index
            .get(&name.to_ascii_lowercase())
            .map(|positions| positions.iter().map(|&i| self.fields[i].1.as_str()).collect())
            .unwrap_or_default()
    }

    /// Returns true if at least one field has this name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_ascii_lowercase())
    }

    /// Removes all values for a header.
    pub fn remove(&mut self, name: &str) {
        if self.index.remove(&name.to_ascii_lowercase()).is_some() {
            self.fields
                .retain(|(field, _)| !field.eq_ignore_ascii_case(name));
            self.reindex();
        }
    }

    /// Number of fields, counting repeated names separately.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns an iterator over all fields in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, (name, _)) in self.fields.iter().enumerate() {
            self.index
                .entry(name.to_ascii_lowercase())
                .or_default()
                .push(i);
        }
    }

    /// Parses a header block from text.
    ///
    /// # Errors
    ///
    /// Returns an error if the header block is malformed.
    pub fn parse(text: &str) -> Result<Self> {
        Self::read_from(&mut text.as_bytes())
    }

    /// Reads a header block, leaving `reader` positioned at the first body
    /// byte.
    ///
    /// Headers are in the format:
    /// ```text
    /// Header-Name: value
    ///  continuation
    ///
    /// ```
    ///
    /// The block ends at the first empty line or at end of input. Lines may
    /// end in CRLF or a bare LF. Continuation lines are unfolded with a
    /// single space.
    ///
    /// Lines that are not valid UTF-8 are read as Latin-1, so raw 8-bit
    /// values keep one character per byte.
    ///
    /// # Errors
    ///
    /// Returns an error if a line is neither a field nor a continuation, or
    /// if reading fails.
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<Self> {
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;
        let mut line = Vec::new();

        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }

            let raw = trim_line_end(&line);
            let text = match std::str::from_utf8(raw) {
                Ok(text) => Cow::Borrowed(text),
                Err(_) => encoding_rs::mem::decode_latin1(raw),
            };
            if text.is_empty() {
                break;
            }

            // Continuation line (starts with space or tab)
            if text.starts_with([' ', '\t']) {
                let Some((_, value)) = current.as_mut() else {
                    return Err(Error::HeaderParse(format!(
                        "continuation line before first field: {text:?}"
                    )));
                };
                let folded = text.trim();
                if !folded.is_empty() {
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(folded);
                }
                continue;
            }

            if let Some((name, value)) = current.take() {
                headers.add(name, value);
            }

            let (name, value) = text
                .split_once(':')
                .ok_or_else(|| Error::HeaderParse(format!("missing colon in line {text:?}")))?;
            let name = name.trim_end();
            if name.is_empty() || name.contains(|c: char| c.is_whitespace() || c.is_control()) {
                return Err(Error::HeaderParse(format!("invalid field name {name:?}")));
            }
            current = Some((name.to_string(), value.trim().to_string()));
        }

        if let Some((name, value)) = current {
            headers.add(name, value);
        }

        Ok(headers)
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

//! Metadata header codec
//!
//! A document payload may start with a fenced block of `key: value` lines:
//!
//! ```text
//! ---
//! title: Doc
//! draft: true
//! ---
//!
//! # Body starts here
//! ```
//!
//! The header is recognized only when the very first line is the fence and a
//! later line is the fence again. Lines between the fences are split on their
//! first colon; lines without a colon (or with an empty key) are skipped.
//! Anything that does not match is body text, returned untouched. Parsing
//! never fails.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Fence marker opening and closing the header block
pub const FENCE: &str = "---";

/// Ordered key/value metadata carried in front of the document body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetadataHeader {
    entries: Vec<(String, String)>,
}

impl MetadataHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, keeping its original position if it already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MetadataHeader {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut header = MetadataHeader::new();
        for (key, value) in iter {
            header.insert(key, value);
        }
        header
    }
}

impl Serialize for MetadataHeader {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Result of splitting a payload into header and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedText {
    pub header: MetadataHeader,
    pub body: String,
}

/// Splits `raw` into its metadata header and body.
///
/// The closing fence line, including its line terminator, is consumed.
/// Nothing else of the body is trimmed.
pub fn parse(raw: &str) -> ParsedText {
    match split_fenced(raw) {
        Some((header, body)) => ParsedText {
            header,
            body: body.to_string(),
        },
        None => ParsedText {
            header: MetadataHeader::new(),
            body: raw.to_string(),
        },
    }
}

/// `key: value` lines joined by newlines; empty for an empty header.
pub fn serialize(header: &MetadataHeader) -> String {
    header
        .iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The fenced header block, or nothing when the header is empty.
pub fn wrap(header: &MetadataHeader) -> String {
    if header.is_empty() {
        return String::new();
    }
    format!("{FENCE}\n{}\n{FENCE}\n", serialize(header))
}

/// Builds the persisted payload: fenced header, one blank line, body.
pub fn compose(header: &MetadataHeader, body: &str) -> String {
    if header.is_empty() {
        return body.to_string();
    }
    format!("{}\n{body}", wrap(header))
}

/// Inverse of [`compose`]: also drops the blank separator line after the fence.
pub fn decompose(payload: &str) -> ParsedText {
    match split_fenced(payload) {
        Some((header, body)) => {
            let body = body
                .strip_prefix("\r\n")
                .or_else(|| body.strip_prefix('\n'))
                .unwrap_or(body);
            ParsedText {
                header,
                body: body.to_string(),
            }
        }
        None => ParsedText {
            header: MetadataHeader::new(),
            body: payload.to_string(),
        },
    }
}

fn is_fence(line: &str) -> bool {
    line.strip_prefix(FENCE)
        .map(|rest| rest.trim_end().is_empty())
        .unwrap_or(false)
}

fn split_fenced(raw: &str) -> Option<(MetadataHeader, &str)> {
    let (first, rest) = raw.split_once('\n')?;
    if !is_fence(first) {
        return None;
    }

    let mut header = MetadataHeader::new();
    let mut consumed = 0;
    for line in rest.split_inclusive('\n') {
        consumed += line.len();
        let content = line.trim_end_matches(['\n', '\r']);
        if is_fence(content) {
            return Some((header, &rest[consumed..]));
        }
        if let Some((key, value)) = content.split_once(':') {
            let key = key.trim();
            if !key.is_empty() {
                header.insert(key, value.trim());
            }
        }
    }
    None
}

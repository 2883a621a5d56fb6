//! Charset name to decoder lookup.

use encoding_rs::Encoding;

/// Converts text in a named charset to UTF-8.
///
/// Implementations must be read-only so one registry can serve parses on
/// several threads at once.
pub trait CharsetRegistry: Send + Sync {
    /// Decodes `bytes` from the charset called `label`.
    ///
    /// Returns `None` if the label is unknown. Labels are matched
    /// case-insensitively.
    fn decode(&self, label: &str, bytes: &[u8]) -> Option<String>;

    /// Returns true if `label` names a known charset.
    fn supports(&self, label: &str) -> bool {
        self.decode(label, &[]).is_some()
    }
}

/// Registry backed by the WHATWG encoding labels of `encoding_rs`.
///
/// Malformed sequences are replaced with U+FFFD. The `replacement` label is
/// treated as unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingRsRegistry;

impl CharsetRegistry for EncodingRsRegistry {
    fn decode(&self, label: &str, bytes: &[u8]) -> Option<String> {
        let encoding = Encoding::for_label_no_replacement(label.trim().as_bytes())?;
        let (text, _) = encoding.decode_without_bom_handling(bytes);
        Some(text.into_owned())
    }
}

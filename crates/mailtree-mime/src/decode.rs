//! Body decoding: transfer encoding, then charset conversion.

use crate::charset::CharsetRegistry;
use crate::cleaner::Base64Cleaner;
use crate::encoding::{decode_base64, decode_quoted_printable};
use crate::error::{Error, Result};
use crate::header::Headers;
use std::fmt;
use std::io::Read;

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    #[default]
    SevenBit,
    /// 8-bit binary.
    EightBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Binary (no encoding).
    Binary,
}

impl TransferEncoding {
    /// Parses transfer encoding from string.
    ///
    /// Unknown values fall back to 7-bit, which decodes as identity.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            "binary" => Self::Binary,
            _ => Self::SevenBit, // Default (includes "7bit")
        }
    }

    /// Reads the `Content-Transfer-Encoding` field; absent means 7-bit.
    #[must_use]
    pub fn from_header(header: &Headers) -> Self {
        header
            .get("Content-Transfer-Encoding")
            .map_or(Self::SevenBit, Self::parse)
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

/// Reads a whole body and decodes it.
///
/// The transfer encoding is undone first. If `charset` is given and
/// non-empty, the result is then converted from that charset to UTF-8.
///
/// # Errors
///
/// Returns an error if reading fails, if base64 data is malformed, or if
/// the charset is unknown to `charsets`.
pub fn decode_section<R: Read>(
    encoding: TransferEncoding,
    charset: Option<&str>,
    mut reader: R,
    charsets: &dyn CharsetRegistry,
) -> Result<Vec<u8>> {
    let mut raw = Vec::new();
    let data = match encoding {
        TransferEncoding::QuotedPrintable => {
            reader.read_to_end(&mut raw)?;
            decode_quoted_printable(&raw)
        }
        TransferEncoding::Base64 => {
            Base64Cleaner::new(reader).read_to_end(&mut raw)?;
            decode_base64(&raw)?
        }
        TransferEncoding::SevenBit | TransferEncoding::EightBit | TransferEncoding::Binary => {
            reader.read_to_end(&mut raw)?;
            raw
        }
    };

    match charset.map(str::trim).filter(|label| !label.is_empty()) {
        Some(label) => charsets
            .decode(label, &data)
            .map(String::into_bytes)
            .ok_or_else(|| Error::UnsupportedCharset(label.to_string())),
        None => Ok(data),
    }
}

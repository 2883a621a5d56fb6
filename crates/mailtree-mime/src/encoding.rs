//! MIME decoding utilities.
//!
//! Supports Base64, Quoted-Printable, and RFC 2047 header decoding.

use crate::charset::CharsetRegistry;
use crate::error::Result;
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

/// Standard alphabet, padding optional, non-zero trailing bits tolerated.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decodes Base64 data.
///
/// Input must already be restricted to the base64 alphabet (see
/// [`Base64Cleaner`](crate::Base64Cleaner)). Missing padding is accepted and
/// a dangling final character, which cannot carry a whole byte, is ignored.
///
/// # Errors
///
/// Returns an error if padding appears before the end of the data.
pub fn decode_base64(data: &[u8]) -> Result<Vec<u8>> {
    let payload_len = data.iter().rposition(|&b| b != b'=').map_or(0, |i| i + 1);
    let mut payload = &data[..payload_len];
    if payload.len() % 4 == 1 {
        payload = &payload[..payload.len() - 1];
    }
    LENIENT_BASE64.decode(payload).map_err(Into::into)
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}

/// Decodes Quoted-Printable data (RFC 2045).
///
/// Decoding is byte-oriented and never fails. 8-bit bytes that a strict
/// decoder would reject are copied through, as are `=` signs that do not
/// start a valid escape. Soft line breaks (`=` at end of line, CRLF or LF)
/// are removed.
#[must_use]
pub fn decode_quoted_printable(input: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        let byte = input[i];
        if byte != b'=' {
            result.push(byte);
            i += 1;
            continue;
        }

        let rest = &input[i + 1..];
        // Soft line break, optionally with transport padding before it
        let padding = rest
            .iter()
            .take_while(|&&b| b == b' ' || b == b'\t')
            .count();
        match &rest[padding..] {
            [b'\r', b'\n', ..] => {
                i += 1 + padding + 2;
                continue;
            }
            [b'\n', ..] => {
                i += 1 + padding + 1;
                continue;
            }
            [] if padding == 0 => {
                i += 1;
                continue;
            }
            _ => {}
        }

        // Hex encoded byte
        if let [high, low, ..] = rest {
            if let (Some(high), Some(low)) = (hex_value(*high), hex_value(*low)) {
                result.push((high << 4) | low);
                i += 3;
                continue;
            }
        }

        result.push(b'=');
        i += 1;
    }

    result
}

/// Decodes RFC 2047 encoded-words in a header value.
///
/// Format: `=?charset?encoding?encoded-text?=`, where the encoding is `B`
/// (base64) or `Q` (quoted-printable with `_` for space). Whitespace between
/// two adjacent encoded-words is dropped. Words that cannot be decoded,
/// including words in a charset unknown to `charsets`, are kept verbatim.
#[must_use]
pub fn decode_rfc2047(text: &str, charsets: &dyn CharsetRegistry) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut after_word = false;

    while let Some(start) = rest.find("=?") {
        let (literal, candidate) = rest.split_at(start);
        if let Some((decoded, consumed)) = decode_encoded_word(candidate, charsets) {
            if !(after_word && literal.trim().is_empty()) {
                out.push_str(literal);
            }
            out.push_str(&decoded);
            after_word = true;
            rest = &candidate[consumed..];
        } else {
            out.push_str(literal);
            out.push_str("=?");
            after_word = false;
            rest = &candidate[2..];
        }
    }

    out.push_str(rest);
    out
}

/// Decodes the encoded-word at the start of `s`, returning the text and the
/// number of bytes consumed.
fn decode_encoded_word(s: &str, charsets: &dyn CharsetRegistry) -> Option<(String, usize)> {
    let inner = s.strip_prefix("=?")?;
    let (charset, inner) = inner.split_once('?')?;
    let (encoding, inner) = inner.split_once('?')?;
    let end = inner.find("?=")?;
    let payload = &inner[..end];
    if charset.is_empty() || payload.contains(char::is_whitespace) {
        return None;
    }
    let consumed = 2 + charset.len() + 1 + encoding.len() + 1 + end + 2;

    let bytes = match encoding {
        "B" | "b" => decode_base64(payload.as_bytes()).ok()?,
        "Q" | "q" => decode_quoted_printable(payload.replace('_', " ").as_bytes()),
        _ => return None,
    };

    // RFC 2231 allows a language suffix: =?utf-8*en?Q?...?=
    let charset = charset.split('*').next().unwrap_or(charset);
    let decoded = charsets.decode(charset, &bytes)?;
    Some((decoded, consumed))
}

//! Base64 input filter.
//!
//! Mail agents routinely emit base64 bodies with line breaks, trailing
//! spaces or stray punctuation. A strict decoder rejects the whole part on
//! the first such byte, so bodies are passed through [`Base64Cleaner`]
//! first and only alphabet bytes reach the decoder.

use std::io::{self, Read};

/// Returns true for bytes of the standard base64 alphabet, padding included.
#[must_use]
pub const fn is_base64_byte(byte: u8) -> bool {
    matches!(byte, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'+' | b'/' | b'=')
}

/// Reader adapter that drops every byte outside the base64 alphabet.
#[derive(Debug)]
pub struct Base64Cleaner<R> {
    inner: R,
}

impl<R: Read> Base64Cleaner<R> {
    /// Wraps `inner`.
    pub const fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for Base64Cleaner<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        // A chunk made only of junk must not be reported as end of input.
        loop {
            let n = self.inner.read(buf)?;
            if n == 0 {
                return Ok(0);
            }

            let mut kept = 0;
            for i in 0..n {
                let byte = buf[i];
                if is_base64_byte(byte) {
                    buf[kept] = byte;
                    kept += 1;
                }
            }
            if kept > 0 {
                return Ok(kept);
            }
        }
    }
}

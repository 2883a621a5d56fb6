//! Multipart body splitting (RFC 2046 delimiter scanning).

use crate::header::Headers;

/// One sub-part of a multipart body, headers parsed and body still raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPart<'a> {
    /// Header fields of the sub-part; empty if it had none.
    pub headers: Headers,
    /// Undecoded body bytes, without the line break before the next
    /// delimiter.
    pub body: &'a [u8],
}

/// Failure to produce the next sub-part.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplitError {
    /// Input ended without a further delimiter after a sub-part.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A sub-part header block could not be parsed.
    #[error("malformed part header: {0}")]
    Header(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Preamble not yet skipped.
    Start,
    /// Positioned at the start of a sub-part.
    Parts,
    /// Close delimiter seen.
    Closed,
    /// Input ran out without a close delimiter.
    Exhausted,
}

#[derive(Debug, Clone, Copy)]
struct Delimiter {
    /// End of the preceding part body.
    body_end: usize,
    /// First byte after the delimiter line.
    next: usize,
    closing: bool,
}

/// Lazily yields the sub-parts of a multipart body.
///
/// The sequence is finite and not restartable. `Ok(None)` marks a clean end:
/// either the close delimiter was reached or the body contains no delimiter
/// at all.
#[derive(Debug)]
pub struct PartSplitter<'a> {
    body: &'a [u8],
    dash_boundary: Vec<u8>,
    pos: usize,
    state: State,
}

impl<'a> PartSplitter<'a> {
    /// Creates a splitter over `body` for the given boundary token.
    #[must_use]
    pub fn new(body: &'a [u8], boundary: &str) -> Self {
        let mut dash_boundary = Vec::with_capacity(boundary.len() + 2);
        dash_boundary.extend_from_slice(b"--");
        dash_boundary.extend_from_slice(boundary.as_bytes());
        Self {
            body,
            dash_boundary,
            pos: 0,
            state: State::Start,
        }
    }

    /// Returns the next sub-part.
    ///
    /// After a delimiter that is not followed by anything but whitespace,
    /// one sub-part with no headers and an empty body is returned; the call
    /// after that fails with [`SplitError::UnexpectedEof`].
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::UnexpectedEof`] once input runs out before a
    /// close delimiter, and [`SplitError::Header`] for a malformed sub-part
    /// header block.
    pub fn next_part(&mut self) -> Result<Option<RawPart<'a>>, SplitError> {
        match self.state {
            State::Closed => Ok(None),
            State::Exhausted => Err(SplitError::UnexpectedEof),
            State::Start => match self.find_delimiter(0) {
                Some(delimiter) if !delimiter.closing => {
                    tracing::trace!(preamble = delimiter.body_end, "skipped multipart preamble");
                    self.pos = delimiter.next;
                    self.state = State::Parts;
                    self.read_part()
                }
                _ => {
                    self.state = State::Closed;
                    Ok(None)
                }
            },
            State::Parts => self.read_part(),
        }
    }

    fn read_part(&mut self) -> Result<Option<RawPart<'a>>, SplitError> {
        let start = self.pos;
        let part = match self.find_delimiter(start) {
            Some(delimiter) => {
                self.pos = delimiter.next;
                if delimiter.closing {
                    self.state = State::Closed;
                }
                &self.body[start..delimiter.body_end]
            }
            None => {
                self.pos = self.body.len();
                self.state = State::Exhausted;
                let rest = &self.body[start..];
                if rest.iter().all(u8::is_ascii_whitespace) {
                    tracing::trace!("delimiter at end of input without close marker");
                    &rest[..0]
                } else {
                    rest
                }
            }
        };

        let mut cursor = part;
        let headers =
            Headers::read_from(&mut cursor).map_err(|err| SplitError::Header(err.to_string()))?;
        Ok(Some(RawPart {
            headers,
            body: cursor,
        }))
    }

    /// Finds the next delimiter line starting at or after `from`, which must
    /// be the start of a line.
    fn find_delimiter(&self, from: usize) -> Option<Delimiter> {
        let mut line_start = from;
        while line_start < self.body.len() {
            let line_end = self.body[line_start..]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(self.body.len(), |i| line_start + i + 1);

            if let Some(closing) = self.match_delimiter(&self.body[line_start..line_end]) {
                return Some(Delimiter {
                    body_end: self.trim_line_break(from, line_start),
                    next: line_end,
                    closing,
                });
            }
            line_start = line_end;
        }
        None
    }

    /// Returns `Some(is_close_delimiter)` if `line` is a delimiter line.
    fn match_delimiter(&self, line: &[u8]) -> Option<bool> {
        let rest = line.strip_prefix(self.dash_boundary.as_slice())?;
        let (closing, rest) = rest
            .strip_prefix(b"--")
            .map_or((false, rest), |rest| (true, rest));
        rest.iter()
            .all(|&b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
            .then_some(closing)
    }

    /// The line break before a delimiter belongs to the delimiter.
    fn trim_line_break(&self, from: usize, line_start: usize) -> usize {
        let mut end = line_start;
        if end > from && self.body[end - 1] == b'\n' {
            end -= 1;
            if end > from && self.body[end - 1] == b'\r' {
                end -= 1;
            }
        }
        end
    }
}

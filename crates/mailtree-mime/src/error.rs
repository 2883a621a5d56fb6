//! Error types for MIME parsing.

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME parsing errors.
///
/// Every variant aborts the parse that produced it. No partial tree is
/// returned alongside an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed header block.
    #[error("Invalid header block: {0}")]
    HeaderParse(String),

    /// A media type value (`Content-Type` or `Content-Disposition`) failed
    /// the RFC 2045 grammar.
    #[error("Invalid media type {value:?}: {reason}")]
    MediaTypeParse {
        /// The offending header value.
        value: String,
        /// Description of what went wrong.
        reason: String,
    },

    /// A sub-part carries no `Content-Type` header.
    #[error("Missing Content-Type at boundary {boundary:?}")]
    MissingContentType {
        /// Boundary of the enclosing multipart.
        boundary: String,
    },

    /// Top-level multipart message without a `boundary` parameter.
    #[error("Missing boundary in multipart message")]
    MissingBoundary,

    /// A sub-part without any header field that is not the trailing
    /// artifact of a missing close delimiter.
    #[error("Empty header at boundary {boundary:?}")]
    EmptyHeader {
        /// Boundary of the enclosing multipart.
        boundary: String,
    },

    /// The multipart body could not be split at its boundary.
    #[error("Error at boundary {boundary:?}: {reason}")]
    Boundary {
        /// Boundary of the multipart being split.
        boundary: String,
        /// Description of what went wrong.
        reason: String,
    },

    /// Charset name unknown to the charset registry.
    #[error("Unsupported charset: {0:?}")]
    UnsupportedCharset(String),

    /// Base64 decode error.
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// Multipart nesting deeper than the configured limit.
    #[error("Multipart nesting depth {depth} exceeds limit {limit}")]
    DepthExceeded {
        /// Depth of the multipart that was refused.
        depth: usize,
        /// Configured maximum depth.
        limit: usize,
    },

    /// I/O error while reading the input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn media_type(value: &str, reason: impl Into<String>) -> Self {
        Self::MediaTypeParse {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

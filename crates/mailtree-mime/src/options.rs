//! Parser configuration types.

/// Default limit on multipart nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest multipart nesting accepted. A top-level multipart is depth 1;
    /// 0 refuses multipart messages altogether.
    pub max_depth: usize,
}

impl ParseOptions {
    /// Creates options with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Creates an options builder.
    #[must_use]
    pub const fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::new()
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for parser configuration.
#[derive(Debug, Clone)]
pub struct ParseOptionsBuilder {
    max_depth: usize,
}

impl ParseOptionsBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the maximum multipart nesting depth.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub const fn build(self) -> ParseOptions {
        ParseOptions {
            max_depth: self.max_depth,
        }
    }
}

impl Default for ParseOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

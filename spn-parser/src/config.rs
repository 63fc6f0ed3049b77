//! Parser configuration.

/// Default bound on syntactic nesting, see [`ParserConfig::max_depth`].
/// Each level costs a bounded number of stack frames, so the default stays well within a 2 MiB thread stack.
pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum nesting of expressions and blocks. Every parenthesized, bracketed or call-argument expression, every
    /// `? :` middle operand and every block or function body is one level; operator chains do not count towards it.
    pub max_depth: usize,
    /// Also write the error message to stderr when a parse fails.
    pub echo_errors: bool,
}

impl ParserConfig {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            echo_errors: false,
        }
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn echo_errors(mut self, echo_errors: bool) -> Self {
        self.echo_errors = echo_errors;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}

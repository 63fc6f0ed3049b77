//! Source code representation and error management.

use std::fmt;

use thiserror::Error;

/// Represents source code.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    /// Original source code.
    pub content: &'a str,
}

impl<'a> Source<'a> {
    /// Create a new `Source` with the specified `content`.
    pub fn new(content: &'a str) -> Self {
        Self { content }
    }

    /// Number of lines in the source, counting the (possibly empty) line after the last newline.
    /// An empty source has one line.
    pub fn line_count(&self) -> usize {
        self.content.bytes().filter(|&b| b == b'\n').count() + 1
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(content: &'a str) -> Self {
        Source::new(content)
    }
}

/// Category of a [`SyntaxError`].
/// Downstream every kind is treated the same (parsing stops); the kind only makes them distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reported by the lexer (stray character, malformed literal).
    Lexical,
    /// A token that no production accepts at this position.
    UnexpectedToken,
    /// A missing `)`, `]`, `}`, `;` or `:`.
    MissingDelimiter,
    /// A missing keyword such as `as`, `in` or `while`.
    MissingKeyword,
    /// A missing identifier (member name, declared variable, function name, loop binder).
    MissingIdentifier,
    /// Input that is well-formed token-wise but misplaced.
    Structural,
}

/// Represents a syntax error (compile time error).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Sparkling: syntax error near line {line}: {message}")]
pub struct SyntaxError {
    kind: ErrorKind,
    message: String,
    line: usize,
}

impl SyntaxError {
    /// Create a new syntax error with the specified `kind`, `message` and `line`.
    pub fn new(kind: ErrorKind, message: impl ToString, line: usize) -> Self {
        Self {
            kind,
            message: message.to_string(),
            line,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The production-specific part of the message, without the `syntax error near line N` prefix.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn line(&self) -> usize {
        self.line
    }
}

/// Keeps the first error of a parse.
/// Parsing is fail-fast, so any later report is ignored until [`ErrorReporter::clear`] is called.
#[derive(Debug, Default)]
pub struct ErrorReporter {
    first: Option<SyntaxError>,
}

impl ErrorReporter {
    /// Create an empty `ErrorReporter`.
    pub fn new() -> Self {
        Self { first: None }
    }

    /// Records `error` unless an error has already been recorded.
    pub fn report(&mut self, error: SyntaxError) {
        if self.first.is_none() {
            log::debug!("recorded {:?} error at line {}", error.kind, error.line);
            self.first = Some(error);
        }
    }

    pub fn clear(&mut self) {
        self.first = None;
    }

    pub fn first(&self) -> Option<&SyntaxError> {
        self.first.as_ref()
    }

    /// Returns `true` if no error has been recorded since the last [`ErrorReporter::clear`].
    pub fn has_no_errors(&self) -> bool {
        self.first.is_none()
    }
}

impl fmt::Display for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.first {
            Some(error) => write!(f, "{}", error),
            None => Ok(()),
        }
    }
}

//! Error types for expression compilation
//!
//! This module provides error handling using the `thiserror` crate.
//! Errors are categorized by their source: reference resolution, fragment
//! functions, nesting limits, or the host regex engine.

use thiserror::Error;

/// The error type for compiling an expression
///
/// Compilation either succeeds completely or fails with one of these;
/// an expression is never left with half-populated group tables.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A `${ID}` reference names no registered sub-expression
    #[error("missing expression: {0}")]
    MissingExpression(String),

    /// A `${ID(args)}` call names no registered function
    #[error("missing function: {0}")]
    MissingFunction(String),

    /// Reference chains are cyclic or exceed the configured depth
    #[error("expression too deeply nested")]
    TooDeeplyNested {
        /// The nesting limit that was exceeded
        limit: usize,
    },

    /// A fragment function rejected its arguments
    #[error("function '{id}' failed: {source}")]
    Function {
        /// The function identifier
        id: String,
        /// What the function reported
        source: FunctionError,
    },

    /// The host regex engine rejected the flat pattern
    #[error("invalid pattern: {0}")]
    Pattern(String),

    /// The engine disagrees with the computed group numbering
    #[error("group count mismatch: computed {expected}, engine reports {found}")]
    GroupCountMismatch {
        /// Groups counted during renumbering (including group 0)
        expected: usize,
        /// Groups reported by the host engine (including group 0)
        found: usize,
    },
}

impl From<regex::Error> for CompileError {
    fn from(err: regex::Error) -> Self {
        CompileError::Pattern(err.to_string())
    }
}

/// Errors reported by fragment functions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FunctionError {
    /// Too few arguments were supplied
    #[error("expected at least {expected} arguments, found {found}")]
    MissingArguments {
        /// Minimum number of arguments
        expected: usize,
        /// Number of arguments supplied
        found: usize,
    },

    /// An argument could not be interpreted
    #[error("invalid argument {index}: '{value}'")]
    InvalidArgument {
        /// Zero-based position of the argument
        index: usize,
        /// The raw argument text
        value: String,
    },

    /// A range whose lower bound exceeds its upper bound
    #[error("empty range {from}..={to}")]
    EmptyRange {
        /// Lower bound
        from: u64,
        /// Upper bound
        to: u64,
    },

    /// A range with more members than a single call may emit
    #[error("range {from}..={to} exceeds {limit} values")]
    RangeTooLarge {
        /// Lower bound
        from: u64,
        /// Upper bound
        to: u64,
        /// Maximum number of values
        limit: u64,
    },

    /// Any other failure reported by a user-supplied function
    #[error("{0}")]
    Custom(String),
}

/// A byte range within matched text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start position (inclusive)
    pub start: usize,
    /// End position (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Get the length of the span
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The span as a `Range`, for slicing
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl From<regex::Match<'_>> for Span {
    fn from(m: regex::Match<'_>) -> Self {
        Span::new(m.start(), m.end())
    }
}

/// Result type alias for compilation
pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_expression_display() {
        let err = CompileError::MissingExpression("undefined_id".to_string());
        assert_eq!(err.to_string(), "missing expression: undefined_id");
    }

    #[test]
    fn test_missing_function_display() {
        let err = CompileError::MissingFunction("range".to_string());
        assert_eq!(err.to_string(), "missing function: range");
    }

    #[test]
    fn test_too_deeply_nested_display() {
        let err = CompileError::TooDeeplyNested { limit: 64 };
        assert_eq!(err.to_string(), "expression too deeply nested");
    }

    #[test]
    fn test_function_error_display() {
        let err = CompileError::Function {
            id: "range".to_string(),
            source: FunctionError::MissingArguments {
                expected: 2,
                found: 1,
            },
        };
        assert_eq!(
            err.to_string(),
            "function 'range' failed: expected at least 2 arguments, found 1"
        );
    }

    #[test]
    fn test_pattern_error_from_regex() {
        let regex_err = regex::Regex::new("(").unwrap_err();
        let err: CompileError = regex_err.into();
        assert!(matches!(err, CompileError::Pattern(_)));
        assert!(err.to_string().starts_with("invalid pattern:"));
    }

    #[test]
    fn test_span_creation() {
        let span = Span::new(10, 20);
        assert_eq!(span.start, 10);
        assert_eq!(span.end, 20);
        assert_eq!(span.len(), 10);
        assert_eq!(span.range(), 10..20);
        assert!(!span.is_empty());
        assert!(Span::new(3, 3).is_empty());
    }
}

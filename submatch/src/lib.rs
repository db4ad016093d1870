//! Submatch Library
//!
//! Composable regular expressions built from named sub-expressions.
//!
//! A pattern may reference a registered sub-expression with `${ID}` or call a
//! fragment function with `${ID(args)}`. Compilation inlines the references
//! into one flat pattern for the `regex` crate while keeping track of where
//! every sub-expression landed, so a match can later be decomposed into
//! sub-matches that use the sub-expression's own group numbering and names.
//!
//! ```
//! use submatch::Registry;
//!
//! let mut registry = Registry::standard();
//! registry.add("year", "(?<year>\\d{4})");
//! registry.add("month", "${range(1,12,2)}");
//!
//! let date = registry.compile("${year}-${month}").unwrap();
//! let m = date.find("due 2024-07").unwrap();
//! assert_eq!(m.get("year"), Some("2024"));
//! assert_eq!(m.sub_match("month").unwrap().as_str(), "07");
//! ```

mod compiler;
pub mod engine;
pub mod error;
pub mod expression;
pub mod function;
pub mod groups;
pub mod lexer;
pub mod options;
pub mod registry;

pub use engine::{Group, GroupKey, Match, Matches};
pub use error::{CompileError, FunctionError, Result, Span};
pub use expression::{CompiledExpression, Expression};
pub use function::{FragmentFunction, Range};
pub use groups::{Anchor, AnchorTable, GroupTable};
pub use lexer::{Lexer, Token};
pub use options::{DEFAULT_MAX_DEPTH, ModeFlags, Options};
pub use registry::Registry;

/// Compile a pattern that uses only named groups and the built-in functions
///
/// Shorthand for compiling against [`Registry::standard`].
pub fn compile(source: &str) -> Result<CompiledExpression> {
    Registry::standard().compile(source)
}

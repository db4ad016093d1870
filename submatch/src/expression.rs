//! Expressions and their compiled form
//!
//! An [`Expression`] is the unit users register and compile: its identity
//! is its source text. Compiling it produces a [`CompiledExpression`],
//! which holds the flat pattern, the host regex and the tables needed to
//! decompose matches. An `Expression` publishes at most one compiled form:
//! the result is computed outside the cell and then published, so
//! concurrent first use never observes a half-built table. Threads racing
//! on the first compilation may each run the inlining (and call fragment
//! functions); only one result is kept.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use regex::Regex;

use crate::compiler;
use crate::error::{CompileError, Result};
use crate::groups::{AnchorTable, GroupTable};
use crate::registry::Registry;

/// A pattern source with `${ID}` references, compiled on first use
pub struct Expression {
    source: String,
    compiled: OnceLock<CompiledExpression>,
}

impl Expression {
    /// Create an uncompiled expression from source text
    pub fn new(source: impl Into<String>) -> Self {
        Expression {
            source: source.into(),
            compiled: OnceLock::new(),
        }
    }

    /// Compile source that uses no references, only named groups
    pub fn standalone(source: &str) -> Result<CompiledExpression> {
        Registry::new().compile(source)
    }

    /// The source text as written
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Compile against `registry`, or return the earlier result
    ///
    /// An expression is bound to the registry it was first compiled
    /// against: once a compiled form is published, later calls return it
    /// whatever registry they pass, re-checking only the nesting limit.
    ///
    /// A failed compilation is not cached; the error is reported again on
    /// every call and nothing is published. Concurrent first calls may each
    /// compile, but all of them return the single published result.
    pub fn compile(&self, registry: &Registry) -> Result<CompiledExpression> {
        self.compile_nested(registry, 0)
    }

    pub(crate) fn compile_nested(&self, registry: &Registry, depth: usize) -> Result<CompiledExpression> {
        if let Some(compiled) = self.compiled.get() {
            let limit = registry.options().max_depth;
            if depth + compiled.height() > limit {
                return Err(CompileError::TooDeeplyNested { limit });
            }
            return Ok(compiled.clone());
        }
        let compiled = compiler::compile(&self.source, registry, depth)?;
        Ok(self.compiled.get_or_init(|| compiled).clone())
    }

    /// The compiled form, if compilation has already succeeded
    pub fn compiled(&self) -> Option<&CompiledExpression> {
        self.compiled.get()
    }

    /// Check if compilation has already succeeded
    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Expression {}

impl Hash for Expression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("source", &self.source)
            .field("compiled", &self.is_compiled())
            .finish()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Everything compilation produces, bundled for `CompiledExpression`
pub(crate) struct Parts {
    pub source: String,
    pub prefix: String,
    pub body: String,
    pub regex: Regex,
    pub anchored: Regex,
    pub group_count: usize,
    pub height: usize,
    pub group_names: GroupTable,
    pub anchors: AnchorTable,
    pub sub_expressions: IndexMap<String, Vec<CompiledExpression>>,
}

struct Inner {
    source: String,
    pattern: String,
    prefix_len: usize,
    regex: Regex,
    anchored: Regex,
    group_count: usize,
    height: usize,
    group_names: GroupTable,
    anchors: AnchorTable,
    sub_expressions: IndexMap<String, Vec<CompiledExpression>>,
}

/// An immutable, compiled expression
///
/// Cloning is cheap; clones share the same tables and regex.
#[derive(Clone)]
pub struct CompiledExpression {
    inner: Arc<Inner>,
}

impl CompiledExpression {
    pub(crate) fn from_parts(parts: Parts) -> Self {
        let prefix_len = parts.prefix.len();
        let mut pattern = parts.prefix;
        pattern.push_str(&parts.body);

        CompiledExpression {
            inner: Arc::new(Inner {
                source: parts.source,
                pattern,
                prefix_len,
                regex: parts.regex,
                anchored: parts.anchored,
                group_count: parts.group_count,
                height: parts.height,
                group_names: parts.group_names,
                anchors: parts.anchors,
                sub_expressions: parts.sub_expressions,
            }),
        }
    }

    /// The source text as written
    pub fn source(&self) -> &str {
        &self.inner.source
    }

    /// The flat pattern handed to the regex engine, flag prefix included
    pub fn pattern(&self) -> &str {
        &self.inner.pattern
    }

    /// The flat pattern without the flag prefix
    pub fn body(&self) -> &str {
        &self.inner.pattern[self.inner.prefix_len..]
    }

    /// Number of capture groups plus one for the whole match
    pub fn group_count(&self) -> usize {
        self.inner.group_count
    }

    /// Length of the longest reference chain below this expression
    ///
    /// 0 when the source references nothing.
    pub fn height(&self) -> usize {
        self.inner.height
    }

    /// Number of named groups, including those of inlined sub-expressions
    pub fn named_group_count(&self) -> usize {
        self.inner.group_names.len()
    }

    /// Group index to name
    pub fn group_names(&self) -> &GroupTable {
        &self.inner.group_names
    }

    /// Group index to referenced sub-expression
    pub fn anchors(&self) -> &AnchorTable {
        &self.inner.anchors
    }

    /// Referenced identifiers with the variants inlined for each
    pub fn sub_expressions(&self) -> impl Iterator<Item = (&str, &[CompiledExpression])> {
        self.inner
            .sub_expressions
            .iter()
            .map(|(id, variants)| (id.as_str(), variants.as_slice()))
    }

    /// The variants inlined for `id`, in alternation order
    pub fn variants(&self, id: &str) -> Option<&[CompiledExpression]> {
        self.inner.sub_expressions.get(id).map(Vec::as_slice)
    }

    /// The host regex
    pub fn regex(&self) -> &Regex {
        &self.inner.regex
    }

    /// The host regex anchored at the start of the input
    pub(crate) fn anchored_regex(&self) -> &Regex {
        &self.inner.anchored
    }
}

impl PartialEq for CompiledExpression {
    fn eq(&self, other: &Self) -> bool {
        self.source() == other.source()
    }
}

impl Eq for CompiledExpression {}

impl Hash for CompiledExpression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source().hash(state);
    }
}

impl fmt::Debug for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledExpression")
            .field("source", &self.source())
            .field("pattern", &self.pattern())
            .field("group_count", &self.group_count())
            .field("group_names", self.group_names())
            .field("anchors", self.anchors())
            .finish()
    }
}

impl fmt::Display for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use std::collections::HashSet;

    #[test]
    fn test_equality_ignores_compilation() {
        let registry = Registry::new();
        let compiled = Expression::new("(a)");
        compiled.compile(&registry).unwrap();
        let fresh = Expression::new("(a)");

        assert!(compiled.is_compiled());
        assert!(!fresh.is_compiled());
        assert_eq!(compiled, fresh);

        let mut set = HashSet::new();
        set.insert(compiled);
        assert!(set.contains(&fresh));
        assert!(!set.contains(&Expression::new("(b)")));
    }

    #[test]
    fn test_compile_is_memoized() {
        let registry = Registry::new();
        let expr = Expression::new("(?<name>x)");
        let first = expr.compile(&registry).unwrap();
        let second = expr.compile(&registry).unwrap();

        assert!(Arc::ptr_eq(&first.inner, &second.inner));
        assert!(Arc::ptr_eq(&first.inner, &expr.compiled().unwrap().inner));
    }

    #[test]
    fn test_bound_to_first_registry() {
        let mut first = Registry::new();
        first.add("x", "(?<one>1)");
        let mut second = Registry::new();
        second.add("x", "(?<two>2)");

        let expr = Expression::new("${x}");
        let compiled = expr.compile(&first).unwrap();
        let again = expr.compile(&second).unwrap();

        assert!(Arc::ptr_eq(&compiled.inner, &again.inner));
        assert_eq!(again.group_names().index_of("one"), Some(2));
        assert_eq!(again.group_names().index_of("two"), None);
    }

    #[test]
    fn test_cached_form_rechecks_depth() {
        let mut registry = Registry::new();
        registry.add("a", "a");
        let expr = Expression::new("${a}");
        expr.compile(&registry).unwrap();

        let strict = Registry::with_options(Options::default().with_max_depth(0));
        assert_eq!(
            expr.compile(&strict).unwrap_err(),
            CompileError::TooDeeplyNested { limit: 0 }
        );
    }

    #[test]
    fn test_failed_compile_is_not_published() {
        let registry = Registry::new();
        let expr = Expression::new("${missing}");

        assert!(expr.compile(&registry).is_err());
        assert!(!expr.is_compiled());
        assert!(expr.compiled().is_none());
        assert!(expr.compile(&registry).is_err());
    }

    #[test]
    fn test_standalone() {
        let compiled = Expression::standalone("(?<word>\\w+)").unwrap();
        assert_eq!(compiled.pattern(), "(?isu)(\\w+)");
        assert_eq!(compiled.body(), "(\\w+)");
        assert_eq!(compiled.group_names().index_of("word"), Some(1));
        assert_eq!(compiled.to_string(), "(?<word>\\w+)");
    }

    #[test]
    fn test_display_and_debug() {
        let expr = Expression::new("abc");
        assert_eq!(expr.to_string(), "abc");
        assert!(format!("{:?}", expr).contains("abc"));
    }
}

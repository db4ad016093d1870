//! Registry of sub-expressions and fragment functions
//!
//! The registry is the context every expression is compiled against. It
//! maps identifiers to the variants registered under them, in insertion
//! order, and identifiers to fragment functions. The two namespaces are
//! separate: `${a}` always resolves against sub-expressions and `${a(..)}`
//! always against functions.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::Result;
use crate::expression::{CompiledExpression, Expression};
use crate::function::{FragmentFunction, Range};
use crate::options::Options;

/// Registry of named sub-expressions and functions
#[derive(Default)]
pub struct Registry {
    /// Variants per identifier, in registration order
    expressions: IndexMap<String, Vec<Arc<Expression>>>,
    /// Functions per identifier
    functions: IndexMap<String, Arc<dyn FragmentFunction>>,
    options: Options,
}

impl Registry {
    /// Create a new empty registry with default options
    pub fn new() -> Self {
        Registry::default()
    }

    /// Create a new empty registry with the given options
    pub fn with_options(options: Options) -> Self {
        Registry {
            options,
            ..Registry::default()
        }
    }

    /// Create a registry with the built-in functions registered
    ///
    /// Currently that is `range` (see [`Range`]).
    pub fn standard() -> Self {
        let mut registry = Registry::new();
        registry.add_function("range", Range);
        registry
    }

    /// Register a sub-expression variant under `id`
    ///
    /// Registering the same source twice under one identifier returns the
    /// existing variant instead of adding a duplicate alternative.
    pub fn add(&mut self, id: impl Into<String>, source: impl Into<String>) -> Arc<Expression> {
        let id = id.into();
        let source = source.into();
        let variants = self.expressions.entry(id.clone()).or_default();

        if let Some(existing) = variants.iter().find(|v| v.source() == source) {
            return Arc::clone(existing);
        }

        debug!(id = %id, source = %source, variant = variants.len(), "registered sub-expression");
        let expression = Arc::new(Expression::new(source));
        variants.push(Arc::clone(&expression));
        expression
    }

    /// Register a fragment function under `id`, replacing any previous one
    pub fn add_function(&mut self, id: impl Into<String>, function: impl FragmentFunction + 'static) {
        let id = id.into();
        debug!(id = %id, "registered function");
        self.functions.insert(id, Arc::new(function));
    }

    /// Look up the variants registered under `id`
    pub fn resolve(&self, id: &str) -> Option<&[Arc<Expression>]> {
        self.expressions
            .get(id)
            .map(Vec::as_slice)
            .filter(|variants| !variants.is_empty())
    }

    /// Look up the function registered under `id`
    pub fn resolve_function(&self, id: &str) -> Option<&dyn FragmentFunction> {
        self.functions.get(id).map(|f| f.as_ref())
    }

    /// Compile a top-level pattern against this registry
    pub fn compile(&self, source: &str) -> Result<CompiledExpression> {
        Expression::new(source).compile(self)
    }

    /// Registered sub-expression identifiers, in registration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.expressions.keys().map(String::as_str)
    }

    /// Registered function identifiers, in registration order
    pub fn function_ids(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Number of sub-expression identifiers
    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    /// Check if no sub-expression is registered
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// The options expressions are compiled with
    pub fn options(&self) -> &Options {
        &self.options
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("expressions", &self.expressions)
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("options", &self.options)
            .finish()
    }
}

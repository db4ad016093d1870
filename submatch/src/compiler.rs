//! Compiler from macro pattern source to a flat pattern
//!
//! Compilation runs in two passes over the source:
//!
//! 1. Inlining: every `${ID(args)}` call is replaced by its function's
//!    output, and every `${ID}` reference by its variants' compiled bodies,
//!    wrapped in a group (one variant) or an alternation of groups (several
//!    variants). The anchor group of each block and the names inside it are
//!    recorded in the enclosing pattern's numbering.
//! 2. Renumbering: capture groups of the inlined text are numbered left to
//!    right and named openers are rewritten to plain ones.
//!
//! The result is compiled by the `regex` crate with the registry's mode
//! flags prepended.

use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, trace};

use crate::error::{CompileError, Result};
use crate::expression::{CompiledExpression, Parts};
use crate::groups::{self, AnchorTable, GroupTable};
use crate::lexer::{Lexer, Token};
use crate::registry::Registry;

/// Compile `source` against `registry` at the given nesting depth
pub(crate) fn compile(source: &str, registry: &Registry, depth: usize) -> Result<CompiledExpression> {
    let result = compile_inner(source, registry, depth);
    if let Err(err) = &result
        && depth == 0
    {
        debug!(source, error = %err, "compilation failed");
    }
    result
}

fn compile_inner(source: &str, registry: &Registry, depth: usize) -> Result<CompiledExpression> {
    let options = registry.options();
    if depth > options.max_depth {
        return Err(CompileError::TooDeeplyNested {
            limit: options.max_depth,
        });
    }

    let mut inliner = Inliner::new(registry, depth);
    inliner.run(source)?;

    let renumbered = groups::renumber(&inliner.output);
    let mut group_names = inliner.group_names;
    group_names.absorb(&renumbered.names, 0);

    let prefix = options.flags.prefix();
    let regex = Regex::new(&format!("{}{}", prefix, renumbered.body))?;
    let anchored = Regex::new(&format!("{}\\A(?:{})", prefix, renumbered.body))?;
    if regex.captures_len() != renumbered.group_count {
        return Err(CompileError::GroupCountMismatch {
            expected: renumbered.group_count,
            found: regex.captures_len(),
        });
    }

    debug!(
        source,
        depth,
        group_count = renumbered.group_count,
        references = inliner.sub_expressions.len(),
        "compiled expression"
    );

    Ok(CompiledExpression::from_parts(Parts {
        source: source.to_string(),
        prefix,
        body: renumbered.body,
        regex,
        anchored,
        group_count: renumbered.group_count,
        height: inliner.height,
        group_names,
        anchors: inliner.anchors,
        sub_expressions: inliner.sub_expressions,
    }))
}

/// State of the inlining pass
struct Inliner<'r> {
    registry: &'r Registry,
    depth: usize,
    output: String,
    height: usize,
    group_names: GroupTable,
    anchors: AnchorTable,
    sub_expressions: IndexMap<String, Vec<CompiledExpression>>,
}

impl<'r> Inliner<'r> {
    fn new(registry: &'r Registry, depth: usize) -> Self {
        Inliner {
            registry,
            depth,
            output: String::new(),
            height: 0,
            group_names: GroupTable::new(),
            anchors: AnchorTable::new(),
            sub_expressions: IndexMap::new(),
        }
    }

    fn run(&mut self, source: &str) -> Result<()> {
        for token in Lexer::new(source) {
            match token {
                Token::Call { id, args, .. } => self.call(id, args)?,
                Token::Reference { id, .. } => self.reference(id)?,
                other => self.output.push_str(other.as_str()),
            }
        }
        Ok(())
    }

    /// Splice a function's output
    fn call(&mut self, id: &str, args: &str) -> Result<()> {
        let function = self
            .registry
            .resolve_function(id)
            .ok_or_else(|| CompileError::MissingFunction(id.to_string()))?;

        let args: Vec<&str> = args.split(',').collect();
        trace!(id, args = args.len(), "calling function");

        let text = function
            .execute(&args)
            .map_err(|source| CompileError::Function {
                id: id.to_string(),
                source,
            })?;
        self.output.push_str(&text);
        Ok(())
    }

    /// Splice the variants of a sub-expression
    fn reference(&mut self, id: &str) -> Result<()> {
        let variants = self
            .registry
            .resolve(id)
            .ok_or_else(|| CompileError::MissingExpression(id.to_string()))?;

        let compiled = variants
            .iter()
            .map(|variant| variant.compile_nested(self.registry, self.depth + 1))
            .collect::<Result<Vec<_>>>()?;

        for variant in &compiled {
            self.height = self.height.max(variant.height() + 1);
        }

        let anchor = groups::count_capturing(&self.output) + 1;
        let occurrence = self.anchors.register(anchor, id);
        trace!(id, anchor, occurrence, variants = compiled.len(), "inlining sub-expression");

        if let [single] = compiled.as_slice() {
            self.output.push('(');
            self.output.push_str(single.body());
            self.output.push(')');
            self.group_names.absorb(single.group_names(), anchor);
        } else {
            // The outer group is the anchor; each variant's own group 0
            // follows the previous variant's last group.
            let mut offset = anchor + 1;
            self.output.push_str("((");
            for (i, variant) in compiled.iter().enumerate() {
                if i > 0 {
                    self.output.push_str(")|(");
                }
                self.output.push_str(variant.body());
                self.group_names.absorb(variant.group_names(), offset);
                offset += variant.group_count();
            }
            self.output.push_str("))");
        }

        let known = self.sub_expressions.entry(id.to_string()).or_default();
        for variant in compiled {
            if !known.contains(&variant) {
                known.push(variant);
            }
        }
        Ok(())
    }
}

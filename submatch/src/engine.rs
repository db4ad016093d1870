//! Matching and match decomposition
//!
//! Matching itself is delegated to the `regex` crate. This module packages
//! each successful search as a [`Match`], resolves group names through the
//! expression's own tables, and carves out sub-matches scoped to the local
//! group numbering of a referenced sub-expression.

use std::ops::Range;

use indexmap::IndexMap;

use crate::error::Span;
use crate::expression::CompiledExpression;

/// Selects a capture group by index or by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group<'a> {
    /// Group index; 0 is the whole match
    Index(usize),
    /// Group name as declared with `(?<name>...)`
    Name(&'a str),
}

impl From<usize> for Group<'_> {
    fn from(index: usize) -> Self {
        Group::Index(index)
    }
}

impl<'a> From<&'a str> for Group<'a> {
    fn from(name: &'a str) -> Self {
        Group::Name(name)
    }
}

impl<'a> From<&'a String> for Group<'a> {
    fn from(name: &'a String) -> Self {
        Group::Name(name.as_str())
    }
}

/// Key of the name-or-index projection returned by [`Match::groups`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Group index
    Index(usize),
    /// Group name
    Name(String),
}

/// A match result
///
/// Group values are index-aligned with the owning expression's numbering;
/// groups that did not participate have no span. A sub-match is an
/// independent `Match` owned by the sub-expression's compiled form.
#[derive(Debug, Clone)]
pub struct Match<'t> {
    text: &'t str,
    expression: CompiledExpression,
    spans: Vec<Option<Span>>,
}

impl<'t> Match<'t> {
    fn from_captures(expression: &CompiledExpression, text: &'t str, caps: &regex::Captures<'t>) -> Self {
        let spans = (0..expression.group_count())
            .map(|i| caps.get(i).map(Span::from))
            .collect();
        Match {
            text,
            expression: expression.clone(),
            spans,
        }
    }

    /// Resolve a group selector to an index within this match
    fn index<'a>(&self, group: impl Into<Group<'a>>) -> Option<usize> {
        match group.into() {
            Group::Index(index) => (index < self.spans.len()).then_some(index),
            Group::Name(name) => self.group_index(name),
        }
    }

    /// Get the byte range of a group, if it participated
    pub fn span<'a>(&self, group: impl Into<Group<'a>>) -> Option<Span> {
        self.index(group).and_then(|i| self.spans[i])
    }

    /// Get the text of a group, if it participated
    pub fn get<'a>(&self, group: impl Into<Group<'a>>) -> Option<&'t str> {
        self.span(group).map(|span| &self.text[span.range()])
    }

    /// Get the start offset of a group, if it participated
    pub fn start<'a>(&self, group: impl Into<Group<'a>>) -> Option<usize> {
        self.span(group).map(|span| span.start)
    }

    /// Get the end offset of a group, if it participated
    pub fn end<'a>(&self, group: impl Into<Group<'a>>) -> Option<usize> {
        self.span(group).map(|span| span.end)
    }

    /// The text of the whole match
    pub fn as_str(&self) -> &'t str {
        self.get(0).unwrap_or_default()
    }

    /// The byte range of the whole match
    pub fn range(&self) -> Range<usize> {
        self.span(0).unwrap_or_default().range()
    }

    /// The searched text
    pub fn haystack(&self) -> &'t str {
        self.text
    }

    /// Number of groups, including group 0
    pub fn group_count(&self) -> usize {
        self.spans.len()
    }

    /// Number of named groups in the owning expression
    pub fn named_group_count(&self) -> usize {
        self.expression.named_group_count()
    }

    /// Index of the group called `name`
    ///
    /// Prefers the first participating group with that name, falling back
    /// to the lowest index carrying it.
    pub fn group_index(&self, name: &str) -> Option<usize> {
        let names = self.expression.group_names();
        names
            .indices_of(name)
            .find(|&i| self.participated(i))
            .or_else(|| names.index_of(name))
    }

    /// Name of the group at `index`
    pub fn group_name(&self, index: usize) -> Option<&str> {
        self.expression.group_names().name(index)
    }

    fn participated(&self, index: usize) -> bool {
        matches!(self.spans.get(index), Some(Some(_)))
    }

    /// Group values in index order
    pub fn iter(&self) -> impl Iterator<Item = Option<&'t str>> + '_ {
        self.spans
            .iter()
            .map(|span| span.map(|span| &self.text[span.range()]))
    }

    /// Participating named groups, in index order
    ///
    /// When a name occurs more than once, the first participating group
    /// with that name wins.
    pub fn named_groups(&self) -> IndexMap<&str, &'t str> {
        let mut out = IndexMap::new();
        for (index, name) in self.expression.group_names().iter() {
            if out.contains_key(name) {
                continue;
            }
            if let Some(value) = self.get(index) {
                out.insert(name, value);
            }
        }
        out
    }

    /// Participating groups keyed by index and, where named, by name
    pub fn groups(&self) -> IndexMap<GroupKey, &'t str> {
        let mut out = IndexMap::new();
        for (index, value) in self.iter().enumerate() {
            if let Some(value) = value {
                out.insert(GroupKey::Index(index), value);
            }
        }
        for (name, value) in self.named_groups() {
            out.insert(GroupKey::Name(name.to_string()), value);
        }
        out
    }

    /// Identifiers of sub-expressions anchored in this match
    pub fn sub_expression_ids(&self) -> Vec<&str> {
        self.expression.anchors().ids()
    }

    /// The sub-match for the first reference to `id`
    pub fn sub_match(&self, id: &str) -> Option<Match<'t>> {
        self.sub_match_nth(id, 0)
    }

    /// The sub-match for the `occurrence`-th reference to `id`
    ///
    /// Returns `None` when `id` is not referenced, when its block did not
    /// participate in the match, or when no variant of an alternation
    /// participated.
    pub fn sub_match_nth(&self, id: &str, occurrence: usize) -> Option<Match<'t>> {
        let anchor = self.expression.anchors().find(id, occurrence)?;
        if !self.participated(anchor) {
            return None;
        }

        let (variant, start) = match self.expression.variants(id)? {
            [single] => (single, anchor),
            variants => {
                let mut slot = anchor + 1;
                let mut found = None;
                for variant in variants {
                    if self.participated(slot) {
                        found = Some((variant, slot));
                        break;
                    }
                    slot += variant.group_count();
                }
                found?
            }
        };

        let spans = self.spans.get(start..start + variant.group_count())?.to_vec();
        Some(Match {
            text: self.text,
            expression: variant.clone(),
            spans,
        })
    }

    /// The compiled expression this match is interpreted against
    pub fn expression(&self) -> &CompiledExpression {
        &self.expression
    }
}

/// Iterator over successive non-overlapping matches
pub struct Matches<'r, 't> {
    expression: &'r CompiledExpression,
    text: &'t str,
    inner: regex::CaptureMatches<'r, 't>,
}

impl<'t> Iterator for Matches<'_, 't> {
    type Item = Match<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let caps = self.inner.next()?;
        Some(Match::from_captures(self.expression, self.text, &caps))
    }
}

impl CompiledExpression {
    /// Check if the pattern matches anywhere in the input
    pub fn is_match(&self, text: &str) -> bool {
        self.regex().is_match(text)
    }

    /// Find the first match in the input
    pub fn find<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        self.find_at(text, 0)
    }

    /// Find the first match starting the search at byte `offset`
    ///
    /// Look-behind context such as `^` and `\b` still sees the text
    /// before `offset`.
    pub fn find_at<'t>(&self, text: &'t str, offset: usize) -> Option<Match<'t>> {
        if offset > text.len() {
            return None;
        }
        let caps = self.regex().captures_at(text, offset)?;
        Some(Match::from_captures(self, text, &caps))
    }

    /// Match only at the very start of the input
    pub fn looking_at<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        let caps = self.anchored_regex().captures(text)?;
        Some(Match::from_captures(self, text, &caps))
    }

    /// Iterate over all non-overlapping matches
    pub fn find_iter<'r, 't>(&'r self, text: &'t str) -> Matches<'r, 't> {
        Matches {
            expression: self,
            text,
            inner: self.regex().captures_iter(text),
        }
    }
}

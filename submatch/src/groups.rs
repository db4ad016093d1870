//! Group tables for tracking capture groups
//!
//! This module provides the bookkeeping that outlives compilation:
//! - `GroupTable` maps group indices to names, so name lookup never depends
//!   on the host engine's own named-group support
//! - `AnchorTable` maps the first group of every inlined sub-expression to
//!   the reference that produced it
//! - `renumber` assigns indices to capture groups in flat pattern text and
//!   rewrites named openers into plain ones

use std::collections::BTreeMap;

use crate::lexer::{Lexer, Token};

/// Names of capture groups, keyed by 1-based group index
///
/// A name may appear at several indices (for instance when two variants of
/// one sub-expression both declare it); lookups prefer the lowest index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupTable {
    names: BTreeMap<usize, String>,
}

impl GroupTable {
    /// Create a new empty table
    pub fn new() -> Self {
        GroupTable::default()
    }

    /// Name the group at `index`
    pub fn insert(&mut self, index: usize, name: impl Into<String>) {
        self.names.insert(index, name.into());
    }

    /// Get the name of the group at `index`
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(&index).map(String::as_str)
    }

    /// Get the lowest group index carrying `name`
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.indices_of(name).next()
    }

    /// All group indices carrying `name`, in ascending order
    pub fn indices_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.names
            .iter()
            .filter(move |(_, n)| n.as_str() == name)
            .map(|(&index, _)| index)
    }

    /// Check if any group carries `name`
    pub fn has_name(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Number of named groups
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if no group is named
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over `(index, name)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().map(|(&index, name)| (index, name.as_str()))
    }

    /// Copy every entry of `other`, shifting its indices by `offset`
    ///
    /// Used when a sub-expression whose local group `k` lands at group
    /// `offset + k` of the enclosing pattern.
    pub fn absorb(&mut self, other: &GroupTable, offset: usize) {
        for (index, name) in other.iter() {
            self.insert(index + offset, name);
        }
    }
}

/// One reference to a sub-expression within a pattern
///
/// `occurrence` counts earlier references to the same identifier in the
/// same pattern, so `${a}x${a}` yields occurrences 0 and 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Anchor {
    /// The referenced identifier
    pub id: String,
    /// Zero-based ordinal among references to `id`
    pub occurrence: usize,
}

/// Maps the first group index of each inlined block to its reference
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorTable {
    anchors: BTreeMap<usize, Anchor>,
}

impl AnchorTable {
    /// Create a new empty table
    pub fn new() -> Self {
        AnchorTable::default()
    }

    /// Record that the block for `id` starts at group `index`
    ///
    /// # Returns
    /// The occurrence ordinal assigned to this reference
    pub fn register(&mut self, index: usize, id: &str) -> usize {
        let occurrence = self.occurrences(id);
        self.anchors.insert(
            index,
            Anchor {
                id: id.to_string(),
                occurrence,
            },
        );
        occurrence
    }

    /// Get the anchor at group `index`
    pub fn get(&self, index: usize) -> Option<&Anchor> {
        self.anchors.get(&index)
    }

    /// Find the group index of the `occurrence`-th reference to `id`
    pub fn find(&self, id: &str, occurrence: usize) -> Option<usize> {
        self.anchors
            .iter()
            .find(|(_, a)| a.id == id && a.occurrence == occurrence)
            .map(|(&index, _)| index)
    }

    /// Number of references to `id`
    pub fn occurrences(&self, id: &str) -> usize {
        self.anchors.values().filter(|a| a.id == id).count()
    }

    /// Distinct referenced identifiers, in order of first appearance
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for anchor in self.anchors.values() {
            if !ids.contains(&anchor.id.as_str()) {
                ids.push(&anchor.id);
            }
        }
        ids
    }

    /// Number of anchors
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Check if there are no anchors
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Iterate over `(index, anchor)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Anchor)> {
        self.anchors.iter().map(|(&index, anchor)| (index, anchor))
    }
}

/// Result of renumbering the capture groups of a flat pattern
#[derive(Debug, Clone, PartialEq)]
pub struct Renumbered {
    /// The pattern with every named opener rewritten to `(`
    pub body: String,
    /// Names found, keyed by assigned index
    pub names: GroupTable,
    /// Number of capture groups plus one for the whole match
    pub group_count: usize,
}

/// Assign sequential indices to capture groups and strip their names
///
/// Groups are numbered from 1 in order of their opening parenthesis.
/// Non-capturing and look-around forms are passed through uncounted, as
/// are parentheses that are escaped or inside a character class.
pub fn renumber(text: &str) -> Renumbered {
    let mut body = String::with_capacity(text.len());
    let mut names = GroupTable::new();
    let mut index = 0;

    for token in Lexer::new(text) {
        match token {
            Token::GroupOpen => {
                index += 1;
                body.push('(');
            }
            Token::NamedGroupOpen { name, .. } => {
                index += 1;
                names.insert(index, name);
                body.push('(');
            }
            other => body.push_str(other.as_str()),
        }
    }

    Renumbered {
        body,
        names,
        group_count: index + 1,
    }
}

/// Count the capturing group openers in `text`
pub fn count_capturing(text: &str) -> usize {
    Lexer::new(text).filter(Token::is_capturing).count()
}

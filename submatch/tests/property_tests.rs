//! Property-based tests for expression compilation.
//!
//! These tests use proptest to generate patterns and registries and verify:
//! 1. Identity: a pattern without references compiles to itself, with
//!    named openers reduced to plain groups
//! 2. Name lookup: every declared name maps back to the group it labels
//! 3. Decomposition: each referenced block's sub-match covers exactly the
//!    text that block matched

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use proptest::prelude::*;
use submatch::{FragmentFunction, Range, Registry};

// -- Pattern Strategies --

/// A lowercase literal that needs no escaping.
fn literal_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,6}").expect("valid regex")
}

/// One piece of a pattern: source text and the text it compiles to.
#[derive(Debug, Clone)]
enum Piece {
    Literal(String),
    Plain(String),
    NonCapturing(String),
    Named(String),
}

fn piece_strategy() -> impl Strategy<Value = Piece> {
    prop_oneof![
        literal_strategy().prop_map(Piece::Literal),
        literal_strategy().prop_map(Piece::Plain),
        literal_strategy().prop_map(Piece::NonCapturing),
        literal_strategy().prop_map(Piece::Named),
    ]
}

/// Render pieces as (source, expected body, named groups in order).
fn render(pieces: &[Piece]) -> (String, String, Vec<(String, usize)>) {
    let mut source = String::new();
    let mut body = String::new();
    let mut names = Vec::new();
    let mut index = 0;

    for piece in pieces {
        match piece {
            Piece::Literal(text) => {
                source.push_str(text);
                body.push_str(text);
            }
            Piece::Plain(text) => {
                index += 1;
                source.push_str(&format!("({})", text));
                body.push_str(&format!("({})", text));
            }
            Piece::NonCapturing(text) => {
                source.push_str(&format!("(?:{})", text));
                body.push_str(&format!("(?:{})", text));
            }
            Piece::Named(text) => {
                index += 1;
                let name = format!("n{}", index);
                source.push_str(&format!("(?<{}>{})", name, text));
                body.push_str(&format!("({})", text));
                names.push((name, index));
            }
        }
    }
    (source, body, names)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_no_reference_identity(pieces in prop::collection::vec(piece_strategy(), 1..8)) {
        let (source, body, names) = render(&pieces);
        let compiled = Registry::new().compile(&source).unwrap();

        prop_assert_eq!(compiled.body(), body.as_str());
        prop_assert_eq!(compiled.pattern(), format!("(?isu){}", body));
        prop_assert_eq!(compiled.named_group_count(), names.len());
        prop_assert!(compiled.anchors().is_empty());
    }

    #[test]
    fn prop_name_index_round_trip(pieces in prop::collection::vec(piece_strategy(), 1..8)) {
        let (source, _, names) = render(&pieces);
        let compiled = Registry::new().compile(&source).unwrap();

        for (name, index) in &names {
            prop_assert_eq!(compiled.group_names().index_of(name), Some(*index));
            prop_assert_eq!(compiled.group_names().name(*index), Some(name.as_str()));
        }
    }

    #[test]
    fn prop_sub_match_covers_block(
        literals in prop::collection::vec(literal_strategy(), 1..6),
        wrap in prop::collection::vec(any::<bool>(), 6),
    ) {
        let mut registry = Registry::new();
        let mut pattern = Vec::new();
        for (i, literal) in literals.iter().enumerate() {
            let id = format!("part{}", i);
            let source = if wrap[i] {
                format!("(?<inner{}>{})", i, literal)
            } else {
                literal.clone()
            };
            registry.add(id.as_str(), source);
            pattern.push(format!("${{{}}}", id));
        }

        let compiled = registry.compile(&pattern.join("-")).unwrap();
        let text = literals.join("-");
        let m = compiled.find(&text).unwrap();

        prop_assert_eq!(m.as_str(), text.as_str());
        for (i, literal) in literals.iter().enumerate() {
            let sub = m.sub_match(&format!("part{}", i)).unwrap();
            prop_assert_eq!(sub.as_str(), literal.as_str());
            if wrap[i] {
                let name = format!("inner{}", i);
                prop_assert_eq!(sub.get(1), Some(literal.as_str()));
                prop_assert_eq!(m.get(name.as_str()), Some(literal.as_str()));
            }
        }
    }

    #[test]
    fn prop_range_matches_every_member(from in 0u64..200, span in 0u64..30, width in 1usize..4) {
        let to = from + span;
        let args = [from.to_string(), to.to_string(), width.to_string()];
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let fragment = Range.execute(&args).unwrap();

        let compiled = Registry::new().compile(&format!("^{}$", fragment)).unwrap();
        for n in from..=to {
            let padded = format!("{:0width$}", n, width = width);
            prop_assert!(compiled.is_match(&padded), "{} should match {}", padded, fragment);
        }
        let past_end = format!("{:0width$}", to + 1, width = width);
        prop_assert!(!compiled.is_match(&past_end));
    }
}

//! Fragment functions
//!
//! A fragment function turns the literal arguments of a `${ID(args)}` call
//! into pattern text that is spliced into the compiled pattern verbatim.
//! Functions must emit balanced, non-capturing constructs; a capturing group
//! in the output shifts the numbering of every later group.

use std::fmt::Write;

use crate::error::FunctionError;

/// A pluggable generator of pattern text
///
/// Implemented for any `Fn(&[&str]) -> Result<String, FunctionError>`, so
/// closures can be registered directly.
pub trait FragmentFunction: Send + Sync {
    /// Produce pattern text from comma-split, untrimmed arguments
    fn execute(&self, args: &[&str]) -> Result<String, FunctionError>;
}

impl<F> FragmentFunction for F
where
    F: Fn(&[&str]) -> Result<String, FunctionError> + Send + Sync,
{
    fn execute(&self, args: &[&str]) -> Result<String, FunctionError> {
        self(args)
    }
}

/// Alternation of every integer in an inclusive range
///
/// `${range(from,to)}` or `${range(from,to,width)}`; numbers shorter than
/// `width` are zero-padded. `${range(9,12,2)}` yields `(?:09|10|11|12)`.
/// At most [`Range::MAX_LEN`] numbers are emitted and `width` is capped at
/// [`Range::MAX_WIDTH`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Range;

impl Range {
    /// Largest number of alternatives a single call may emit
    pub const MAX_LEN: u64 = 10_000;

    /// Largest accepted padding width
    pub const MAX_WIDTH: u64 = 64;

    fn argument(args: &[&str], index: usize) -> Result<u64, FunctionError> {
        let raw = args.get(index).copied().unwrap_or_default();
        raw.trim()
            .parse()
            .map_err(|_| FunctionError::InvalidArgument {
                index,
                value: raw.to_string(),
            })
    }
}

impl FragmentFunction for Range {
    fn execute(&self, args: &[&str]) -> Result<String, FunctionError> {
        if args.len() < 2 {
            return Err(FunctionError::MissingArguments {
                expected: 2,
                found: args.len(),
            });
        }

        let from = Self::argument(args, 0)?;
        let to = Self::argument(args, 1)?;
        let width = if args.len() > 2 {
            let width = Self::argument(args, 2)?;
            (width <= Self::MAX_WIDTH)
                .then(|| usize::try_from(width).ok())
                .flatten()
                .ok_or_else(|| FunctionError::InvalidArgument {
                    index: 2,
                    value: args[2].to_string(),
                })?
        } else {
            1
        };

        if from > to {
            return Err(FunctionError::EmptyRange { from, to });
        }
        if to - from >= Self::MAX_LEN {
            return Err(FunctionError::RangeTooLarge {
                from,
                to,
                limit: Self::MAX_LEN,
            });
        }

        let mut out = String::from("(?:");
        for n in from..=to {
            if n != from {
                out.push('|');
            }
            let _ = write!(out, "{:0width$}", n, width = width);
        }
        out.push(')');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_padded() {
        assert_eq!(
            Range.execute(&["9", "12", "2"]).unwrap(),
            "(?:09|10|11|12)"
        );
    }

    #[test]
    fn test_range_default_width() {
        assert_eq!(Range.execute(&["1", "3"]).unwrap(), "(?:1|2|3)");
    }

    #[test]
    fn test_range_width_shorter_than_numbers() {
        assert_eq!(Range.execute(&["99", "101", "2"]).unwrap(), "(?:99|100|101)");
    }

    #[test]
    fn test_range_single_value() {
        assert_eq!(Range.execute(&["7", "7", "3"]).unwrap(), "(?:007)");
    }

    #[test]
    fn test_range_trims_arguments() {
        assert_eq!(Range.execute(&[" 1", "2 "]).unwrap(), "(?:1|2)");
    }

    #[test]
    fn test_range_missing_arguments() {
        assert_eq!(
            Range.execute(&["1"]),
            Err(FunctionError::MissingArguments {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_range_invalid_argument() {
        assert_eq!(
            Range.execute(&["1", "x"]),
            Err(FunctionError::InvalidArgument {
                index: 1,
                value: "x".to_string()
            })
        );
        assert!(Range.execute(&["-1", "2"]).is_err());
    }

    #[test]
    fn test_range_empty() {
        assert_eq!(
            Range.execute(&["5", "2"]),
            Err(FunctionError::EmptyRange { from: 5, to: 2 })
        );
    }

    #[test]
    fn test_range_width_limit() {
        assert_eq!(
            Range.execute(&["1", "2", "70000"]),
            Err(FunctionError::InvalidArgument {
                index: 2,
                value: "70000".to_string()
            })
        );
        assert_eq!(
            Range.execute(&["1", "1", "64"]).unwrap().len(),
            "(?:)".len() + 64
        );
    }

    #[test]
    fn test_range_length_limit() {
        assert_eq!(
            Range.execute(&["0", "18446744073709551615"]),
            Err(FunctionError::RangeTooLarge {
                from: 0,
                to: u64::MAX,
                limit: Range::MAX_LEN
            })
        );
        assert!(Range.execute(&["0", "9999"]).is_ok());
        assert!(Range.execute(&["0", "10000"]).is_err());
    }

    #[test]
    fn test_closure_function() {
        let upper = |args: &[&str]| -> Result<String, FunctionError> {
            Ok(format!("(?:{})", args.join("|")))
        };
        assert_eq!(upper.execute(&["a", "b"]).unwrap(), "(?:a|b)");
    }
}

//! Lexer for tokenizing macro pattern source
//!
//! This module splits pattern source into the pieces the compiler cares
//! about: sub-expression references (`${ID}`), function calls
//! (`${ID(args)}`), capture group openers, and everything else as opaque
//! text. Escapes and character classes are kept whole so that parentheses
//! and `${` inside them are never mistaken for structure.

use std::fmt;

/// A token in a macro pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A run of ordinary pattern text
    Text(&'a str),
    /// A backslash and the character it escapes
    Escape(&'a str),
    /// A complete character class, brackets included
    Class(&'a str),
    /// A plain capturing group opener `(`
    GroupOpen,
    /// A named capturing group opener `(?<name>` or `(?P<name>`
    NamedGroupOpen {
        /// The group name
        name: &'a str,
        /// The opener as written
        raw: &'a str,
    },
    /// The `(?` of a non-capturing group, flag group or look-around
    SpecialGroupOpen,
    /// A sub-expression reference `${ID}`
    Reference {
        /// The referenced identifier
        id: &'a str,
        /// The reference as written
        raw: &'a str,
    },
    /// A function call `${ID(args)}`
    Call {
        /// The function identifier
        id: &'a str,
        /// The raw, unsplit argument text
        args: &'a str,
        /// The call as written
        raw: &'a str,
    },
}

impl<'a> Token<'a> {
    /// The source text this token was read from
    pub fn as_str(&self) -> &'a str {
        match self {
            Token::Text(s) | Token::Escape(s) | Token::Class(s) => s,
            Token::GroupOpen => "(",
            Token::SpecialGroupOpen => "(?",
            Token::NamedGroupOpen { raw, .. }
            | Token::Reference { raw, .. }
            | Token::Call { raw, .. } => raw,
        }
    }

    /// Whether this token opens a capturing group
    pub fn is_capturing(&self) -> bool {
        matches!(self, Token::GroupOpen | Token::NamedGroupOpen { .. })
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Text(s) => write!(f, "text `{}`", s),
            Token::Escape(s) => write!(f, "escape `{}`", s),
            Token::Class(s) => write!(f, "class `{}`", s),
            Token::GroupOpen => write!(f, "`(`"),
            Token::NamedGroupOpen { name, .. } => write!(f, "named group `{}`", name),
            Token::SpecialGroupOpen => write!(f, "`(?`"),
            Token::Reference { id, .. } => write!(f, "reference `{}`", id),
            Token::Call { id, args, .. } => write!(f, "call `{}({})`", id, args),
        }
    }
}

/// Lexer for macro pattern source
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input string
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    /// Byte at `offset` past the current position
    fn peek(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.position + offset).copied()
    }

    /// Byte at an absolute position
    fn byte_at(&self, pos: usize) -> Option<u8> {
        self.input.as_bytes().get(pos).copied()
    }

    /// Consume `len` bytes and return them
    fn take(&mut self, len: usize) -> &'a str {
        let start = self.position;
        self.position = (start + len).min(self.input.len());
        &self.input[start..self.position]
    }

    /// Read an identifier starting at `start`, returning its end
    ///
    /// Identifiers are `[A-Za-z][A-Za-z0-9_]*`.
    fn read_identifier(&self, start: usize) -> Option<usize> {
        let bytes = self.input.as_bytes();
        if !bytes.get(start)?.is_ascii_alphabetic() {
            return None;
        }
        let mut end = start + 1;
        while let Some(&b) = bytes.get(end) {
            if b.is_ascii_alphanumeric() || b == b'_' {
                end += 1;
            } else {
                break;
            }
        }
        Some(end)
    }

    /// Read a capture group name starting at `start`, returning its end
    ///
    /// Names start with `_` or a letter and continue with letters, digits,
    /// `_`, `.`, `[` or `]`, the same names the `regex` crate accepts.
    fn read_group_name(&self, start: usize) -> Option<usize> {
        let rest = self.input.get(start..)?;
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if c == '_' || c.is_alphabetic() => {}
            _ => return None,
        }
        let len = chars
            .find(|&(_, c)| !(c.is_alphanumeric() || matches!(c, '_' | '.' | '[' | ']')))
            .map_or(rest.len(), |(i, _)| i);
        Some(start + len)
    }

    /// Length in bytes of the char starting at `pos`
    fn char_len(&self, pos: usize) -> usize {
        self.input
            .get(pos..)
            .and_then(|rest| rest.chars().next())
            .map_or(0, char::len_utf8)
    }

    /// Read an escape sequence (current byte is the backslash)
    fn read_escape(&mut self) -> Token<'a> {
        let len = 1 + self.char_len(self.position + 1);
        Token::Escape(self.take(len))
    }

    /// Read a character class (current byte is `[`)
    ///
    /// Nested classes are tracked by depth. A `]` directly after the
    /// opening bracket (or after `[^`) is literal. An unterminated class
    /// consumes the rest of the input and is left for the engine to reject.
    fn read_class(&mut self) -> Token<'a> {
        let mut end = self.position + 1;
        if self.byte_at(end) == Some(b'^') {
            end += 1;
        }
        if self.byte_at(end) == Some(b']') {
            end += 1;
        }

        let mut depth = 1;
        while let Some(b) = self.byte_at(end) {
            match b {
                b'\\' => end += 1 + self.char_len(end + 1),
                b'[' => {
                    depth += 1;
                    end += 1;
                }
                b']' => {
                    depth -= 1;
                    end += 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => end += 1,
            }
        }

        let len = end - self.position;
        Token::Class(self.take(len))
    }

    /// Read a group opener (current byte is `(`)
    fn read_group(&mut self) -> Token<'a> {
        if self.peek(1) != Some(b'?') {
            self.take(1);
            return Token::GroupOpen;
        }

        let name_start = match (self.peek(2), self.peek(3)) {
            (Some(b'<'), _) => Some(self.position + 3),
            (Some(b'P'), Some(b'<')) => Some(self.position + 4),
            _ => None,
        };

        if let Some(start) = name_start
            && let Some(end) = self.read_group_name(start)
            && self.byte_at(end) == Some(b'>')
        {
            let name = &self.input[start..end];
            let raw = self.take(end + 1 - self.position);
            return Token::NamedGroupOpen { name, raw };
        }

        self.take(2);
        Token::SpecialGroupOpen
    }

    /// Read a reference or call (current byte is `$`)
    ///
    /// Anything that does not form a complete `${ID}` or `${ID(args)}`
    /// is returned as a one-byte text token.
    fn read_dollar(&mut self) -> Token<'a> {
        if self.peek(1) == Some(b'{')
            && let Some(id_end) = self.read_identifier(self.position + 2)
        {
            let id_start = self.position + 2;
            match self.byte_at(id_end) {
                Some(b'}') => {
                    let id = &self.input[id_start..id_end];
                    let raw = self.take(id_end + 1 - self.position);
                    return Token::Reference { id, raw };
                }
                Some(b'(') => {
                    let args_start = id_end + 1;
                    if let Some(close) = self.input[args_start..].find(')') {
                        let args_end = args_start + close;
                        if self.byte_at(args_end + 1) == Some(b'}') {
                            let id = &self.input[id_start..id_end];
                            let args = &self.input[args_start..args_end];
                            let raw = self.take(args_end + 2 - self.position);
                            return Token::Call { id, args, raw };
                        }
                    }
                }
                _ => {}
            }
        }

        Token::Text(self.take(1))
    }

    /// Read ordinary text up to the next structural byte
    fn read_text(&mut self) -> Token<'a> {
        let rest = &self.input.as_bytes()[self.position..];
        let len = rest
            .iter()
            .position(|b| matches!(b, b'\\' | b'[' | b'(' | b'$'))
            .unwrap_or(rest.len())
            .max(1);
        Token::Text(self.take(len))
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        let token = match self.peek(0)? {
            b'\\' => self.read_escape(),
            b'[' => self.read_class(),
            b'(' => self.read_group(),
            b'$' => self.read_dollar(),
            _ => self.read_text(),
        };
        Some(token)
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Vec<Token<'a>> {
        self.collect()
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

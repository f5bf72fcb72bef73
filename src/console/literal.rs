//! Literal parsing for dotted calls
//!
//! Two shapes appear between the parentheses of `Class.verb(...)`:
//! - a comma-separated argument list: `"id", "email", "a@b.com"`
//! - an id followed by a mapping literal: `"id", {'email': "x@y.com", 'age': 30}`
//!
//! Quoted strings may use either quote, may contain the other quote, and
//! honor backslash escapes. Bare tokens (numbers, `True`, identifiers)
//! are kept as text.

use thiserror::Error;

/// Mapping-literal syntax errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),

    #[error("expected '{expected}' at offset {offset}")]
    Expected { expected: char, offset: usize },

    #[error("empty key at offset {0}")]
    EmptyKey(usize),

    #[error("unexpected input after mapping at offset {0}")]
    TrailingInput(usize),
}

/// One literal from an argument list or mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Quoted text, quotes removed and escapes resolved
    Quoted(String),
    /// Unquoted text, trimmed
    Bare(String),
}

impl Literal {
    /// Text handed on as a command argument.
    pub fn into_text(self) -> String {
        match self {
            Literal::Quoted(s) | Literal::Bare(s) => s,
        }
    }

    /// Text as it would be typed in simple form.
    ///
    /// Quoted literals get one pair of double quotes back, so value
    /// coercion strips exactly that pair and nothing the user wrote.
    pub fn into_token(self) -> String {
        match self {
            Literal::Quoted(s) => format!("\"{}\"", s),
            Literal::Bare(s) => s,
        }
    }
}

struct Cursor<'a> {
    chars: Vec<(usize, char)>,
    pos: usize,
    src: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.char_indices().collect(),
            pos: 0,
            src,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn offset(&self) -> usize {
        self.chars.get(self.pos).map_or(self.src.len(), |(i, _)| *i)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(LiteralError::Expected {
                expected,
                offset: self.offset(),
            })
        }
    }

    /// Reads a quoted string; the cursor sits on the opening quote.
    fn quoted(&mut self) -> Result<String, LiteralError> {
        let start = self.offset();
        let quote = self.bump().ok_or(LiteralError::UnterminatedString(start))?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(LiteralError::UnterminatedString(start)),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c) => out.push(c),
                    None => return Err(LiteralError::UnterminatedString(start)),
                },
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
            }
        }
    }

    /// Reads bare text up to (not including) any of `stops`.
    fn bare(&mut self, stops: &[char]) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if stops.contains(&c) {
                break;
            }
            out.push(c);
            self.pos += 1;
        }
        out.trim().to_string()
    }

    fn literal(&mut self, stops: &[char]) -> Result<Literal, LiteralError> {
        self.skip_ws();
        match self.peek() {
            Some('"') | Some('\'') => {
                let text = self.quoted()?;
                self.skip_ws();
                Ok(Literal::Quoted(text))
            }
            _ => Ok(Literal::Bare(self.bare(stops))),
        }
    }
}

/// Splits a dotted-call argument list on top-level commas.
///
/// Empty input gives no arguments and one trailing comma is tolerated.
/// An unterminated quote swallows the rest of the input as text.
pub fn parse_arguments(src: &str) -> Vec<String> {
    parse_literals(src).into_iter().map(Literal::into_text).collect()
}

/// Like [`parse_arguments`], keeping whether each argument was quoted.
pub fn parse_literals(src: &str) -> Vec<Literal> {
    let mut cursor = Cursor::new(src);
    let mut args = Vec::new();

    cursor.skip_ws();
    while !cursor.at_end() {
        let checkpoint = cursor.pos;
        let literal = match cursor.literal(&[',']) {
            Ok(literal) => literal,
            Err(_) => {
                cursor.pos = checkpoint;
                cursor.skip_ws();
                args.push(Literal::Bare(cursor.bare(&[])));
                break;
            }
        };

        // Text after a closing quote runs into the same argument
        let tail = cursor.bare(&[',']);
        if tail.is_empty() {
            args.push(literal);
        } else {
            let mut text = literal.into_text();
            text.push_str(&tail);
            args.push(Literal::Bare(text));
        }

        if cursor.bump().is_none() {
            break;
        }
        cursor.skip_ws();
    }

    args
}

/// Parses a mapping literal `{key: value, ...}` into ordered pairs.
///
/// Keys and values may be quoted or bare. The whole input must be the
/// mapping, surrounding whitespace aside.
pub fn parse_mapping(src: &str) -> Result<Vec<(String, Literal)>, LiteralError> {
    let mut cursor = Cursor::new(src);
    let mut pairs = Vec::new();

    cursor.skip_ws();
    cursor.expect('{')?;

    loop {
        cursor.skip_ws();
        if cursor.peek() == Some('}') {
            cursor.bump();
            break;
        }

        let key_offset = cursor.offset();
        let key = cursor.literal(&[':', ',', '}'])?.into_text();
        if key.is_empty() {
            return Err(LiteralError::EmptyKey(key_offset));
        }
        cursor.expect(':')?;

        let value = cursor.literal(&[',', '}'])?;
        pairs.push((key, value));

        cursor.skip_ws();
        match cursor.peek() {
            Some(',') => {
                cursor.bump();
            }
            Some('}') => {
                cursor.bump();
                break;
            }
            _ => {
                return Err(LiteralError::Expected {
                    expected: '}',
                    offset: cursor.offset(),
                })
            }
        }
    }

    cursor.skip_ws();
    if !cursor.at_end() {
        return Err(LiteralError::TrailingInput(cursor.offset()));
    }

    Ok(pairs)
}

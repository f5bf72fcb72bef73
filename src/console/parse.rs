//! Line classification and dotted-call normalization
//!
//! A line whose leading identifier is a built-in verb is simple form:
//! `verb arg1 arg2 ...`. Any other line containing `.` is read as a dotted
//! call `Class.verb(args)` and rewritten into simple form. Everything else
//! is unknown syntax.

use std::sync::OnceLock;

use regex::Regex;

use super::literal::{parse_arguments, parse_literals, parse_mapping, Literal};

/// Verbs a simple-form line may start with.
pub const VERBS: [&str; 9] = [
    "EOF", "all", "count", "create", "destroy", "help", "quit", "show", "update",
];

/// Verbs accepted in dotted form.
pub const DOTTED_VERBS: [&str; 5] = ["all", "count", "show", "destroy", "update"];

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// Blank line
    Empty,
    /// `verb arg1 arg2 ...`
    Simple { verb: String, args: Vec<String> },
    /// `Class.update(id, {k: v, ...})`, one update per pair in order
    BulkUpdate {
        class_name: String,
        id: String,
        pairs: Vec<(String, String)>,
    },
    /// Not a recognized command; carries the trimmed line
    Unknown(String),
}

fn dotted_call() -> &'static Regex {
    static DOTTED_CALL: OnceLock<Regex> = OnceLock::new();
    DOTTED_CALL.get_or_init(|| {
        Regex::new(r"(?s)^([^.]*)\.([A-Za-z_][A-Za-z0-9_]*)\((.*)\)$")
            .expect("dotted-call pattern is a valid regex")
    })
}

/// Classifies and normalizes one input line.
pub fn parse_line(line: &str) -> ParsedLine {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ParsedLine::Empty;
    }

    if let Some(topic) = trimmed.strip_prefix('?') {
        return ParsedLine::Simple {
            verb: "help".to_string(),
            args: split_words(topic),
        };
    }

    let ident_len = trimmed
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(trimmed.len());
    let (ident, rest) = trimmed.split_at(ident_len);

    if VERBS.contains(&ident) && (rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        return ParsedLine::Simple {
            verb: ident.to_string(),
            args: split_words(rest),
        };
    }

    if trimmed.contains('.') {
        if let Some(parsed) = parse_dotted(trimmed) {
            return parsed;
        }
    }

    ParsedLine::Unknown(trimmed.to_string())
}

/// Rewrites `Class.verb(args)` into simple form.
fn parse_dotted(line: &str) -> Option<ParsedLine> {
    let caps = dotted_call().captures(line)?;
    let class_name = caps.get(1)?.as_str().trim().to_string();
    let verb = caps.get(2)?.as_str();
    let argstring = caps.get(3)?.as_str();

    if !DOTTED_VERBS.contains(&verb) {
        return None;
    }

    if verb == "update" {
        if let Some(brace) = argstring.find('{') {
            let (head, mapping) = argstring.split_at(brace);
            let pairs = parse_mapping(mapping).ok()?;
            let id = parse_arguments(head).into_iter().next().unwrap_or_default();
            return Some(ParsedLine::BulkUpdate {
                class_name,
                id,
                pairs: pairs
                    .into_iter()
                    .map(|(key, value)| (key, value.into_token()))
                    .collect(),
            });
        }
    }

    // Class, id and attribute name are plain text; anything after them is a
    // value and keeps its quoting for the update handler to coerce.
    let mut literals = parse_literals(argstring).into_iter();
    let mut args = vec![class_name];
    args.extend(literals.by_ref().take(2).map(Literal::into_text));
    args.extend(literals.map(Literal::into_token));
    Some(ParsedLine::Simple {
        verb: verb.to_string(),
        args,
    })
}

/// Splits simple-form arguments on whitespace.
///
/// A word that opens with a quote runs to the matching quote, spaces
/// included, and keeps its quotes.
pub fn split_words(src: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut chars = src.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let Some(first) = chars.next() else {
            break;
        };

        let mut word = String::from(first);
        if first == '"' || first == '\'' {
            for c in chars.by_ref() {
                word.push(c);
                if c == first {
                    break;
                }
            }
        }
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                break;
            }
            word.push(c);
            chars.next();
        }
        words.push(word);
    }

    words
}

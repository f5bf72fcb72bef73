//! Console subsystem for modelshell
//!
//! Turns free-text lines into CRUD operations on the storage engine.
//!
//! Simple form:
//! - `create <class>`
//! - `show <class> <id>` / `destroy <class> <id>`
//! - `all [<class>]` / `count [<class>]`
//! - `update <class> <id> <attribute> <value>`
//! - `help [<command>]`, `quit`, `EOF`
//!
//! Dotted form, rewritten into simple form before dispatch:
//! - `<class>.all()`, `<class>.count()`
//! - `<class>.show(<id>)`, `<class>.destroy(<id>)`
//! - `<class>.update(<id>, <attribute>, <value>)`
//! - `<class>.update(<id>, {<attribute>: <value>, ...})`
//!
//! A malformed command prints one fixed message and changes nothing.

mod errors;
mod help;
mod literal;
mod parse;
mod shell;
mod validator;

pub use errors::{ConsoleError, ConsoleResult, ValidationError};
pub use help::help_text;
pub use literal::{parse_arguments, parse_literals, parse_mapping, Literal, LiteralError};
pub use parse::{parse_line, split_words, ParsedLine, DOTTED_VERBS, VERBS};
pub use shell::{Console, Flow, DEFAULT_PROMPT};
pub use validator::{validate, Checks};

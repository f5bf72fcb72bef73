//! Command dispatcher
//!
//! One line is parsed, validated, applied, persisted and answered before
//! the next is read. Every mutating verb saves the whole table at once.

use std::io::{BufRead, Write};

use super::errors::{ConsoleResult, ValidationError};
use super::help::help_text;
use super::parse::{parse_line, ParsedLine};
use super::validator::{validate, Checks};
use crate::model::{AttrValue, PROTECTED_ATTRIBUTES};
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::storage::{composite_key, FileStorage};

/// Default prompt literal.
pub const DEFAULT_PROMPT: &str = "(hbnb) ";

/// Whether the loop should keep reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Interactive console over a storage engine, writing to `out`
pub struct Console<W: Write> {
    storage: FileStorage,
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(storage: FileStorage, out: W) -> Self {
        Self { storage, out }
    }

    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_parts(self) -> (FileStorage, W) {
        (self.storage, self.out)
    }

    /// Reads lines from `input` until `quit`, `EOF` or end of input.
    ///
    /// The prompt, when given, is written before each line is read. Bytes
    /// that are not UTF-8 are replaced, so such a line reaches the parser
    /// as unknown syntax instead of ending the session.
    pub fn run<R: BufRead>(&mut self, mut input: R, prompt: Option<&str>) -> ConsoleResult<()> {
        let mut buf = Vec::new();
        loop {
            if let Some(prompt) = prompt {
                write!(self.out, "{}", prompt)?;
                self.out.flush()?;
            }

            buf.clear();
            let flow = if input.read_until(b'\n', &mut buf)? == 0 {
                self.onecmd("EOF")?
            } else {
                self.onecmd(&String::from_utf8_lossy(&buf))?
            };

            if flow == Flow::Exit {
                break;
            }
        }
        log_event(Event::ShutdownComplete);
        Ok(())
    }

    /// Interprets one line of input.
    pub fn onecmd(&mut self, line: &str) -> ConsoleResult<Flow> {
        match parse_line(line) {
            ParsedLine::Empty => Ok(Flow::Continue),
            ParsedLine::Simple { verb, args } => self.dispatch(&verb, &args),
            ParsedLine::BulkUpdate {
                class_name,
                id,
                pairs,
            } => {
                self.do_bulk_update(class_name, id, pairs)?;
                Ok(Flow::Continue)
            }
            ParsedLine::Unknown(text) => {
                writeln!(self.out, "*** Unknown syntax: {}", text)?;
                Ok(Flow::Continue)
            }
        }
    }

    fn dispatch(&mut self, verb: &str, args: &[String]) -> ConsoleResult<Flow> {
        match verb {
            "EOF" | "quit" => return Ok(Flow::Exit),
            "help" => self.do_help(args)?,
            "create" => self.do_create(args)?,
            "show" => self.do_show(args)?,
            "destroy" => self.do_destroy(args)?,
            "all" => self.do_all(args)?,
            "count" => self.do_count(args)?,
            "update" => self.do_update(args)?,
            other => writeln!(self.out, "*** Unknown syntax: {}", other)?,
        }
        Ok(Flow::Continue)
    }

    /// Runs the validator; on failure prints its message and returns false.
    fn check(&mut self, args: &[String], checks: Checks) -> ConsoleResult<bool> {
        match validate(args, self.storage.registry(), self.storage.all(), checks) {
            Ok(()) => Ok(true),
            Err(e) => {
                self.reject(args, e)?;
                Ok(false)
            }
        }
    }

    fn reject(&mut self, args: &[String], error: ValidationError) -> ConsoleResult<()> {
        let joined = args.join(" ");
        let message = error.to_string();
        log_event_with_fields(
            Event::CommandRejected,
            &[("args", &joined), ("reason", &message)],
        );
        writeln!(self.out, "{}", message)?;
        Ok(())
    }

    fn do_help(&mut self, args: &[String]) -> ConsoleResult<()> {
        let text = help_text(args.first().map(String::as_str));
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    fn do_create(&mut self, args: &[String]) -> ConsoleResult<()> {
        if !self.check(args, Checks::CLASS)? {
            return Ok(());
        }
        let Some(record) = self.storage.registry().create(&args[0]) else {
            return self.reject(args, ValidationError::ClassDoesNotExist);
        };

        let id = record.id().to_string();
        let key = record.key();
        self.storage.insert(record);
        self.storage.save()?;

        log_event_with_fields(Event::RecordCreated, &[("key", &key)]);
        writeln!(self.out, "{}", id)?;
        Ok(())
    }

    fn do_show(&mut self, args: &[String]) -> ConsoleResult<()> {
        if !self.check(args, Checks::INSTANCE)? {
            return Ok(());
        }
        let key = composite_key(&args[0], &args[1]);
        if let Some(record) = self.storage.all().get(&key) {
            writeln!(self.out, "{}", record)?;
        }
        Ok(())
    }

    fn do_destroy(&mut self, args: &[String]) -> ConsoleResult<()> {
        if !self.check(args, Checks::INSTANCE)? {
            return Ok(());
        }
        let key = composite_key(&args[0], &args[1]);
        if self.storage.remove(&key).is_some() {
            self.storage.save()?;
            log_event_with_fields(Event::RecordDestroyed, &[("key", &key)]);
        }
        Ok(())
    }

    fn do_all(&mut self, args: &[String]) -> ConsoleResult<()> {
        let lines: Vec<String> = if args.is_empty() {
            self.storage
                .all()
                .iter()
                .map(|(_, record)| record.to_string())
                .collect()
        } else {
            if !self.check(args, Checks::CLASS)? {
                return Ok(());
            }
            self.storage
                .all()
                .of_type(&args[0])
                .map(|record| record.to_string())
                .collect()
        };

        for line in lines {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    fn do_count(&mut self, args: &[String]) -> ConsoleResult<()> {
        let count = if args.is_empty() {
            self.storage.all().len()
        } else {
            if !self.check(args, Checks::CLASS)? {
                return Ok(());
            }
            self.storage.all().of_type(&args[0]).count()
        };
        writeln!(self.out, "{}", count)?;
        Ok(())
    }

    fn do_update(&mut self, args: &[String]) -> ConsoleResult<()> {
        if !self.check(args, Checks::ATTRIBUTE)? {
            return Ok(());
        }
        let key = composite_key(&args[0], &args[1]);
        let attribute = args[2].as_str();
        if PROTECTED_ATTRIBUTES.contains(&attribute) {
            return Ok(());
        }

        let value = AttrValue::coerce(&args[3]);
        let Some(record) = self.storage.all_mut().get_mut(&key) else {
            return self.reject(args, ValidationError::NoInstanceFound);
        };
        record.set(attribute, value);
        record.touch();
        self.storage.save()?;

        log_event_with_fields(
            Event::RecordUpdated,
            &[("attribute", attribute), ("key", &key)],
        );
        Ok(())
    }

    /// `Class.update(id, {k: v, ...})`: the instance is checked once, then
    /// each pair runs as its own `update Class id k v`, in order.
    fn do_bulk_update(
        &mut self,
        class_name: String,
        id: String,
        pairs: Vec<(String, String)>,
    ) -> ConsoleResult<()> {
        let target = vec![class_name, id];
        if !self.check(&target, Checks::INSTANCE)? {
            return Ok(());
        }

        for (attribute, value) in pairs {
            let args = vec![target[0].clone(), target[1].clone(), attribute, value];
            self.do_update(&args)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeRegistry;
    use tempfile::TempDir;

    fn console(temp_dir: &TempDir) -> Console<Vec<u8>> {
        let storage = FileStorage::new(temp_dir.path().join("storage.json"), TypeRegistry::standard());
        Console::new(storage, Vec::new())
    }

    fn take_output(console: &mut Console<Vec<u8>>) -> String {
        String::from_utf8(std::mem::take(&mut console.out)).unwrap()
    }

    #[test]
    fn test_quit_and_eof_exit_silently() {
        let temp_dir = TempDir::new().unwrap();
        let mut console = console(&temp_dir);
        assert_eq!(console.onecmd("quit").unwrap(), Flow::Exit);
        assert_eq!(console.onecmd("EOF").unwrap(), Flow::Exit);
        assert_eq!(console.onecmd("").unwrap(), Flow::Continue);
        assert_eq!(take_output(&mut console), "");
    }

    #[test]
    fn test_create_prints_id_and_saves() {
        let temp_dir = TempDir::new().unwrap();
        let mut console = console(&temp_dir);

        console.onecmd("create BaseModel").unwrap();
        let id = take_output(&mut console).trim().to_string();

        assert!(console.storage().all().contains_key(&format!("BaseModel.{}", id)));
        assert!(console.storage().path().exists());
    }

    #[test]
    fn test_unknown_syntax() {
        let temp_dir = TempDir::new().unwrap();
        let mut console = console(&temp_dir);
        console.onecmd("fly away").unwrap();
        console.onecmd("User.fly()").unwrap();
        assert_eq!(
            take_output(&mut console),
            "*** Unknown syntax: fly away\n*** Unknown syntax: User.fly()\n"
        );
    }

    #[test]
    fn test_run_survives_invalid_utf8_line() {
        let temp_dir = TempDir::new().unwrap();
        let mut console = console(&temp_dir);
        let input = std::io::Cursor::new(b"create User\n\xff\xfe\ncount User\n".to_vec());
        console.run(input, None).unwrap();

        let output = take_output(&mut console);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "*** Unknown syntax: \u{FFFD}\u{FFFD}");
        assert_eq!(lines[2], "1");
    }

    #[test]
    fn test_update_protected_attribute_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let mut console = console(&temp_dir);
        console.onecmd("create User").unwrap();
        let id = take_output(&mut console).trim().to_string();

        console.onecmd(&format!("update User {} id other", id)).unwrap();
        assert_eq!(take_output(&mut console), "");
        assert!(console.storage().all().contains_key(&format!("User.{}", id)));
    }

    #[test]
    fn test_run_stops_at_end_of_input() {
        let temp_dir = TempDir::new().unwrap();
        let mut console = console(&temp_dir);
        let input = std::io::Cursor::new("create State\ncount State\n");
        console.run(input, Some(DEFAULT_PROMPT)).unwrap();

        let output = take_output(&mut console);
        assert!(output.starts_with(DEFAULT_PROMPT));
        assert!(output.contains("(hbnb) 1\n"));
        assert!(output.ends_with(DEFAULT_PROMPT));
    }
}

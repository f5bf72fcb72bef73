//! Observability subsystem for modelshell
//!
//! Structured JSON logging of typed lifecycle events.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. No async or background threads
//! 4. Stdout is never written
//!
//! # Usage
//!
//! ```ignore
//! use modelshell::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::RecordCreated, &[("key", "User.1234")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = match event {
        e if e.is_fatal() => Severity::Fatal,
        Event::CommandRejected => Severity::Trace,
        _ => Severity::Info,
    };
    Logger::log(severity, event.as_str(), fields);
}

//! Observable events for modelshell
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events in a shell session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Shell startup begins
    BootStart,
    /// Configuration loaded
    ConfigLoaded,
    /// Interactive loop finished
    ShutdownComplete,

    // Storage
    /// Backing file loaded into the table
    StorageReloaded,
    /// Table written to the backing file
    StorageSaved,
    /// Backing file present but unreadable (FATAL)
    StorageCorruption,

    // Records
    /// New record inserted
    RecordCreated,
    /// Attribute set on a record
    RecordUpdated,
    /// Record removed from the table
    RecordDestroyed,

    // Commands
    /// Command refused by argument validation
    CommandRejected,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "MODELSHELL_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::StorageReloaded => "STORAGE_RELOADED",
            Event::StorageSaved => "STORAGE_SAVED",
            Event::StorageCorruption => "STORAGE_CORRUPTION",

            Event::RecordCreated => "RECORD_CREATED",
            Event::RecordUpdated => "RECORD_UPDATED",
            Event::RecordDestroyed => "RECORD_DESTROYED",

            Event::CommandRejected => "COMMAND_REJECTED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::StorageCorruption)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::BootStart,
            Event::ConfigLoaded,
            Event::ShutdownComplete,
            Event::StorageReloaded,
            Event::StorageSaved,
            Event::StorageCorruption,
            Event::RecordCreated,
            Event::RecordUpdated,
            Event::RecordDestroyed,
            Event::CommandRejected,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_fatal_events() {
        assert!(Event::StorageCorruption.is_fatal());
        assert!(!Event::StorageSaved.is_fatal());
        assert!(!Event::CommandRejected.is_fatal());
    }
}

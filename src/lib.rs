//! modelshell - a line-oriented command shell over a flat JSON record store
//!
//! Subsystems:
//! - `model`: records, attribute values and the type registry
//! - `storage`: the in-memory table and its JSON snapshot file
//! - `console`: line parsing, validation and verb handlers
//! - `cli`: configuration, boot and the interactive loop
//! - `observability`: structured logging

pub mod cli;
pub mod console;
pub mod model;
pub mod observability;
pub mod storage;

//! CLI command handlers

pub mod commands;

pub use commands::{check, check_report, functions, validate, watch, FieldCheck};

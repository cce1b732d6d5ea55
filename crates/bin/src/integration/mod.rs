//! Glue between the CLI commands and the library crates.
//!
//! Environment setup, concurrent fetching and progress reporting live here so
//! that each command in `main.rs` reads as a sequence of status steps.

pub(crate) mod environment;
pub(crate) mod fetch;
pub(crate) mod progress;

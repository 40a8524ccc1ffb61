//! CLI module - Command-line interface for the application.
//!
//! - `serve` starts the HTTP server
//! - `migrate` manages database migrations
//! - `seed` creates the default accounts

pub mod args;

pub use args::{Cli, Commands};

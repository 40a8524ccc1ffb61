//! User Admin API - role-gated user management over HTTP
//!
//! Administrators list, view, create, update and delete user accounts.
//! Every other authenticated caller is refused with `403 Forbidden`.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Users, roles, passwords and the access policy
//! - **services**: Authentication and user management use cases
//! - **infra**: Database connection, migrations and repositories
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Apply migrations and create the default accounts
//! cargo run -- migrate up
//! cargo run -- seed
//!
//! # Start the server
//! cargo run -- serve --port 3000
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, Role, User};
pub use errors::{AppError, AppResult};

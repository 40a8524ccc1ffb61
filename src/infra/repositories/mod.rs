//! Repository layer - Data access abstraction
//!
//! Repositories hide SeaORM entities behind traits that speak domain types.

pub(crate) mod entities;
mod user_repository;

pub use user_repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;

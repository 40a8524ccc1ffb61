//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and repositories. They depend on
//! traits so the HTTP layer and tests can swap implementations.

mod auth_service;
pub mod container;
mod user_service;

pub use container::Services;

pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use user_service::{CreateUserInput, UpdateUserInput, UserManager, UserService};

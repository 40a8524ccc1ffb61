//! Domain layer - Users, roles and the access rules over them.
//!
//! Nothing here touches HTTP or the database.

pub mod access;
pub mod password;
pub mod role;
pub mod user;

pub use access::{check, check_any, Access, Operation};
pub use password::Password;
pub use role::Role;
pub use user::{format_timestamp, NewUser, User, UserChanges, UserResource};

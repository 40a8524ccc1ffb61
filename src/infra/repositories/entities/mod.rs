//! SeaORM entity definitions, kept apart from the domain models.

pub mod user;
pub mod user_role;

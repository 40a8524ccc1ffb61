//! Role gate for user management operations.
//!
//! Decisions are pure: the same role and operation always produce the
//! same answer, and no request state is consulted.

use super::Role;

/// User management operations subject to the role gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    View,
    Create,
    /// Create with an explicit `role` field
    CreateWithRole,
    Update,
    /// Update carrying a `role` field
    UpdateRole,
    Delete,
}

impl Operation {
    /// All gated operations
    pub const ALL: [Operation; 7] = [
        Operation::List,
        Operation::View,
        Operation::Create,
        Operation::CreateWithRole,
        Operation::Update,
        Operation::UpdateRole,
        Operation::Delete,
    ];
}

/// Outcome of a gate check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied,
}

impl Access {
    pub fn is_allowed(self) -> bool {
        self == Access::Allowed
    }
}

/// Decide whether `role` may perform `operation`.
///
/// Only admins manage users; every other role is denied on every operation.
pub fn check(role: Role, operation: Operation) -> Access {
    match (role, operation) {
        (Role::Admin, _) => Access::Allowed,
        (Role::Manager | Role::User, _) => Access::Denied,
    }
}

/// Decide for a caller holding several roles: allowed if any role is.
pub fn check_any(roles: &[Role], operation: Operation) -> Access {
    if roles.iter().any(|role| check(*role, operation).is_allowed()) {
        Access::Allowed
    } else {
        Access::Denied
    }
}

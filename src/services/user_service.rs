//! User service - User management use cases.
//!
//! Role checks happen at the HTTP boundary; this layer assumes the caller
//! is already authorized.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{NewUser, Password, Role, User, UserChanges};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UserRepository;
use crate::types::{Paginated, PaginationParams};

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to [`Role::User`]
    pub role: Option<Role>,
}

/// Input for updating a user; `None` fields are left as they are
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// One page of users
    async fn list_users(&self, params: PaginationParams) -> AppResult<Paginated<User>>;

    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Create a user with a hashed password and a single role
    async fn create_user(&self, input: CreateUserInput) -> AppResult<User>;

    /// Update profile fields, password or role
    async fn update_user(&self, id: Uuid, input: UpdateUserInput) -> AppResult<User>;

    /// Permanently delete a user
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of UserService over a repository.
pub struct UserManager {
    users: Arc<dyn UserRepository>,
}

impl UserManager {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Fail with a conflict if `email` belongs to someone other than `owner`
    async fn ensure_email_free(&self, email: &str, owner: Option<Uuid>) -> AppResult<()> {
        match self.users.find_by_email(email).await? {
            Some(existing) if Some(existing.id) != owner => Err(AppError::conflict("Email")),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn list_users(&self, params: PaginationParams) -> AppResult<Paginated<User>> {
        let (users, total) = self.users.list(params).await?;
        Ok(Paginated::new(users, &params, total))
    }

    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.users.find_by_id(id).await?.ok_or_not_found()
    }

    async fn create_user(&self, input: CreateUserInput) -> AppResult<User> {
        self.ensure_email_free(&input.email, None).await?;

        let password = Password::new(&input.password)?;
        let user = self
            .users
            .create(NewUser {
                name: input.name,
                email: input.email,
                password_hash: password.into_string(),
                role: input.role.unwrap_or_default(),
            })
            .await?;

        tracing::info!(user_id = %user.id, roles = ?user.roles, "User created");
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, input: UpdateUserInput) -> AppResult<User> {
        if let Some(email) = input.email.as_deref() {
            self.ensure_email_free(email, Some(id)).await?;
        }

        let password_hash = match input.password.as_deref() {
            Some(plain) => Some(Password::new(plain)?.into_string()),
            None => None,
        };

        let changes = UserChanges {
            name: input.name,
            email: input.email,
            password_hash,
            role: input.role,
        };

        if changes.is_empty() {
            return self.get_user(id).await;
        }

        let user = self.users.update(id, changes).await?;
        tracing::info!(user_id = %user.id, roles = ?user.roles, "User updated");
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.users.delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}

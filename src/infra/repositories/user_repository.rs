//! User repository backed by SeaORM.
//!
//! A user spans two tables: the `users` row and its `user_roles`
//! assignments. Writes touching both run in one transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use super::entities::{user, user_role};
use crate::domain::{NewUser, Role, User, UserChanges};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// One page of users in creation order, plus the total count
    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<User>, u64)>;

    /// Insert a user and its role assignment
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Apply changes; a role replaces all current assignments
    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User>;

    /// Permanently delete a user and its role assignments
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM implementation of [`UserRepository`]
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Build the domain entity from a row and its role names.
///
/// Rows missing a timestamp or a role break the entity invariant and are
/// reported as internal errors instead of being patched up.
pub(crate) fn to_domain(model: user::Model, role_names: &[String]) -> AppResult<User> {
    let created_at = model
        .created_at
        .ok_or_else(|| AppError::internal(format!("user {} has no created_at", model.id)))?;
    let updated_at = model
        .updated_at
        .ok_or_else(|| AppError::internal(format!("user {} has no updated_at", model.id)))?;

    let mut roles = role_names
        .iter()
        .map(|name| {
            name.parse::<Role>().map_err(|_| {
                AppError::internal(format!("user {} has unknown role '{}'", model.id, name))
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    if roles.is_empty() {
        return Err(AppError::internal(format!(
            "user {} has no role assigned",
            model.id
        )));
    }
    roles.sort();
    roles.dedup();

    Ok(User {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        roles,
        created_at,
        updated_at,
    })
}

/// Role names per user for the given ids
async fn roles_for<C: ConnectionTrait>(
    db: &C,
    ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<String>>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = user_role::Entity::find()
        .filter(user_role::Column::UserId.is_in(ids.iter().copied()))
        .all(db)
        .await?;

    let mut by_user: HashMap<Uuid, Vec<String>> = HashMap::new();
    for row in rows {
        by_user.entry(row.user_id).or_default().push(row.role);
    }
    Ok(by_user)
}

async fn hydrate<C: ConnectionTrait>(db: &C, models: Vec<user::Model>) -> AppResult<Vec<User>> {
    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let roles = roles_for(db, &ids).await?;

    models
        .into_iter()
        .map(|model| {
            let names = roles.get(&model.id).map(Vec::as_slice).unwrap_or(&[]);
            to_domain(model, names)
        })
        .collect()
}

async fn hydrate_one<C: ConnectionTrait>(
    db: &C,
    model: Option<user::Model>,
) -> AppResult<Option<User>> {
    match model {
        Some(model) => Ok(hydrate(db, vec![model]).await?.pop()),
        None => Ok(None),
    }
}

async fn assign_role<C: ConnectionTrait>(db: &C, user_id: Uuid, role: Role) -> Result<(), DbErr> {
    user_role::Entity::insert(user_role::ActiveModel {
        user_id: Set(user_id),
        role: Set(role.as_str().to_string()),
    })
    .exec_without_returning(db)
    .await?;
    Ok(())
}

/// Unique violations on `users.email` surface as conflicts
fn map_write_err(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict("Email"),
        _ => AppError::from(err),
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;
        hydrate_one(&self.db, model).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        hydrate_one(&self.db, model).await
    }

    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<User>, u64)> {
        let paginator = user::Entity::find()
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Id)
            .paginate(&self.db, params.limit());

        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page_index()).await?;

        Ok((hydrate(&self.db, models).await?, total))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_user.name),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        }
        .insert(&txn)
        .await
        .map_err(map_write_err)?;

        assign_role(&txn, model.id, new_user.role).await?;
        txn.commit().await?;

        tracing::debug!(user_id = %model.id, role = %new_user.role, "User inserted");
        to_domain(model, &[new_user.role.as_str().to_string()])
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User> {
        let txn = self.db.begin().await?;

        let model = user::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: user::ActiveModel = model.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(password_hash) = changes.password_hash {
            active.password_hash = Set(password_hash);
        }
        active.updated_at = Set(Some(Utc::now()));

        let model = active.update(&txn).await.map_err(map_write_err)?;

        if let Some(role) = changes.role {
            user_role::Entity::delete_many()
                .filter(user_role::Column::UserId.eq(id))
                .exec(&txn)
                .await?;
            assign_role(&txn, id, role).await?;
        }

        let user = hydrate_one(&txn, Some(model)).await?.ok_or(AppError::NotFound)?;
        txn.commit().await?;

        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let txn = self.db.begin().await?;

        user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(id))
            .exec(&txn)
            .await?;

        let result = user::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        txn.commit().await?;
        Ok(())
    }
}

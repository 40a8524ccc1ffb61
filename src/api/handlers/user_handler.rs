//! User management handlers.
//!
//! Every handler runs the role gate before it looks at the path, query or
//! body, so a caller without the right role always gets a 403.

use std::borrow::Cow;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Extension, Path, Query, State,
    },
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{authorize, CurrentUser};
use crate::api::AppState;
use crate::config::{
    MSG_USERS_RETRIEVED, MSG_USER_CREATED, MSG_USER_DELETED, MSG_USER_RETRIEVED,
    MSG_USER_UPDATED,
};
use crate::domain::{Operation, Role, UserResource};
use crate::errors::{AppError, AppResult};
use crate::services::{CreateUserInput, UpdateUserInput};
use crate::types::{ApiResponse, PaginationParams};

/// User creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "create_passwords_match"))]
pub struct CreateUserRequest {
    /// User display name
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "John Doe")]
    pub name: String,
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    /// Must repeat `password`
    #[schema(example = "SecurePass123!")]
    pub confirm_password: String,
    /// Role to assign; defaults to `user`
    pub role: Option<Role>,
}

/// User update request; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "update_passwords_match"))]
pub struct UpdateUserRequest {
    /// New display name
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    /// New email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "jane@example.com")]
    pub email: Option<String>,
    /// New password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
    /// Must repeat `password`
    pub confirm_password: Option<String>,
    /// Replacement role
    pub role: Option<Role>,
}

fn confirmation_mismatch() -> ValidationError {
    let mut error = ValidationError::new("confirm_password");
    error.message = Some(Cow::Borrowed("Password confirmation does not match"));
    error
}

fn create_passwords_match(request: &CreateUserRequest) -> Result<(), ValidationError> {
    if request.password == request.confirm_password {
        Ok(())
    } else {
        Err(confirmation_mismatch())
    }
}

fn update_passwords_match(request: &UpdateUserRequest) -> Result<(), ValidationError> {
    if request.password == request.confirm_password {
        Ok(())
    } else {
        Err(confirmation_mismatch())
    }
}

/// A malformed id cannot name a user
fn user_id(path: Result<Path<Uuid>, PathRejection>) -> AppResult<Uuid> {
    path.map(|Path(id)| id).map_err(|e| {
        tracing::debug!("Rejected user id: {}", e.body_text());
        AppError::NotFound
    })
}

/// Create user routes, mounted under `/api`.
///
/// The collection also answers with a trailing slash (`/users/`), which
/// clients of the service already call.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/", get(list_users).post(create_user))
        .route("/users/:id", get(get_user).put(update_user).delete(delete_user))
}

/// List users (admin only)
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "`{message, data: [UserResource], meta}`", body = [UserResource]),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "User does not have the right roles.")
    )
)]
pub async fn list_users(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    query: Result<Query<PaginationParams>, QueryRejection>,
) -> AppResult<ApiResponse<Vec<UserResource>>> {
    authorize(&current_user, Operation::List)?;
    let Query(params) = query.map_err(|e| AppError::validation(e.body_text()))?;

    let page = state.user_service.list_users(params).await?;
    Ok(ApiResponse::paginated(
        page.map(UserResource::from),
        MSG_USERS_RETRIEVED,
    ))
}

/// View a user (admin only)
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "`{message, data: UserResource}`", body = UserResource),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "User does not have the right roles."),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<ApiResponse<UserResource>> {
    authorize(&current_user, Operation::View)?;
    let id = user_id(path)?;

    let user = state.user_service.get_user(id).await?;
    Ok(ApiResponse::with_data(UserResource::from(user), MSG_USER_RETRIEVED))
}

/// Create a user (admin only)
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "`{message: \"User created successfully.\", data: UserResource}`", body = UserResource),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "User does not have the right roles."),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn create_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    payload: Result<ValidatedJson<CreateUserRequest>, AppError>,
) -> AppResult<ApiResponse<UserResource>> {
    authorize(&current_user, Operation::Create)?;
    let ValidatedJson(payload) = payload?;
    if payload.role.is_some() {
        authorize(&current_user, Operation::CreateWithRole)?;
    }

    let user = state
        .user_service
        .create_user(CreateUserInput {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            role: payload.role,
        })
        .await?;

    Ok(ApiResponse::with_data(UserResource::from(user), MSG_USER_CREATED))
}

/// Update a user (admin only)
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "`{message, data: UserResource}`", body = UserResource),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "User does not have the right roles."),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn update_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<ValidatedJson<UpdateUserRequest>, AppError>,
) -> AppResult<ApiResponse<UserResource>> {
    authorize(&current_user, Operation::Update)?;
    let id = user_id(path)?;
    let ValidatedJson(payload) = payload?;
    if payload.role.is_some() {
        authorize(&current_user, Operation::UpdateRole)?;
    }

    let user = state
        .user_service
        .update_user(
            id,
            UpdateUserInput {
                name: payload.name,
                email: payload.email,
                password: payload.password,
                role: payload.role,
            },
        )
        .await?;

    Ok(ApiResponse::with_data(UserResource::from(user), MSG_USER_UPDATED))
}

/// Delete a user (admin only)
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "`{message: \"User deleted successfully.\"}`"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "User does not have the right roles."),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<ApiResponse<()>> {
    authorize(&current_user, Operation::Delete)?;
    let id = user_id(path)?;

    state.user_service.delete_user(id).await?;
    Ok(ApiResponse::message(MSG_USER_DELETED))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(password: &str, confirm: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: "Someone".to_string(),
            email: "someone@example.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            role: None,
        }
    }

    #[test]
    fn test_create_request_valid() {
        assert!(create_request("password", "password").validate().is_ok());
    }

    #[test]
    fn test_create_request_confirmation_mismatch() {
        assert!(create_request("password", "passw0rd").validate().is_err());
    }

    #[test]
    fn test_create_request_role_parses() {
        let request: CreateUserRequest = serde_json::from_value(serde_json::json!({
            "name": "M",
            "email": "m@example.com",
            "password": "password",
            "confirm_password": "password",
            "role": "manager"
        }))
        .unwrap();
        assert_eq!(request.role, Some(Role::Manager));
    }

    #[test]
    fn test_update_request_partial() {
        let request: UpdateUserRequest =
            serde_json::from_value(serde_json::json!({"role": "manager"})).unwrap();
        assert!(request.validate().is_ok());
        assert!(request.name.is_none());
    }

    #[test]
    fn test_update_request_password_needs_confirmation() {
        let request: UpdateUserRequest =
            serde_json::from_value(serde_json::json!({"password": "new-password"})).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_request_rejects_empty_name() {
        let request: UpdateUserRequest =
            serde_json::from_value(serde_json::json!({"name": ""})).unwrap();
        assert!(request.validate().is_err());
    }
}

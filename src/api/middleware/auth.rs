//! Authentication guard and role gate wrapper.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::domain::{check_any, Access, Operation, Role, User};
use crate::errors::{AppError, AppResult};

/// Caller identity resolved by [`auth_middleware`], with its current roles
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub roles: Vec<Role>,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            roles: user.roles.clone(),
        }
    }
}

/// JWT authentication middleware.
///
/// Verifies the bearer token, then loads the caller so that role changes
/// made after the token was issued are honoured. The resolved
/// [`CurrentUser`] is stored in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .ok_or(AppError::Unauthorized)?;

    let claims = state.auth_service.verify_token(token)?;

    let user = match state.user_service.get_user(claims.sub).await {
        Ok(user) => user,
        // Token outlived its user
        Err(AppError::NotFound) => return Err(AppError::Unauthorized),
        Err(e) => return Err(e),
    };

    request.extensions_mut().insert(CurrentUser::from(&user));

    Ok(next.run(request).await)
}

/// Run the role gate for `operation`; denial becomes a 403.
pub fn authorize(user: &CurrentUser, operation: Operation) -> AppResult<()> {
    match check_any(&user.roles, operation) {
        Access::Allowed => Ok(()),
        Access::Denied => {
            tracing::warn!(
                user_id = %user.id,
                roles = ?user.roles,
                operation = ?operation,
                "Role gate denied request"
            );
            Err(AppError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(roles: Vec<Role>) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "caller@example.com".to_string(),
            roles,
        }
    }

    #[test]
    fn test_authorize_admin() {
        assert!(authorize(&caller(vec![Role::Admin]), Operation::UpdateRole).is_ok());
    }

    #[test]
    fn test_authorize_denies_with_forbidden() {
        for roles in [vec![Role::Manager], vec![Role::User], vec![]] {
            let result = authorize(&caller(roles), Operation::List);
            assert!(matches!(result, Err(AppError::Forbidden)));
        }
    }
}

//! Shared fixtures for the HTTP integration tests.
//!
//! The router runs against an in-memory [`UserRepository`] seeded with the
//! default accounts, so no database is needed.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use user_admin_api::api::{create_router, AppState};
use user_admin_api::config::{Config, SEED_ACCOUNTS, SEED_PASSWORD};
use user_admin_api::domain::{NewUser, Password, Role, User, UserChanges};
use user_admin_api::errors::{AppError, AppResult};
use user_admin_api::infra::{Database, UserRepository};
use user_admin_api::services::Services;
use user_admin_api::types::PaginationParams;

pub const TEST_SECRET: &str = "integration-test-secret-key-32-chars!";

/// Argon2 is slow in debug builds; hash the shared seed password once.
fn seed_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| {
        Password::new(SEED_PASSWORD)
            .expect("seed password is valid")
            .into_string()
    })
    .clone()
}

/// Vec-backed repository; insertion order is creation order.
#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<User>>,
}

impl InMemoryUsers {
    fn email_taken(rows: &[User], email: &str, owner: Option<Uuid>) -> bool {
        rows.iter()
            .any(|u| u.email == email && Some(u.id) != owner)
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<User>, u64)> {
        let rows = self.rows.lock().unwrap();
        let page = rows
            .iter()
            .skip(params.offset() as usize)
            .take(params.limit() as usize)
            .cloned()
            .collect();
        Ok((page, rows.len() as u64))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut rows = self.rows.lock().unwrap();
        if Self::email_taken(&rows, &new_user.email, None) {
            return Err(AppError::conflict("Email"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            roles: vec![new_user.role],
            created_at: now,
            updated_at: now,
        };
        rows.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(email) = changes.email.as_deref() {
            if Self::email_taken(&rows, email, Some(id)) {
                return Err(AppError::conflict("Email"));
            }
        }

        let user = rows
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(role) = changes.role {
            user.roles = vec![role];
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|u| u.id != id);
        if rows.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

/// Router plus handles to the seeded accounts
pub struct TestApp {
    pub router: Router,
    pub services: Services,
    pub repository: Arc<InMemoryUsers>,
    accounts: HashMap<String, User>,
}

impl TestApp {
    pub async fn new() -> Self {
        let repository = Arc::new(InMemoryUsers::default());
        let mut accounts = HashMap::new();
        for (name, email, role) in SEED_ACCOUNTS {
            let user = repository
                .create(NewUser {
                    name: (*name).to_string(),
                    email: (*email).to_string(),
                    password_hash: seed_hash(),
                    role: role.parse::<Role>().unwrap(),
                })
                .await
                .unwrap();
            accounts.insert((*email).to_string(), user);
        }

        let config = Config::new("postgres://unused", TEST_SECRET);
        let services = Services::from_repository(repository.clone(), config);
        let database = Arc::new(Database::from_connection(DatabaseConnection::Disconnected));
        let router = create_router(AppState::from_services(&services, database));

        Self {
            router,
            services,
            repository,
            accounts,
        }
    }

    /// Seeded account by email
    pub fn account(&self, email: &str) -> &User {
        &self.accounts[email]
    }

    /// Fresh bearer token for a seeded account
    pub fn token_for(&self, email: &str) -> String {
        self.services
            .auth()
            .issue_token(self.account(email))
            .unwrap()
            .access_token
    }

    pub fn admin_token(&self) -> String {
        self.token_for("admin@example.com")
    }

    /// Send a request and decode the JSON body (`Value::Null` when empty)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}

//! Seed command - Creates the default accounts.
//!
//! Accounts that already exist are left untouched, so the command can be
//! re-run safely.

use std::str::FromStr;

use crate::config::{Config, SEED_ACCOUNTS, SEED_PASSWORD};
use crate::domain::Role;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;
use crate::services::{CreateUserInput, Services};

/// Execute the seed command
pub async fn execute(config: Config) -> AppResult<()> {
    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let services = Services::from_connection(db.get_connection(), config);
    let users = services.users();

    let mut created = 0usize;
    for (name, email, role) in SEED_ACCOUNTS {
        let input = CreateUserInput {
            name: (*name).to_string(),
            email: (*email).to_string(),
            password: SEED_PASSWORD.to_string(),
            role: Some(Role::from_str(role)?),
        };

        match users.create_user(input).await {
            Ok(user) => {
                created += 1;
                tracing::info!(user_id = %user.id, email = %user.email, role = %role, "Seeded account");
            }
            Err(AppError::Conflict(_)) => {
                tracing::info!(email = %email, "Account already exists, skipping");
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(created, total = SEED_ACCOUNTS.len(), "Seeding finished");
    Ok(())
}

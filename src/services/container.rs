//! Service container - Wires repositories into services.

use std::sync::Arc;

use super::{AuthService, Authenticator, UserManager, UserService};
use crate::config::Config;
use crate::infra::{UserRepository, UserStore};

/// Holds one instance of every application service
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
}

impl Services {
    /// Build all services on top of a single user repository
    pub fn from_repository(users: Arc<dyn UserRepository>, config: Config) -> Self {
        Self {
            auth_service: Arc::new(Authenticator::new(users.clone(), config)),
            user_service: Arc::new(UserManager::new(users)),
        }
    }

    /// Build all services over a database connection
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        Self::from_repository(Arc::new(UserStore::new(db)), config)
    }

    pub fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    pub fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }
}

//! Wiring between configuration, storage and the HTTP routes.

use actix_web::web;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::auth::{BcryptHasher, HashError, JwtService, PasswordHasher, TokenService};
use crate::config::Config;
use crate::repository::{
    self, MemoryStore, MemoryTaskRepository, MemoryUserRepository, PgTaskRepository,
    PgUserRepository, TaskRepository, UserRepository,
};
use crate::routes;
use crate::usecases::{TaskUseCase, UserUseCase};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to connect to database: {0}")]
    Connect(#[from] sqlx::Error),
    #[error("failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("failed to prepare password hasher: {0}")]
    Hasher(#[from] HashError),
}

/// The use-cases and token service shared by every worker.
///
/// Built once at startup; cloning only bumps reference counts.
#[derive(Clone)]
pub struct Services {
    users: web::Data<UserUseCase>,
    tasks: web::Data<TaskUseCase>,
    tokens: Arc<dyn TokenService>,
}

impl Services {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        task_repository: Arc<dyn TaskRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        timeout: Duration,
    ) -> Result<Self, StartupError> {
        let users = UserUseCase::new(user_repository, hasher, Arc::clone(&tokens), timeout)?;
        let tasks = TaskUseCase::new(task_repository, timeout);
        Ok(Self {
            users: web::Data::new(users),
            tasks: web::Data::new(tasks),
            tokens,
        })
    }

    /// Services over a fresh in-process store.
    pub fn in_memory(
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        timeout: Duration,
    ) -> Result<Self, StartupError> {
        let store = MemoryStore::new();
        Self::new(
            Arc::new(MemoryUserRepository::new(store.clone())),
            Arc::new(MemoryTaskRepository::new(store)),
            hasher,
            tokens,
            timeout,
        )
    }

    /// Builds the services described by `config`, connecting to and migrating
    /// PostgreSQL when `DATABASE_URL` is set.
    pub async fn from_config(config: &Config) -> Result<Self, StartupError> {
        let hasher: Arc<dyn PasswordHasher> = Arc::new(BcryptHasher::new(config.bcrypt_cost));
        let tokens: Arc<dyn TokenService> =
            Arc::new(JwtService::new(&config.jwt_secret, config.token_ttl));

        let Some(database_url) = config.database_url.as_deref() else {
            log::warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
            return Self::in_memory(hasher, tokens, config.request_timeout);
        };

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(config.request_timeout)
            .connect(database_url)
            .await?;
        repository::postgres::migrate(&pool).await?;
        log::info!("connected to PostgreSQL and applied migrations");

        Self::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgTaskRepository::new(pool)),
            hasher,
            tokens,
            config.request_timeout,
        )
    }

    /// Registers the shared state and the API routes on `cfg`.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.users.clone())
            .app_data(self.tasks.clone());
        routes::config(cfg, Arc::clone(&self.tokens));
    }
}

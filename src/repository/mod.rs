//! Storage adapters for users and tasks.
//!
//! The traits here are the only way the use-cases reach storage. They carry no
//! business rules: "no matching record" is reported through `Option`/`bool`
//! return values, and every backend failure is passed up unchanged as a
//! [`StorageError`]. Each call is a future; dropping it abandons the operation.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Task, TaskPatch, User};

pub use memory::{MemoryStore, MemoryTaskRepository, MemoryUserRepository};
pub use postgres::{PgTaskRepository, PgUserRepository};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list_users(&self) -> StorageResult<Vec<User>>;

    async fn find_by_username(&self, username: &str) -> StorageResult<Option<User>>;

    /// Inserts a new account unless the username is taken. The role is decided in
    /// the same atomic step: Admin when no account exists yet, User otherwise.
    /// Returns the stored user, or `None` when the username was taken.
    async fn insert_user(&self, username: &str, password_hash: &str)
        -> StorageResult<Option<User>>;

    /// Atomically sets the role to Admin when the user exists and is not already
    /// an admin. Returns the updated user, or `None` when nothing matched.
    async fn promote_user(&self, username: &str) -> StorageResult<Option<User>>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn list_tasks(&self) -> StorageResult<Vec<Task>>;

    async fn find_task(&self, id: &str) -> StorageResult<Option<Task>>;

    /// Inserts `task` unless its id is taken. Returns whether it was inserted.
    async fn insert_task(&self, task: Task) -> StorageResult<bool>;

    /// Merges `patch` into the task with `id` in one step. Returns the task after
    /// the update, or `None` when no task has that id.
    async fn update_task(&self, id: &str, patch: &TaskPatch) -> StorageResult<Option<Task>>;

    /// Returns whether a task was removed.
    async fn delete_task(&self, id: &str) -> StorageResult<bool>;
}

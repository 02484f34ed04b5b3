//! PostgreSQL repositories.
//!
//! Uniqueness and promotion rely on single statements: `ON CONFLICT DO NOTHING`
//! for inserts and `UPDATE ... RETURNING` guarded by a `WHERE` clause for
//! conditional updates. Registration additionally takes a table lock inside a
//! transaction, because the bootstrap role depends on whether any row exists.
//! The schema lives in `migrations/`.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{StorageResult, TaskRepository, UserRepository};
use crate::models::{Role, Task, TaskPatch, User};

const USER_COLUMNS: &str = "username, password_hash, role";
const TASK_COLUMNS: &str = "id, title, description, due_date, status";

/// Applies the embedded migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn list_users(&self) -> StorageResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY username"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn find_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> StorageResult<Option<User>> {
        let mut tx = self.pool.begin().await?;
        // Concurrent registrations queue here, so only one of them can see an empty table.
        sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password_hash, role)
             SELECT $1, $2, CASE WHEN EXISTS (SELECT 1 FROM users) THEN $3 ELSE $4 END
             ON CONFLICT (username) DO NOTHING
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(password_hash)
        .bind(Role::User)
        .bind(Role::Admin)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn promote_user(&self, username: &str) -> StorageResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = $2 WHERE username = $1 AND role = $3
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(Role::Admin)
        .bind(Role::User)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[derive(Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn list_tasks(&self) -> StorageResult<Vec<Task>> {
        let tasks =
            sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;
        Ok(tasks)
    }

    async fn find_task(&self, id: &str) -> StorageResult<Option<Task>> {
        let task =
            sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(task)
    }

    async fn insert_task(&self, task: Task) -> StorageResult<bool> {
        let result = sqlx::query(
            "INSERT INTO tasks (id, title, description, due_date, status)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.due_date)
        .bind(&task.status)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> StorageResult<Option<Task>> {
        // NULL text parameters keep the stored value; $5 tells whether due_date was sent.
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                due_date = CASE WHEN $5 THEN $6 ELSE due_date END
             WHERE id = $1
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.title.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.status.as_deref())
        .bind(patch.due_date.is_some())
        .bind(patch.due_date.flatten())
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn delete_task(&self, id: &str) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

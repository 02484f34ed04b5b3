//! In-process repositories backed by a shared [`MemoryStore`].
//!
//! Every operation holds the collection lock for its whole read-modify-write,
//! which gives the same single-record atomicity the SQL backend gets from
//! conditional statements. No lock is held across an `.await`.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{StorageError, StorageResult, TaskRepository, UserRepository};
use crate::models::{Role, Task, TaskPatch, User};

#[derive(Default)]
struct Collections {
    users: RwLock<HashMap<String, User>>,
    tasks: RwLock<BTreeMap<String, Task>>,
}

/// Handle to the in-process collections. Cloning shares the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<'a, T>(lock: &'a RwLock<T>, operation: &str) -> StorageResult<RwLockReadGuard<'a, T>> {
    lock.read()
        .map_err(|_| StorageError::Unavailable(format!("{}: lock poisoned", operation)))
}

fn write<'a, T>(lock: &'a RwLock<T>, operation: &str) -> StorageResult<RwLockWriteGuard<'a, T>> {
    lock.write()
        .map_err(|_| StorageError::Unavailable(format!("{}: lock poisoned", operation)))
}

#[derive(Clone)]
pub struct MemoryUserRepository {
    store: MemoryStore,
}

impl MemoryUserRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn list_users(&self) -> StorageResult<Vec<User>> {
        let users = read(&self.store.inner.users, "list_users")?;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(all)
    }

    async fn find_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let users = read(&self.store.inner.users, "find_by_username")?;
        Ok(users.get(username).cloned())
    }

    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> StorageResult<Option<User>> {
        let mut users = write(&self.store.inner.users, "insert_user")?;
        if users.contains_key(username) {
            return Ok(None);
        }
        let role = if users.is_empty() {
            Role::Admin
        } else {
            Role::User
        };
        let user = User {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
        };
        users.insert(user.username.clone(), user.clone());
        Ok(Some(user))
    }

    async fn promote_user(&self, username: &str) -> StorageResult<Option<User>> {
        let mut users = write(&self.store.inner.users, "promote_user")?;
        match users.get_mut(username) {
            Some(user) if user.role == Role::User => {
                user.role = Role::Admin;
                Ok(Some(user.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[derive(Clone)]
pub struct MemoryTaskRepository {
    store: MemoryStore,
}

impl MemoryTaskRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskRepository {
    async fn list_tasks(&self) -> StorageResult<Vec<Task>> {
        let tasks = read(&self.store.inner.tasks, "list_tasks")?;
        Ok(tasks.values().cloned().collect())
    }

    async fn find_task(&self, id: &str) -> StorageResult<Option<Task>> {
        let tasks = read(&self.store.inner.tasks, "find_task")?;
        Ok(tasks.get(id).cloned())
    }

    async fn insert_task(&self, task: Task) -> StorageResult<bool> {
        let mut tasks = write(&self.store.inner.tasks, "insert_task")?;
        if tasks.contains_key(&task.id) {
            return Ok(false);
        }
        tasks.insert(task.id.clone(), task);
        Ok(true)
    }

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> StorageResult<Option<Task>> {
        let mut tasks = write(&self.store.inner.tasks, "update_task")?;
        Ok(tasks.get_mut(id).map(|task| {
            patch.apply_to(task);
            task.clone()
        }))
    }

    async fn delete_task(&self, id: &str) -> StorageResult<bool> {
        let mut tasks = write(&self.store.inner.tasks, "delete_task")?;
        Ok(tasks.remove(id).is_some())
    }
}

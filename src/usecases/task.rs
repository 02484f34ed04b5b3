use std::sync::Arc;
use std::time::Duration;

use super::Deadline;
use crate::error::ServiceError;
use crate::models::{Task, TaskPatch};
use crate::repository::TaskRepository;

/// Task CRUD with not-found and duplicate-id semantics.
pub struct TaskUseCase {
    repository: Arc<dyn TaskRepository>,
    timeout: Duration,
}

impl TaskUseCase {
    pub fn new(repository: Arc<dyn TaskRepository>, timeout: Duration) -> Self {
        Self {
            repository,
            timeout,
        }
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        Deadline::after(self.timeout)
            .run(self.repository.list_tasks())
            .await
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, ServiceError> {
        Deadline::after(self.timeout)
            .run(self.repository.find_task(id))
            .await?
            .ok_or_else(|| ServiceError::TaskNotFound(id.to_string()))
    }

    pub async fn create_task(&self, task: Task) -> Result<Task, ServiceError> {
        let inserted = Deadline::after(self.timeout)
            .run(self.repository.insert_task(task.clone()))
            .await?;
        if !inserted {
            return Err(ServiceError::DuplicateTaskId(task.id));
        }
        log::info!("created task '{}'", task.id);
        Ok(task)
    }

    /// Applies the fields present in `patch`; absent ones keep their stored value.
    pub async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task, ServiceError> {
        let updated = Deadline::after(self.timeout)
            .run(self.repository.update_task(id, patch))
            .await?
            .ok_or_else(|| ServiceError::TaskNotFound(id.to_string()))?;
        log::info!("updated task '{}'", id);
        Ok(updated)
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), ServiceError> {
        let removed = Deadline::after(self.timeout)
            .run(self.repository.delete_task(id))
            .await?;
        if !removed {
            return Err(ServiceError::TaskNotFound(id.to_string()));
        }
        log::info!("deleted task '{}'", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MemoryStore, MemoryTaskRepository, StorageError, StorageResult};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn task(id: &str, title: &str) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: "Desc".to_string(),
            due_date: None,
            status: "pending".to_string(),
        }
    }

    fn use_case() -> (TaskUseCase, Arc<MemoryTaskRepository>) {
        let repository = Arc::new(MemoryTaskRepository::new(MemoryStore::new()));
        (
            TaskUseCase::new(repository.clone(), Duration::from_secs(2)),
            repository,
        )
    }

    /// Sleeps past any short deadline and records whether it ever finished.
    struct SlowRepository {
        delay: Duration,
        completed: Arc<AtomicBool>,
    }

    impl SlowRepository {
        async fn stall(&self) {
            tokio::time::sleep(self.delay).await;
            self.completed.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl TaskRepository for SlowRepository {
        async fn list_tasks(&self) -> StorageResult<Vec<Task>> {
            self.stall().await;
            Ok(Vec::new())
        }

        async fn find_task(&self, _id: &str) -> StorageResult<Option<Task>> {
            self.stall().await;
            Ok(None)
        }

        async fn insert_task(&self, _task: Task) -> StorageResult<bool> {
            self.stall().await;
            Ok(true)
        }

        async fn update_task(&self, _id: &str, _patch: &TaskPatch) -> StorageResult<Option<Task>> {
            self.stall().await;
            Ok(None)
        }

        async fn delete_task(&self, _id: &str) -> StorageResult<bool> {
            self.stall().await;
            Ok(true)
        }
    }

    struct FailingRepository;

    #[async_trait]
    impl TaskRepository for FailingRepository {
        async fn list_tasks(&self) -> StorageResult<Vec<Task>> {
            Err(StorageError::Unavailable("connection refused".into()))
        }

        async fn find_task(&self, _id: &str) -> StorageResult<Option<Task>> {
            Err(StorageError::Unavailable("connection refused".into()))
        }

        async fn insert_task(&self, _task: Task) -> StorageResult<bool> {
            Err(StorageError::Unavailable("connection refused".into()))
        }

        async fn update_task(&self, _id: &str, _patch: &TaskPatch) -> StorageResult<Option<Task>> {
            Err(StorageError::Unavailable("connection refused".into()))
        }

        async fn delete_task(&self, _id: &str) -> StorageResult<bool> {
            Err(StorageError::Unavailable("connection refused".into()))
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_duplicate_task_id_keeps_first() {
        let (tasks, repository) = use_case();
        tasks.create_task(task("123", "Test Task")).await.unwrap();

        let err = tasks
            .create_task(task("123", "Another Task"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateTaskId(ref id) if id == "123"));

        let all = repository.list_tasks().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Test Task");
    }

    #[tokio::test]
    async fn test_get_task() {
        let (tasks, _) = use_case();
        tasks.create_task(task("1", "First")).await.unwrap();

        assert_eq!(tasks.get_task("1").await.unwrap(), task("1", "First"));
        let err = tasks.get_task("2").await.unwrap_err();
        assert!(matches!(err, ServiceError::TaskNotFound(ref id) if id == "2"));
    }

    #[tokio::test]
    async fn test_list_tasks() {
        let (tasks, _) = use_case();
        assert!(tasks.list_tasks().await.unwrap().is_empty());

        tasks.create_task(task("b", "Second")).await.unwrap();
        tasks.create_task(task("a", "First")).await.unwrap();
        assert_eq!(tasks.list_tasks().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_title_only_update_keeps_other_fields() {
        let (tasks, _) = use_case();
        tasks.create_task(task("123", "Test Task")).await.unwrap();

        let patch = TaskPatch {
            title: Some("Updated".to_string()),
            ..TaskPatch::default()
        };
        let updated = tasks.update_task("123", &patch).await.unwrap();

        assert_eq!(updated.title, "Updated");
        assert_eq!(updated.description, "Desc");
        assert_eq!(updated.status, "pending");
        assert_eq!(tasks.get_task("123").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_missing_task() {
        let (tasks, _) = use_case();
        let err = tasks
            .update_task("nope", &TaskPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::TaskNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_task() {
        let (tasks, _) = use_case();
        tasks.create_task(task("1", "First")).await.unwrap();

        tasks.delete_task("1").await.unwrap();
        let err = tasks.delete_task("1").await.unwrap_err();
        assert!(matches!(err, ServiceError::TaskNotFound(_)));
        assert!(tasks.get_task("1").await.is_err());
    }

    #[tokio::test]
    async fn test_storage_errors_propagate() {
        let tasks = TaskUseCase::new(Arc::new(FailingRepository), Duration::from_secs(1));
        let err = tasks.list_tasks().await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(StorageError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_slow_repository_times_out_and_is_cancelled() {
        let completed = Arc::new(AtomicBool::new(false));
        let repository = SlowRepository {
            delay: Duration::from_millis(200),
            completed: completed.clone(),
        };
        let tasks = TaskUseCase::new(Arc::new(repository), Duration::from_millis(20));

        let err = tasks.create_task(task("1", "Slow")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Timeout(_)));

        // The abandoned operation was dropped, so it never gets to finish.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!completed.load(Ordering::SeqCst));
    }
}

//! Business rules on top of the repositories.
//!
//! Each use-case call fixes a [`Deadline`] when it starts and races every
//! repository operation it makes against that instant. An operation still
//! running at the deadline is dropped, which cancels it, and the call fails
//! with [`ServiceError::Timeout`].

pub mod task;
pub mod user;

use std::future::Future;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

use crate::error::ServiceError;
use crate::repository::StorageResult;

pub use task::TaskUseCase;
pub use user::UserUseCase;

/// Per-call timeout applied unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    /// `None` when the budget reaches past what `Instant` can represent.
    at: Option<Instant>,
    budget: Duration,
}

impl Deadline {
    pub(crate) fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(budget),
            budget,
        }
    }

    pub(crate) async fn run<T, F>(&self, operation: F) -> Result<T, ServiceError>
    where
        F: Future<Output = StorageResult<T>>,
    {
        let Some(at) = self.at else {
            return operation.await.map_err(ServiceError::from);
        };
        match timeout_at(at, operation).await {
            Ok(result) => result.map_err(ServiceError::from),
            Err(_) => Err(ServiceError::Timeout(self.budget)),
        }
    }
}

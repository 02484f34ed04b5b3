use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents a task entity as stored and returned by the API.
/// The `id` is chosen by the caller and must be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, Validate)]
pub struct Task {
    /// Caller-supplied unique identifier.
    #[validate(length(min = 1, max = 128))]
    pub id: String,
    /// The title of the task.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Free-text description, empty when not given.
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,
    /// Optional due date, serialized as RFC 3339.
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Free-form status label.
    #[serde(default)]
    #[validate(length(max = 50))]
    pub status: String,
}

/// A partial update for a [`Task`].
///
/// Every field is optional and an absent field is left untouched. For the text
/// fields `null` is treated like an absent field, while `""` explicitly stores an
/// empty value. `due_date` distinguishes three cases: absent (untouched),
/// `null` (cleared) and a timestamp (set).
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub status: Option<String>,
}

// Maps a present JSON value (including `null`) to `Some`, so that only a missing
// key ends up as `None` via `#[serde(default)]`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl TaskPatch {
    /// Returns true when the patch carries no changes.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
    }

    /// Merges the populated fields into `task`.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(status) = &self.status {
            task.status = status.clone();
        }
    }
}

pub mod task;
pub mod user;

pub use task::{Task, TaskPatch};
pub use user::{Role, User, UserResponse};

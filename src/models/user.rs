use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Access level of an account.
/// Corresponds to the `user_role` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role")]
pub enum Role {
    /// May read and mutate tasks and manage users.
    Admin,
    /// May only read tasks.
    User,
}

impl Role {
    /// Returns true when a caller holding `self` may enter an endpoint that requires `required`.
    pub fn satisfies(self, required: Role) -> bool {
        self == Role::Admin || required == Role::User
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::User => "User",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored account. `password_hash` is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}

/// Public view of a user returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            role: user.role,
        }
    }
}

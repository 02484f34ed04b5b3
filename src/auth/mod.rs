pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{BcryptHasher, HashError, PasswordHasher};
pub use token::{Claims, JwtService, TokenError, TokenService};

/// Username and password, as sent to both register and login.
///
/// Password strength is a business rule checked by the user use-case, so it is
/// not validated here.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    pub password: String,
}

/// Body returned by the register and login endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    /// Only present on login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_credentials_validation() {
        let valid = Credentials {
            username: "alice".to_string(),
            password: "pw".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty_username = Credentials {
            username: String::new(),
            password: "password123".to_string(),
        };
        assert!(empty_username.validate().is_err());

        let long_username = Credentials {
            username: "a".repeat(65),
            password: "password123".to_string(),
        };
        assert!(long_username.validate().is_err());
    }

    #[test]
    fn test_auth_response_omits_missing_token() {
        let registered = AuthResponse {
            message: "User registered successfully".to_string(),
            token: None,
        };
        let json = serde_json::to_value(&registered).unwrap();
        assert_eq!(json, serde_json::json!({"message": "User registered successfully"}));
    }
}

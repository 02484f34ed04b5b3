use bcrypt::{hash, verify, DEFAULT_COST};
use thiserror::Error;

/// Failures of a [`PasswordHasher`].
#[derive(Debug, Error)]
pub enum HashError {
    /// The plaintext does not match the stored hash.
    #[error("password does not match")]
    Mismatch,
    #[error("Failed to hash password: {0}")]
    Hash(String),
    /// The stored hash could not be checked, e.g. because it is malformed.
    #[error("Failed to verify password: {0}")]
    Verify(String),
}

/// One-way salted password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, HashError>;

    /// Returns `Ok(())` on a match and [`HashError::Mismatch`] otherwise.
    fn verify(&self, hashed: &str, plaintext: &str) -> Result<(), HashError>;
}

/// bcrypt-backed hasher with a configurable cost factor.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        hash(plaintext, self.cost).map_err(|e| HashError::Hash(e.to_string()))
    }

    fn verify(&self, hashed: &str, plaintext: &str) -> Result<(), HashError> {
        match verify(plaintext, hashed) {
            Ok(true) => Ok(()),
            Ok(false) => Err(HashError::Mismatch),
            Err(e) => Err(HashError::Verify(e.to_string())),
        }
    }
}

//! Argon2 password hashing adapter.
//!
//! Implements the `PasswordHasher` port from `colloquy-core` with
//! argon2id default parameters and PHC-format strings.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordVerifier, SaltString};
use colloquy_core::user::password::PasswordHasher;
use colloquy_types::error::UserError;

/// Argon2id hasher with the crate's default parameters.
#[derive(Default, Clone)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, UserError> {
        let salt = SaltString::generate(&mut OsRng);
        argon2::PasswordHasher::hash_password(&Argon2::default(), password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| UserError::Hashing(e.to_string()))
    }

    fn verify(&self, password: &str, phc: &str) -> Result<bool, UserError> {
        let parsed = PasswordHash::new(phc).map_err(|e| UserError::Hashing(e.to_string()))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(UserError::Hashing(e.to_string())),
        }
    }
}

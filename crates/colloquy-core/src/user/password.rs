//! PasswordHasher trait for credential hashing.
//!
//! Defined in colloquy-core so `UserService` can hash and verify passwords
//! without coupling to a specific algorithm. The `Argon2PasswordHasher`
//! adapter lives in colloquy-infra.

use colloquy_types::error::UserError;

/// Abstraction over password hashing.
///
/// Hashing is CPU-bound and synchronous; callers that care can move it off
/// the async executor with `spawn_blocking` at the edge.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a PHC-format string.
    fn hash(&self, password: &str) -> Result<String, UserError>;

    /// Verify a plaintext password against a stored PHC string.
    fn verify(&self, password: &str, phc: &str) -> Result<bool, UserError>;
}

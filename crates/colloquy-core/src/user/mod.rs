//! User accounts and authentication.
//!
//! `UserService` owns signup, login, and bearer-token authentication.
//! Passwords are hashed through the [`PasswordHasher`] port; issued tokens
//! are opaque `clqy_`-prefixed strings of which only the SHA-256 digest is
//! stored.

pub mod password;

use chrono::{DateTime, Duration, Utc};
use colloquy_types::error::{StoreError, UserError};
use colloquy_types::user::{AccessToken, TokenId, User, UserId, UserRole};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::store::user::{LoginHistoryStore, TokenStore, UserStore};
use password::PasswordHasher;

/// Default lifetime of issued bearer tokens.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Password length bounds, in characters.
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const PASSWORD_MAX_CHARS: usize = 128;

/// Everything a successful login produced.
///
/// `token` is the only place the plaintext bearer token ever exists; the
/// store holds just its hash.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signup, login, and token authentication.
pub struct UserService<U, T, L, H>
where
    U: UserStore,
    T: TokenStore,
    L: LoginHistoryStore,
    H: PasswordHasher,
{
    users: U,
    tokens: T,
    logins: L,
    hasher: H,
    token_ttl: Duration,
}

impl<U, T, L, H> UserService<U, T, L, H>
where
    U: UserStore,
    T: TokenStore,
    L: LoginHistoryStore,
    H: PasswordHasher,
{
    pub fn new(users: U, tokens: T, logins: L, hasher: H) -> Self {
        Self {
            users,
            tokens,
            logins,
            hasher,
            token_ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }

    /// Override the token lifetime (from config).
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Register a new member account.
    pub async fn sign_up(&self, email: &str, name: &str, password: &str) -> Result<User, UserError> {
        self.create_user(email, name, password, UserRole::Member, Utc::now())
            .await
    }

    /// Register an admin account. Reachable from the CLI only.
    pub async fn create_admin(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<User, UserError> {
        self.create_user(email, name, password, UserRole::Admin, Utc::now())
            .await
    }

    pub(crate) async fn create_user(
        &self,
        email: &str,
        name: &str,
        password: &str,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Result<User, UserError> {
        let email = normalize_email(email)?;
        let name = validate_name(name)?;
        validate_password(password)?;

        if self.users.exists_by_email(&email).await? {
            return Err(UserError::DuplicateEmail);
        }

        let user = User {
            id: UserId::new(),
            email,
            name,
            password_hash: self.hasher.hash(password)?,
            role,
            created_at: now,
        };

        // A concurrent signup can still slip past the existence check; the
        // unique email constraint catches it.
        match self.users.save(&user).await {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => return Err(UserError::DuplicateEmail),
            Err(e) => return Err(e.into()),
        }

        info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Exchange credentials for a bearer token.
    ///
    /// Unknown email and wrong password are indistinguishable to the
    /// caller: both yield `InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSession, UserError> {
        self.login_at(email, password, Utc::now()).await
    }

    pub async fn login_at(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginSession, UserError> {
        let email = normalize_email(email)?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !self.hasher.verify(password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        let token = mint_token();
        let expires_at = now + self.token_ttl;
        self.tokens
            .save(&AccessToken {
                id: TokenId::new(),
                user_id: user.id.clone(),
                token_hash: hash_token(&token),
                expires_at,
                created_at: now,
            })
            .await?;

        self.logins.record(&user.id, now).await?;

        // Opportunistic sweep; dead rows are harmless so failure would be
        // too, but the store call only fails on infrastructure problems
        // which should surface anyway.
        let swept = self.tokens.delete_expired(now).await?;
        if swept > 0 {
            info!(swept, "Expired tokens removed");
        }

        info!(user_id = %user.id, "User logged in");
        Ok(LoginSession {
            user,
            token,
            expires_at,
        })
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate(&self, raw_token: &str, now: DateTime<Utc>) -> Result<User, UserError> {
        let hash = hash_token(raw_token.trim());
        match self.tokens.find_valid(&hash, now).await? {
            Some((_, user)) => Ok(user),
            None => Err(UserError::Unauthorized),
        }
    }

    /// Get an account by id.
    pub async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(UserError::UserNotFound)
    }
}

/// Lowercase + trim, with a minimal shape check.
fn normalize_email(email: &str) -> Result<String, UserError> {
    let email = email.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(UserError::InvalidEmail(format!("'{email}' is not a valid email address")));
    }
    Ok(email)
}

fn validate_name(name: &str) -> Result<String, UserError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(UserError::InvalidName("name must not be blank".to_string()));
    }
    if name.chars().count() > 100 {
        return Err(UserError::InvalidName(
            "name must be at most 100 characters".to_string(),
        ));
    }
    Ok(name.to_string())
}

fn validate_password(password: &str) -> Result<(), UserError> {
    let len = password.chars().count();
    if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&len) {
        return Err(UserError::InvalidPassword(format!(
            "password must be between {PASSWORD_MIN_CHARS} and {PASSWORD_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

/// Opaque bearer token: `clqy_` + 32 random bytes as lowercase hex.
fn mint_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("clqy_{hex}")
}

/// SHA-256 hex digest of a token; this is the only form ever stored.
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{digest:x}")
}

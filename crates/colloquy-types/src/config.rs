//! Global configuration types for Colloquy.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls
//! the database location, provider settings, and auth policy.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Colloquy backend.
///
/// Loaded from `<data dir>/colloquy/config.toml`. All fields have
/// sensible defaults so a missing or empty file is fine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GlobalConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

/// Database location. `None` resolves to the platform data directory.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
}

/// Answer-provider settings.
///
/// The API key is never read from this file; it comes from the
/// `COLLOQUY_OPENAI_API_KEY` environment variable only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Authentication policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of issued bearer tokens, in hours.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u32,
}

fn default_token_ttl_hours() -> u32 {
    24
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

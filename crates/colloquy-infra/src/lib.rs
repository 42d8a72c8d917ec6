//! Infrastructure layer for Colloquy.
//!
//! Contains implementations of the ports defined in `colloquy-core`:
//! SQLite storage, the OpenAI answer-provider adapter, Argon2 password
//! hashing, and configuration loading.

pub mod config;
pub mod crypto;
pub mod llm;
pub mod sqlite;

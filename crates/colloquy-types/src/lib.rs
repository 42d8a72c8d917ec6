//! Shared domain types for Colloquy.
//!
//! This crate contains the core domain types used across the Colloquy
//! backend: User, Thread, Chat, Feedback, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod feedback;
pub mod provider;
pub mod thread;
pub mod user;

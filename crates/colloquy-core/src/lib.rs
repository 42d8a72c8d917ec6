//! Business logic and store trait definitions for Colloquy.
//!
//! This crate defines the "ports" (store traits, the answer provider, the
//! password hasher) that the infrastructure layer implements. It depends
//! only on `colloquy-types` -- never on `colloquy-infra` or any
//! database/IO crate.

pub mod chat;
pub mod feedback;
pub mod provider;
pub mod report;
pub mod store;
pub mod user;

#[cfg(test)]
pub mod testing;

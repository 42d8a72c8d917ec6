//! Store trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (colloquy-infra) implements. The core crate never depends on any
//! specific storage technology.

pub mod chat;
pub mod feedback;
pub mod thread;
pub mod turn;
pub mod user;

/// Offset pagination for list queries.
///
/// `limit` is clamped to [`Page::MAX_LIMIT`]; a zero or absent limit
/// falls back to [`Page::DEFAULT_LIMIT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    /// Build a page from raw query parameters, applying the clamp rules.
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        let limit = match limit {
            None | Some(0) => Self::DEFAULT_LIMIT,
            Some(n) => n.min(Self::MAX_LIMIT),
        };
        Self {
            limit,
            offset: offset.unwrap_or(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

//! Query parameter types for list endpoints.

use colloquy_core::store::Page;
use serde::Deserialize;

/// `?limit&offset` pagination parameters.
#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    /// Maximum results per page.
    pub limit: Option<u32>,
    /// Offset for pagination.
    pub offset: Option<u32>,
}

impl PageQuery {
    /// Apply the clamp rules and produce a [`Page`].
    pub fn page(&self) -> Page {
        Page::new(self.limit, self.offset)
    }
}

//! Request extractors: authentication and pagination.

pub mod auth;
pub mod query;

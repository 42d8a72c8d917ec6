//! HTTP request handlers for the REST API.

pub mod chat;
pub mod feedback;
pub mod report;
pub mod thread;
pub mod user;

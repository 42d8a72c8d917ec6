//! The chat turn pipeline.
//!
//! `orchestrator` drives one transactional question/answer turn;
//! `resolver` decides whether the turn lands in an existing thread or
//! opens a new one; `history` rebuilds the prior exchanges handed to the
//! answer provider; `queries` serves the read side.

pub mod history;
pub mod orchestrator;
pub mod queries;
pub mod resolver;

//! AnswerProvider trait definition.
//!
//! This is the core abstraction over the answer-generating backend.
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).

use colloquy_types::error::ProviderError;
use colloquy_types::provider::ProviderExchange;

/// Trait for answer-provider backends.
///
/// The implementation builds the prompt as a fixed system instruction,
/// then each history exchange as a user/assistant message pair in order,
/// then the new question as the final user message.
///
/// `streaming_requested` is accepted and recorded but does not change
/// the transport; answers always arrive complete.
///
/// Implementations live in colloquy-infra (e.g., `OpenAiProvider`).
pub trait AnswerProvider: Send + Sync {
    /// Generate an answer to `question` given the thread's prior exchanges.
    ///
    /// `model` overrides the configured default when present.
    fn generate_answer(
        &self,
        question: &str,
        history: &[ProviderExchange],
        model: Option<&str>,
        streaming_requested: bool,
    ) -> impl std::future::Future<Output = Result<String, ProviderError>> + Send;
}

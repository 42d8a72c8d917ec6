//! Answer-provider value types for Colloquy.

use serde::{Deserialize, Serialize};

/// One prior question/answer pair handed to the provider as context.
///
/// The provider expands each exchange into a user message followed by an
/// assistant message, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderExchange {
    pub question: String,
    pub answer: String,
}

impl ProviderExchange {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

//! OpenAiProvider -- concrete [`AnswerProvider`] implementation for the
//! OpenAI chat-completions API.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output. A missing key fails with
//! `MissingCredentials` before any network traffic.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use colloquy_core::provider::AnswerProvider;
use colloquy_types::config::ProviderConfig;
use colloquy_types::error::ProviderError;
use colloquy_types::provider::ProviderExchange;

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "COLLOQUY_OPENAI_API_KEY";

/// Fixed instruction prepended to every conversation.
const SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant. Answer the user's questions accurately and concisely.";

/// OpenAI chat-completions answer provider.
///
/// # API Key Security
///
/// The API key is stored as a [`SecretString`] and is only exposed when
/// constructing the Authorization header. The struct intentionally does
/// NOT derive Debug.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    /// Create a provider from config, reading the key from
    /// [`API_KEY_ENV`]. An absent or blank key is kept as `None` and
    /// surfaces as `MissingCredentials` on the first call.
    pub fn from_env(config: &ProviderConfig) -> Self {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);
        Self::new(api_key, config)
    }

    pub fn new(api_key: Option<SecretString>, config: &ProviderConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        }
    }

    /// The default model for this provider.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// System instruction, then each history exchange as a user/assistant
    /// pair oldest first, then the new question.
    fn build_messages(question: &str, history: &[ProviderExchange]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() * 2 + 2);

        messages.push(ChatMessage {
            role: "system".to_string(),
            content: SYSTEM_INSTRUCTION.to_string(),
        });

        for exchange in history {
            messages.push(ChatMessage {
                role: "user".to_string(),
                content: exchange.question.clone(),
            });
            messages.push(ChatMessage {
                role: "assistant".to_string(),
                content: exchange.answer.clone(),
            });
        }

        messages.push(ChatMessage {
            role: "user".to_string(),
            content: question.to_string(),
        });

        messages
    }
}

impl AnswerProvider for OpenAiProvider {
    async fn generate_answer(
        &self,
        question: &str,
        history: &[ProviderExchange],
        model: Option<&str>,
        _streaming_requested: bool,
    ) -> Result<String, ProviderError> {
        let api_key = self.api_key.as_ref().ok_or(ProviderError::MissingCredentials)?;

        let body = ChatCompletionRequest {
            model: model.unwrap_or(&self.model).to_string(),
            messages: Self::build_messages(question, history),
            // streaming requests are recorded upstream but the transport
            // is always a single complete response
            stream: false,
        };

        let response = self
            .client
            .post(self.url("/chat/completions"))
            .bearer_auth(api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => ProviderError::AuthenticationFailed,
                429 => ProviderError::RateLimited,
                503 | 529 => ProviderError::Overloaded,
                code => ProviderError::Api {
                    status: code,
                    message: error_body,
                },
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Network(format!("failed to parse response: {e}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|content| !content.is_empty())
            .ok_or(ProviderError::EmptyAnswer)
    }
}

//! Answer-provider adapters.
//!
//! One concrete backend lives here today: the OpenAI chat-completions
//! adapter in [`openai`].

pub mod openai;

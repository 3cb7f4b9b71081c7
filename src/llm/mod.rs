//! Language model gateway
//!
//! The conversation core only needs "prompt in, text out". Every component
//! composes its full prompt (persona + task) and hands it to a `LanguageModel`.

use crate::error::AdvisorError;
use crate::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

pub mod gemini;
pub use gemini::GeminiClient;

/// Persona shared by every prompt the advisor sends.
pub const ADVISOR_PERSONA: &str = r#"You are a smart, empathetic, and professional Fintech Assistant. Your primary goal is to guide users through their financial questions with clarity and patience.
- Your tone should be conversational and encouraging, never robotic or abrupt.
- You must strictly stay within the domain of personal finance (saving, investing, budgeting, loans, retirement, expense management).
- When asking questions, first acknowledge the user's goal in a positive way.
- When providing information, especially about financial products, always be clear and avoid jargon where possible.
- If you cannot access live data, state it clearly and provide representative examples instead."#;

/// Prefix a task prompt with the advisor persona.
pub fn with_persona(task: &str) -> String {
    format!("{}\n\n--- TASK ---\n\n{}", ADVISOR_PERSONA, task)
}

/// Trait for text completion (opaque to the conversation core)
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Scripted model for development & testing.
///
/// Replies are returned in the order they were queued. Every prompt received
/// is recorded so callers can inspect what was sent.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let model = Self::new();
        for reply in replies {
            model.push_reply(reply);
        }
        model
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Ok(reply.into()));
        }
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Err(AdvisorError::LlmError(message.into())));
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        self.replies
            .lock()
            .map_err(|_| AdvisorError::LlmError("scripted model poisoned".to_string()))?
            .pop_front()
            .unwrap_or_else(|| Err(AdvisorError::LlmError("no scripted reply left".to_string())))
    }
}

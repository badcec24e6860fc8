//! Language-model fallback for utterances no handler claims

use crate::{SessionContext, Utterance};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use voice_engines::{ChatMessage, EngineError, LanguageModel};

/// The fallback capability itself failed. Not recoverable by the router;
/// the runtime decides whether to retry or end the turn.
#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("language model failed: {0}")]
    Model(#[from] EngineError),
}

#[async_trait]
pub trait FallbackResponder: Send + Sync {
    /// Answer a user utterance.
    async fn respond(
        &self,
        utterance: &Utterance,
        context: &SessionContext,
    ) -> Result<String, FallbackError>;

    /// Produce an agent-initiated reply (e.g. the greeting) from one-off
    /// instructions.
    async fn generate_reply(
        &self,
        instructions: &str,
        context: &SessionContext,
    ) -> Result<String, FallbackError>;
}

/// Prompts a [`LanguageModel`] with the agent instructions, the session
/// history and the new turn.
pub struct LlmFallback {
    llm: Arc<dyn LanguageModel>,
    instructions: String,
}

impl LlmFallback {
    pub fn new(llm: Arc<dyn LanguageModel>, instructions: impl Into<String>) -> Self {
        Self {
            llm,
            instructions: instructions.into(),
        }
    }

    fn prompt(&self, context: &SessionContext, last: ChatMessage) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(context.history().len() + 2);
        messages.push(ChatMessage::system(self.instructions.clone()));
        messages.extend_from_slice(context.history());
        messages.push(last);
        messages
    }
}

#[async_trait]
impl FallbackResponder for LlmFallback {
    async fn respond(
        &self,
        utterance: &Utterance,
        context: &SessionContext,
    ) -> Result<String, FallbackError> {
        let messages = self.prompt(context, ChatMessage::user(utterance.text()));
        tracing::debug!(
            session = %context.session_id(),
            model = self.llm.model_name(),
            messages = messages.len(),
            "invoking fallback"
        );
        Ok(self.llm.generate(&messages).await?)
    }

    async fn generate_reply(
        &self,
        instructions: &str,
        context: &SessionContext,
    ) -> Result<String, FallbackError> {
        let messages = self.prompt(context, ChatMessage::system(instructions));
        Ok(self.llm.generate(&messages).await?)
    }
}

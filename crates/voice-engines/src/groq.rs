//! Chat-completions client for Groq (or any OpenAI-compatible server).

use crate::{ChatMessage, EngineError, LanguageModel, LlmConfig, Result};
use async_trait::async_trait;
use std::time::Duration;

pub const GROQ_CHAT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

pub struct GroqLlm {
    config: LlmConfig,
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl GroqLlm {
    pub fn new(config: LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| GROQ_CHAT_ENDPOINT.to_string());
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| EngineError::Backend(e.to_string()))?;
        Ok(Self {
            config,
            endpoint,
            api_key: api_key.into(),
            client,
        })
    }
}

#[async_trait]
impl LanguageModel for GroqLlm {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        #[derive(serde::Serialize)]
        struct ChatReq<'a> {
            model: &'a str,
            messages: &'a [ChatMessage],
            temperature: f32,
            max_tokens: u32,
        }

        let req = ChatReq {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let start = std::time::Instant::now();
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| EngineError::Backend(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(EngineError::Http {
                status: status.as_u16(),
                message,
            });
        }

        // Expected response: { choices: [{ message: { role, content } }], ... }
        #[derive(serde::Deserialize)]
        struct ChoiceMessage {
            content: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct Choice {
            message: ChoiceMessage,
        }
        #[derive(serde::Deserialize)]
        struct RespBody {
            choices: Vec<Choice>,
        }

        let body: RespBody = resp
            .json()
            .await
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| EngineError::InvalidResponse("no completion content".into()))?;

        tracing::debug!(
            model = %self.config.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "completion received"
        );
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

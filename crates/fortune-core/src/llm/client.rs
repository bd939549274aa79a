//! LLM API HTTP Client
//!
//! Supports both Claude API and OpenAI-compatible APIs

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::{Config, LlmProvider};
use crate::error::{Error, Result};

use super::generator::ReadingGenerator;
use super::types::*;

/// LLM API client (supports Claude and OpenAI-compatible APIs)
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    provider: LlmProvider,
}

impl LlmClient {
    /// Create a new LLM client
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(Error::Http)?;

        let base_url = match &config.llm.base_url {
            Some(url) => url.clone(),
            None => match config.llm.provider {
                LlmProvider::Claude => "https://api.anthropic.com/v1".to_string(),
                LlmProvider::OpenAi => "https://api.openai.com/v1".to_string(),
            },
        };

        Ok(Self {
            client,
            api_key: config.llm.api_key.clone(),
            model: config.llm.model.clone(),
            base_url,
            provider: config.llm.provider.clone(),
        })
    }

    /// Create with custom base URL (for testing or custom endpoints)
    pub fn with_base_url(config: &Config, base_url: String) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.base_url = base_url;
        Ok(client)
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, messages: Vec<Message>) -> Result<String> {
        match self.provider {
            LlmProvider::Claude => self.send_claude(messages).await,
            LlmProvider::OpenAi => self.send_openai(messages).await,
        }
    }

    async fn send_claude(&self, messages: Vec<Message>) -> Result<String> {
        let url = format!("{}/messages", self.base_url);

        debug!("Sending request to Claude API: {}", url);

        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: 4096,
            system: None,
            messages,
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("Claude API error: {} - {}", status, body);
            return Err(Error::Generation(format!("{}: {}", status, body)));
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Generation(format!("Failed to parse response: {}", e)))?;

        info!(
            "Claude API response: stop_reason={:?}, tokens={}",
            parsed.stop_reason,
            parsed.usage.as_ref().map(|u| u.output_tokens).unwrap_or(0)
        );

        let text = parsed.text();
        if text.is_empty() {
            return Err(Error::Generation("Empty response".to_string()));
        }
        Ok(text)
    }

    async fn send_openai(&self, messages: Vec<Message>) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!("Sending request to OpenAI-compatible API: {}", url);

        let request = ChatCompletionRequest::from_messages(self.model.clone(), &messages);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("OpenAI API error: {} - {}", status, body);
            return Err(Error::Generation(format!("{}: {}", status, body)));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Generation(format!("Failed to parse response: {}", e)))?;

        info!(
            "OpenAI API response: tokens={}",
            parsed
                .usage
                .as_ref()
                .map(|u| u.completion_tokens)
                .unwrap_or(0)
        );

        match parsed.text() {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(Error::Generation("Empty response".to_string())),
        }
    }
}

#[async_trait]
impl ReadingGenerator for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.send(vec![Message::user(prompt)]).await
    }

    async fn generate_with_image(&self, prompt: &str, jpeg: &[u8]) -> Result<String> {
        self.send(vec![Message::user_with_image(prompt, ImageSource::jpeg(jpeg))])
            .await
    }
}

//! LINE Messaging API client
//!
//! Communicates with LINE Messaging API

use reqwest::Client;
use tracing::{debug, error, info};

use crate::error::{LineError, Result};
use crate::types::*;

/// LINE Messaging API client
#[derive(Clone)]
pub struct LineApiClient {
    client: Client,
    channel_access_token: String,
    base_url: String,
    /// バイナリコンテンツ (画像など) は別ホストから配信される
    data_base_url: String,
}

impl LineApiClient {
    /// Create a new LINE API client
    pub fn new(channel_access_token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(LineError::HttpError)?;

        Ok(Self {
            client,
            channel_access_token: channel_access_token.to_string(),
            base_url: "https://api.line.me/v2".to_string(),
            data_base_url: "https://api-data.line.me/v2".to_string(),
        })
    }

    /// Add authorization header
    fn add_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(&self.channel_access_token)
    }

    /// Get user profile
    pub async fn get_profile(&self, user_id: &str) -> Result<LineProfile> {
        let url = format!("{}/bot/profile/{}", self.base_url, user_id);

        debug!("Getting profile for user: {}", user_id);

        let response = self
            .add_auth(self.client.get(&url))
            .send()
            .await
            .map_err(LineError::HttpError)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Get profile failed: {} - {}", status, error_text);
            return Err(LineError::ApiError(format!("{}: {}", status, error_text)));
        }

        let profile: LineProfile = response
            .json()
            .await
            .map_err(|e| LineError::ParseError(e.to_string()))?;

        info!("Got profile for user: {}", profile.display_name);
        Ok(profile)
    }

    /// Reply with up to 5 messages for one reply token
    pub async fn reply_messages(&self, reply_token: &str, texts: &[String]) -> Result<()> {
        let url = format!("{}/bot/message/reply", self.base_url);

        // LINE allows up to 5 messages per reply
        let messages: Vec<MessageContent> = texts
            .iter()
            .take(5)
            .map(|text| MessageContent::Text { text: text.clone() })
            .collect();

        let body = ReplyMessage {
            reply_token: reply_token.to_string(),
            messages,
        };

        debug!("Replying with {} message(s)", body.messages.len());

        let response = self
            .add_auth(self.client.post(&url).json(&body))
            .send()
            .await
            .map_err(LineError::HttpError)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Reply message failed: {} - {}", status, error_text);
            return Err(LineError::ApiError(format!("{}: {}", status, error_text)));
        }

        Ok(())
    }

    /// Push a single message to a user
    pub async fn push_message(&self, to: &str, text: &str) -> Result<()> {
        self.push_messages(to, &[text.to_string()]).await
    }

    /// Push multiple messages (chunked by the 5-message API limit)
    pub async fn push_messages(&self, to: &str, texts: &[String]) -> Result<()> {
        for chunk in texts.chunks(5) {
            let url = format!("{}/bot/message/push", self.base_url);

            let messages: Vec<MessageContent> = chunk
                .iter()
                .map(|text| MessageContent::Text { text: text.clone() })
                .collect();

            let body = PushMessage {
                to: to.to_string(),
                messages,
            };

            debug!("Pushing {} message(s) to: {}", body.messages.len(), to);

            let response = self
                .add_auth(self.client.post(&url).json(&body))
                .send()
                .await
                .map_err(LineError::HttpError)?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();
                error!("Push messages failed: {} - {}", status, error_text);
                return Err(LineError::ApiError(format!("{}: {}", status, error_text)));
            }

            // Small delay between chunks
            if chunk.len() == 5 && texts.len() > 5 {
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            }
        }

        Ok(())
    }

    /// Download binary message content (palm photos)
    pub async fn get_message_content(&self, message_id: &str) -> Result<Vec<u8>> {
        let url = format!("{}/bot/message/{}/content", self.data_base_url, message_id);

        debug!("Downloading content for message: {}", message_id);

        let response = self
            .add_auth(self.client.get(&url))
            .send()
            .await
            .map_err(LineError::HttpError)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Get message content failed: {} - {}", status, error_text);
            return Err(LineError::ApiError(format!("{}: {}", status, error_text)));
        }

        let bytes = response.bytes().await.map_err(LineError::HttpError)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_client_creation() {
        let client = LineApiClient::new("test-token");
        assert!(client.is_ok());
    }
}

//! LINE Bot implementation
//!
//! Main entry point for the LINE gateway

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use fortune_core::{
    DialogueEngine, InMemorySessionStore, LineConfig, PaymentLinks, ReadingGenerator,
};

use crate::api::LineApiClient;
use crate::error::{LineError, Result};
use crate::handler::{HandlerConfig, MessageHandler};
use crate::webhook::{serve, WebhookState};

/// LINE Bot configuration
#[derive(Clone, Debug, Default)]
pub struct LineBotConfig {
    /// Channel secret
    pub channel_secret: String,
    /// Channel access token
    pub channel_access_token: String,
    /// Webhook server port
    pub webhook_port: u16,
}

impl From<&LineConfig> for LineBotConfig {
    fn from(config: &LineConfig) -> Self {
        Self {
            channel_secret: config.channel_secret.clone(),
            channel_access_token: config.channel_access_token.clone(),
            webhook_port: config.webhook_port,
        }
    }
}

/// LINE Bot for the fortune gateway
pub struct LineBot {
    bot_config: LineBotConfig,
    api_client: LineApiClient,
    session_store: InMemorySessionStore,
    handler: Arc<MessageHandler>,
}

impl LineBot {
    /// Create a new LINE bot
    pub fn new(
        bot_config: LineBotConfig,
        generator: Arc<dyn ReadingGenerator>,
        links: PaymentLinks,
    ) -> Result<Self> {
        if bot_config.channel_secret.is_empty() {
            return Err(LineError::Config(
                "Channel secret not configured".to_string(),
            ));
        }
        if bot_config.channel_access_token.is_empty() {
            return Err(LineError::Config(
                "Channel access token not configured".to_string(),
            ));
        }

        let api_client = LineApiClient::new(&bot_config.channel_access_token)?;
        let session_store = InMemorySessionStore::new();
        let engine = Arc::new(DialogueEngine::new(generator, links));

        let handler = Arc::new(MessageHandler::new(
            api_client.clone(),
            engine,
            session_store.clone(),
            HandlerConfig::default(),
        ));

        Ok(Self {
            bot_config,
            api_client,
            session_store,
            handler,
        })
    }

    /// Get the session store
    pub fn session_store(&self) -> &InMemorySessionStore {
        &self.session_store
    }

    /// Send a message to a user
    pub async fn send_message(&self, user_id: &str, text: &str) -> Result<()> {
        self.api_client.push_message(user_id, text).await
    }

    /// Run the bot with a shutdown signal
    pub async fn run(&self, shutdown: broadcast::Receiver<()>) -> Result<()> {
        info!(
            "Starting LINE bot webhook server on port {}",
            self.bot_config.webhook_port
        );

        let state = WebhookState {
            channel_secret: self.bot_config.channel_secret.clone(),
            handler: self.handler.clone(),
        };

        serve(state, self.bot_config.webhook_port, shutdown).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NullGenerator;

    #[async_trait]
    impl ReadingGenerator for NullGenerator {
        async fn generate(&self, _prompt: &str) -> fortune_core::Result<String> {
            Ok("鑑定結果".to_string())
        }

        async fn generate_with_image(
            &self,
            _prompt: &str,
            _jpeg: &[u8],
        ) -> fortune_core::Result<String> {
            Ok("鑑定結果".to_string())
        }
    }

    fn test_links() -> PaymentLinks {
        PaymentLinks {
            light: "https://example.com/l".to_string(),
            silver: "https://example.com/s".to_string(),
            gold: "https://example.com/g".to_string(),
        }
    }

    #[test]
    fn test_bot_creation_fails_without_credentials() {
        let result = LineBot::new(LineBotConfig::default(), Arc::new(NullGenerator), test_links());
        assert!(result.is_err());
    }

    #[test]
    fn test_bot_creation_with_credentials() {
        let bot_config = LineBotConfig {
            channel_secret: "secret".to_string(),
            channel_access_token: "token".to_string(),
            webhook_port: 5000,
        };
        let bot = LineBot::new(bot_config, Arc::new(NullGenerator), test_links()).unwrap();
        assert_eq!(bot.session_store().session_count(), 0);
    }

    #[test]
    fn test_bot_config_from_line_config() {
        let line_config = LineConfig {
            channel_secret: "secret".to_string(),
            channel_access_token: "token".to_string(),
            webhook_port: 8080,
        };
        let bot_config = LineBotConfig::from(&line_config);
        assert_eq!(bot_config.webhook_port, 8080);
        assert_eq!(bot_config.channel_secret, "secret");
    }
}

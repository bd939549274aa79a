//! LINE message handler implementation

use std::sync::Arc;

use tracing::{debug, error, warn};

use fortune_core::dialogue::messages;
use fortune_core::{DialogueEngine, InMemorySessionStore, Turn};

use crate::api::LineApiClient;
use crate::error::Result;
use crate::types::LineEvent;

/// Configuration for the message handler
#[derive(Clone, Debug)]
pub struct HandlerConfig {
    /// Maximum message length before splitting
    pub max_message_length: usize,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            max_message_length: 5000, // LINE has ~5000 char limit per message
        }
    }
}

/// Message handler for LINE
///
/// イベントをダイアログエンジンの遷移へつなぐ。セッションのロックは
/// 遷移全体（生成呼び出しを含む）で保持し、成功した遷移だけを
/// コミットする。
pub struct MessageHandler {
    api_client: LineApiClient,
    engine: Arc<DialogueEngine>,
    session_store: InMemorySessionStore,
    config: HandlerConfig,
}

impl MessageHandler {
    /// Create a new message handler
    pub fn new(
        api_client: LineApiClient,
        engine: Arc<DialogueEngine>,
        session_store: InMemorySessionStore,
        config: HandlerConfig,
    ) -> Self {
        Self {
            api_client,
            engine,
            session_store,
            config,
        }
    }

    /// Process an incoming event
    pub async fn process_event(&self, event: &LineEvent) -> Result<()> {
        // Only handle message events
        if event.event_type != "message" {
            return Ok(());
        }

        let Some(message) = &event.message else {
            return Ok(());
        };
        let Some(user_id) = event.source.user_id.as_deref() else {
            return Ok(());
        };
        let reply_token = event.reply_token.as_deref();

        match message.message_type.as_str() {
            "text" => {
                let text = message.text.as_deref().unwrap_or("").trim();
                if text.is_empty() {
                    return Ok(());
                }
                self.process_text(user_id, text, reply_token).await
            }
            "image" => self.process_image(user_id, &message.id, reply_token).await,
            other => {
                debug!("Ignoring unsupported message type: {}", other);
                Ok(())
            }
        }
    }

    async fn process_text(
        &self,
        user_id: &str,
        text: &str,
        reply_token: Option<&str>,
    ) -> Result<()> {
        let handle = self.session_store.get_or_create(user_id);
        let mut session = handle.lock().await;

        match self.engine.handle_text(&session, text).await {
            Ok(Turn {
                session: next,
                replies,
            }) => {
                *session = next;
                drop(session);
                self.send_replies(user_id, &replies, reply_token).await
            }
            Err(e) => {
                // 生成失敗。セッションはコミットせず、定型の再試行案内だけ返す。
                warn!(user_id, error = %e, "generation failed, session not committed");
                drop(session);
                self.send_replies(user_id, &[messages::RETRY.to_string()], reply_token)
                    .await
            }
        }
    }

    async fn process_image(
        &self,
        user_id: &str,
        message_id: &str,
        reply_token: Option<&str>,
    ) -> Result<()> {
        let jpeg = self.api_client.get_message_content(message_id).await?;

        let handle = self.session_store.get_or_create(user_id);
        let mut session = handle.lock().await;

        match self.engine.handle_image(&session, &jpeg).await {
            Ok(Turn {
                session: next,
                replies,
            }) => {
                *session = next;
                drop(session);
                self.send_replies(user_id, &replies, reply_token).await
            }
            Err(e) => {
                warn!(user_id, error = %e, "generation failed, session not committed");
                drop(session);
                self.send_replies(user_id, &[messages::RETRY.to_string()], reply_token)
                    .await
            }
        }
    }

    /// Send a turn's replies: reply API first (up to 5 messages per token),
    /// push for anything beyond that
    async fn send_replies(
        &self,
        user_id: &str,
        texts: &[String],
        reply_token: Option<&str>,
    ) -> Result<()> {
        let chunks: Vec<String> = texts
            .iter()
            .flat_map(|text| self.split_message(text, self.config.max_message_length))
            .collect();

        if chunks.is_empty() {
            return Ok(());
        }

        if let Some(token) = reply_token {
            let first: Vec<String> = chunks.iter().take(5).cloned().collect();
            self.api_client.reply_messages(token, &first).await?;

            for chunk in chunks.iter().skip(5) {
                if let Err(e) = self.api_client.push_message(user_id, chunk).await {
                    error!("Failed to push message: {:?}", e);
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            }
            Ok(())
        } else {
            self.api_client.push_messages(user_id, &chunks).await
        }
    }

    /// Split message at sentence boundaries
    fn split_message(&self, text: &str, max_size: usize) -> Vec<String> {
        if text.len() <= max_size {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut remaining = text;

        while !remaining.is_empty() {
            if remaining.len() <= max_size {
                chunks.push(remaining.to_string());
                break;
            }

            // UTF-8 境界まで切り詰めてから文の切れ目を探す
            let mut search_end = max_size;
            while !remaining.is_char_boundary(search_end) {
                search_end -= 1;
            }
            let window = &remaining[..search_end];

            let break_point = window
                .rfind('。')
                .map(|i| i + '。'.len_utf8())
                .or_else(|| window.rfind("\n\n").map(|i| i + 2))
                .or_else(|| window.rfind('\n').map(|i| i + 1))
                .or_else(|| window.rfind(". ").map(|i| i + 2))
                .or_else(|| window.rfind(' ').map(|i| i + 1))
                .unwrap_or(search_end);

            chunks.push(remaining[..break_point].to_string());
            remaining = &remaining[break_point..];
        }

        chunks
    }
}

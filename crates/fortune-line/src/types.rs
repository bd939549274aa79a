//! LINE Messaging API types

use serde::{Deserialize, Serialize};

/// LINE user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineProfile {
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub picture_url: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
}

/// LINE message event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// LINE source (user, group, or room)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSource {
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(rename = "groupId", default)]
    pub group_id: Option<String>,
    #[serde(rename = "roomId", default)]
    pub room_id: Option<String>,
}

/// LINE event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(rename = "replyToken")]
    pub reply_token: Option<String>,
    pub timestamp: i64,
    pub source: LineSource,
    pub message: Option<LineMessage>,
}

/// Webhook request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookBody {
    pub destination: String,
    pub events: Vec<LineEvent>,
}

/// Reply message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyMessage {
    #[serde(rename = "replyToken")]
    pub reply_token: String,
    pub messages: Vec<MessageContent>,
}

/// Push message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushMessage {
    pub to: String,
    pub messages: Vec<MessageContent>,
}

/// Message content
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "lowercase")]
pub enum MessageContent {
    Text { text: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_webhook_body() {
        let body = r#"{
            "destination": "U_bot",
            "events": [{
                "type": "message",
                "replyToken": "token123",
                "timestamp": 1700000000000,
                "source": {"type": "user", "userId": "U123"},
                "message": {"type": "text", "id": "m1", "text": "こんにちは"}
            }]
        }"#;

        let webhook: WebhookBody = serde_json::from_str(body).unwrap();
        assert_eq!(webhook.events.len(), 1);
        let event = &webhook.events[0];
        assert_eq!(event.source.user_id.as_deref(), Some("U123"));
        assert_eq!(
            event.message.as_ref().unwrap().text.as_deref(),
            Some("こんにちは")
        );
    }

    #[test]
    fn test_message_content_wire_format() {
        let content = MessageContent::Text {
            text: "メニュー".to_string(),
        };
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"], "メニュー");
    }
}

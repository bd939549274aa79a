//! LLM API types

use serde::{Deserialize, Serialize};

/// Message in conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<MessageContent>,
}

impl Message {
    /// Create a user message with text
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: vec![MessageContent::Text { text: text.into() }],
        }
    }

    /// Create a user message with text and image
    pub fn user_with_image(text: impl Into<String>, image: ImageSource) -> Self {
        Self {
            role: "user".to_string(),
            content: vec![
                MessageContent::Text { text: text.into() },
                MessageContent::Image { source: image },
            ],
        }
    }

    /// Get text content from message
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| {
                if let MessageContent::Text { text } = c {
                    Some(text.clone())
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Content block in a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: String },
    Image { source: ImageSource },
}

/// Image source for multimodal input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub media_type: String,
    pub data: String,
}

impl ImageSource {
    pub const MEDIA_TYPE_JPEG: &'static str = "image/jpeg";

    /// Create a new image source from base64 data
    pub fn base64(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            source_type: "base64".to_string(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// Create a JPEG image source from raw bytes (encodes to base64)
    pub fn jpeg(bytes: &[u8]) -> Self {
        Self::base64(
            Self::MEDIA_TYPE_JPEG,
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes),
        )
    }

    /// Convert to a data URL (OpenAI-compatible image input)
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Messages API request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<Message>,
}

/// Messages API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub response_type: String,
    pub role: String,
    pub content: Vec<MessageContent>,
    pub model: String,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl MessagesResponse {
    /// Concatenated text blocks of the response
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| {
                if let MessageContent::Text { text } = c {
                    Some(text.as_str())
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Token usage information
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

// ============================================================================
// OpenAI-compatible types
// ============================================================================

/// OpenAI-compatible chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

impl ChatCompletionRequest {
    /// Convert Claude-style messages to the OpenAI wire format. Images
    /// become `image_url` parts with a data URL.
    pub fn from_messages(model: impl Into<String>, messages: &[Message]) -> Self {
        let messages = messages
            .iter()
            .map(|msg| {
                let has_image = msg
                    .content
                    .iter()
                    .any(|c| matches!(c, MessageContent::Image { .. }));

                let content = if has_image {
                    ChatContent::Parts(
                        msg.content
                            .iter()
                            .map(|c| match c {
                                MessageContent::Text { text } => {
                                    ChatPart::Text { text: text.clone() }
                                }
                                MessageContent::Image { source } => ChatPart::ImageUrl {
                                    image_url: ImageUrl {
                                        url: source.to_data_url(),
                                    },
                                },
                            })
                            .collect(),
                    )
                } else {
                    ChatContent::Text(msg.text_content())
                };

                ChatMessage {
                    role: msg.role.clone(),
                    content,
                }
            })
            .collect();

        Self {
            model: model.into(),
            messages,
        }
    }
}

/// OpenAI-compatible chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: ChatContent,
}

/// Plain string content or multimodal parts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatContent {
    Text(String),
    Parts(Vec<ChatPart>),
}

/// Multimodal content part
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// OpenAI-compatible chat completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if any
    pub fn text(&self) -> Option<String> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoiceMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_text_content() {
        let msg = Message::user("こんにちは");
        assert_eq!(msg.text_content(), "こんにちは");
    }

    #[test]
    fn test_image_data_url() {
        let image = ImageSource::jpeg(&[0xFF, 0xD8, 0xFF]);
        let url = image.to_data_url();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_chat_request_text_only() {
        let request =
            ChatCompletionRequest::from_messages("gpt-4o-mini", &[Message::user("占ってください")]);
        assert_eq!(request.messages.len(), 1);
        assert!(matches!(
            request.messages[0].content,
            ChatContent::Text(ref t) if t == "占ってください"
        ));
    }

    #[test]
    fn test_chat_request_with_image() {
        let message = Message::user_with_image("この手相を見てください", ImageSource::jpeg(&[1, 2, 3]));
        let request = ChatCompletionRequest::from_messages("gpt-4o-mini", &[message]);

        let ChatContent::Parts(parts) = &request.messages[0].content else {
            panic!("expected multimodal parts");
        };
        assert_eq!(parts.len(), 2);
        assert!(matches!(parts[1], ChatPart::ImageUrl { .. }));
    }

    #[test]
    fn test_parse_claude_response() {
        let body = r#"{
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": "鑑定結果です"}],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 20}
        }"#;
        let response: MessagesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), "鑑定結果です");
    }

    #[test]
    fn test_parse_openai_response() {
        let body = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "鑑定結果です"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 10, "completion_tokens": 20}
        }"#;
        let response: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text().as_deref(), Some("鑑定結果です"));
    }
}

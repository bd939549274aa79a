//! Webhook server for the LINE bot
//!
//! Handles incoming webhooks from LINE Messaging API

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::error::{LineError, Result};
use crate::handler::MessageHandler;
use crate::types::WebhookBody;

type HmacSha256 = Hmac<Sha256>;

/// Webhook server state
#[derive(Clone)]
pub struct WebhookState {
    pub channel_secret: String,
    pub handler: Arc<MessageHandler>,
}

/// Create webhook router
pub fn create_webhook_router(state: WebhookState) -> Router {
    Router::new()
        .route("/callback", post(handle_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Handle incoming webhook
async fn handle_webhook(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<StatusCode, StatusCode> {
    let body = String::from_utf8(body.to_vec()).map_err(|_| StatusCode::BAD_REQUEST)?;

    // Verify signature
    let signature = headers
        .get("x-line-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing x-line-signature header");
            StatusCode::BAD_REQUEST
        })?;

    if !verify_signature(&state.channel_secret, &body, signature) {
        warn!("Invalid signature");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let webhook: WebhookBody = serde_json::from_str(&body).map_err(|e| {
        error!("Failed to parse webhook body: {:?}", e);
        StatusCode::BAD_REQUEST
    })?;

    debug!("Received webhook for destination: {}", webhook.destination);

    // Process events; one failing event must not fail the webhook response
    for event in webhook.events {
        if let Err(e) = state.handler.process_event(&event).await {
            error!("Error processing event: {:?}", e);
        }
    }

    Ok(StatusCode::OK)
}

/// Verify LINE signature
fn verify_signature(channel_secret: &str, body: &str, signature: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(channel_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };

    mac.update(body.as_bytes());
    let result = mac.finalize();
    let computed = STANDARD.encode(result.into_bytes());

    computed == signature
}

/// Serve the webhook until the shutdown signal fires
pub async fn serve(
    state: WebhookState,
    port: u16,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let app = create_webhook_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| LineError::Webhook(e.to_string()))?;

    info!("LINE webhook server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            info!("LINE webhook server shutting down");
        })
        .await
        .map_err(|e| LineError::Webhook(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_signature() {
        let secret = "test_secret";
        let body = r#"{"destination":"U123","events":[]}"#;

        // Create a valid signature
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body.as_bytes());
        let result = mac.finalize();
        let valid_signature = STANDARD.encode(result.into_bytes());

        assert!(verify_signature(secret, body, &valid_signature));
        assert!(!verify_signature(secret, body, "invalid_signature"));
    }
}

//! fortune-gateway: Fortune Bot Main Binary
//!
//! LINE 占いボットのエントリポイント。
//!
//! Usage:
//!   fortune-gateway           - Start the webhook server
//!   fortune-gateway --help    - Show help

use std::sync::Arc;

use fortune_core::{Config, LlmClient, PaymentLinks};
use fortune_line::{LineBot, LineBotConfig};
use tracing_subscriber::EnvFilter;

/// Run mode
enum RunMode {
    /// Webhook server mode
    Server,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match parse_args() {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("fortune-gateway {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Server => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting fortune-gateway...");
    tracing::info!("Model: {}", config.llm.model);

    // Create LLM client
    let generator = LlmClient::new(&config)
        .map_err(|e| anyhow::anyhow!("Failed to create LLM client: {}", e))?;

    // Create LINE bot
    let bot = LineBot::new(
        LineBotConfig::from(&config.line),
        Arc::new(generator),
        PaymentLinks::from(&config.shop),
    )
    .map_err(|e| anyhow::anyhow!("Failed to create LINE bot: {}", e))?;

    // Shutdown on ctrl-c
    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
        }
    });

    bot.run(shutdown_rx)
        .await
        .map_err(|e| anyhow::anyhow!("LINE bot error: {}", e))?;

    tracing::info!("fortune-gateway stopped");
    Ok(())
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    let args: Vec<String> = std::env::args().collect();

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Server
}

/// Print help message
fn print_help() {
    println!("fortune-gateway - LINE fortune-telling bot");
    println!();
    println!("Usage:");
    println!("  fortune-gateway           Start the webhook server");
    println!("  fortune-gateway --help    Show this help message");
    println!("  fortune-gateway --version Show version");
    println!();
    println!("Environment Variables:");
    println!("  LINE_CHANNEL_SECRET        LINE channel secret (required)");
    println!("  LINE_CHANNEL_ACCESS_TOKEN  LINE channel access token (required)");
    println!("  LLM_API_KEY                API key (required)");
    println!("  LLM_MODEL                  Model name (default: claude-sonnet-4-20250514)");
    println!("  LLM_PROVIDER               Provider: claude or openai (default: claude)");
    println!("  LLM_BASE_URL               Custom API endpoint");
    println!("  WEBHOOK_PORT               Webhook server port (default: 5000)");
    println!("  SHOP_URL_LIGHT             Purchase page for the light plan");
    println!("  SHOP_URL_SILVER            Purchase page for the silver plan");
    println!("  SHOP_URL_GOLD              Purchase page for the gold plan");
}

//! LLM API client and types
//!
//! Supports both Claude API and OpenAI-compatible APIs

mod client;
mod generator;
mod types;

pub use client::LlmClient;
pub use generator::ReadingGenerator;
pub use types::*;

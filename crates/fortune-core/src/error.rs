//! Error types for fortune-core

use thiserror::Error;

/// Main error type for fortune-core
///
/// 鑑定文の生成失敗だけがダイアログエンジンから伝播するエラー。
/// メニューやプランの入力不一致、回数超過は再提示で回復するため
/// エラーにはならない。
#[derive(Error, Debug)]
pub enum Error {
    #[error("Generation API error: {0}")]
    Generation(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for fortune-core
pub type Result<T> = std::result::Result<T, Error>;

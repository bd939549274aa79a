//! Configuration management
//!
//! 設定は以下の優先順位で読み込まれます:
//! 1. 環境変数
//! 2. fortune-gateway.toml 設定ファイル
//! 3. デフォルト値
//!
//! 設定ファイル内では `${VAR_NAME}` 形式で環境変数を展開できます。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;

/// LLM Provider type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Anthropic Claude API
    #[default]
    Claude,
    /// OpenAI-compatible API
    OpenAi,
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key
    pub api_key: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// API provider
    #[serde(default)]
    pub provider: LlmProvider,

    /// Base URL (optional, for custom endpoints)
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            provider: LlmProvider::Claude,
            base_url: None,
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

/// LINE Messaging API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineConfig {
    /// Channel secret (webhook signature verification)
    pub channel_secret: String,

    /// Channel access token
    pub channel_access_token: String,

    /// Webhook server port
    #[serde(default = "default_webhook_port")]
    pub webhook_port: u16,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_secret: String::new(),
            channel_access_token: String::new(),
            webhook_port: default_webhook_port(),
        }
    }
}

fn default_webhook_port() -> u16 {
    5000
}

/// Purchase page URLs for the paid plans
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    #[serde(default = "default_light_url")]
    pub light_url: String,

    #[serde(default = "default_silver_url")]
    pub silver_url: String,

    #[serde(default = "default_gold_url")]
    pub gold_url: String,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            light_url: default_light_url(),
            silver_url: default_silver_url(),
            gold_url: default_gold_url(),
        }
    }
}

fn default_light_url() -> String {
    "https://fortune907.base.shop/items/128865860".to_string()
}

fn default_silver_url() -> String {
    "https://fortune907.base.shop/items/128866117".to_string()
}

fn default_gold_url() -> String {
    "https://fortune907.base.shop/items/128866188".to_string()
}

/// Main configuration for fortune-gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// LINE configuration
    #[serde(default)]
    pub line: LineConfig,

    /// Plan purchase pages
    #[serde(default)]
    pub shop: ShopConfig,
}

/// TOML file structure (all fields optional; missing sections fall back to
/// defaults before env overrides are applied)
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    llm: Option<TomlLlm>,
    line: Option<TomlLine>,
    shop: Option<TomlShop>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlLlm {
    api_key: Option<String>,
    model: Option<String>,
    provider: Option<String>,
    base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlLine {
    channel_secret: Option<String>,
    channel_access_token: Option<String>,
    webhook_port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlShop {
    light_url: Option<String>,
    silver_url: Option<String>,
    gold_url: Option<String>,
}

impl Config {
    /// 設定ファイル内の `${VAR_NAME}` を環境変数の値に置換する。
    /// 未定義の環境変数は空文字列になる。
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // '{' を消費

                let mut var_name = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '}' {
                        chars.next(); // '}' を消費
                        break;
                    }
                    var_name.push(c);
                    chars.next();
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// TOML 設定ファイルから設定を読み込む。既存の環境変数が優先される。
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let toml_content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let expanded_content = Self::expand_env_vars(&toml_content);

        let toml_config: TomlConfig = toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        let mut config = Self::from_toml_config(toml_config);
        config.apply_env_overrides();
        Ok(config)
    }

    /// デフォルトパスから設定を読み込む
    ///
    /// 1. `./fortune-gateway.toml`
    /// 2. 見つからない場合は環境変数のみ
    pub fn load() -> crate::Result<Self> {
        if Path::new("fortune-gateway.toml").exists() {
            return Self::from_toml_file("fortune-gateway.toml");
        }

        Self::from_env()
    }

    /// 環境変数のみから設定を構築する
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    fn from_toml_config(toml: TomlConfig) -> Self {
        let llm = toml.llm.unwrap_or_default();
        let line = toml.line.unwrap_or_default();
        let shop = toml.shop.unwrap_or_default();

        Self {
            llm: LlmConfig {
                api_key: llm.api_key.unwrap_or_default(),
                model: llm.model.unwrap_or_else(default_model),
                provider: parse_provider(&llm.provider.unwrap_or_default()),
                base_url: llm.base_url,
            },
            line: LineConfig {
                channel_secret: line.channel_secret.unwrap_or_default(),
                channel_access_token: line.channel_access_token.unwrap_or_default(),
                webhook_port: line.webhook_port.unwrap_or_else(default_webhook_port),
            },
            shop: ShopConfig {
                light_url: shop.light_url.unwrap_or_else(default_light_url),
                silver_url: shop.silver_url.unwrap_or_else(default_silver_url),
                gold_url: shop.gold_url.unwrap_or_else(default_gold_url),
            },
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(api_key) = std::env::var("LLM_API_KEY") {
            self.llm.api_key = api_key;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            self.llm.provider = parse_provider(&provider);
        }
        if let Ok(base_url) = std::env::var("LLM_BASE_URL") {
            self.llm.base_url = Some(base_url);
        }

        if let Ok(secret) = std::env::var("LINE_CHANNEL_SECRET") {
            self.line.channel_secret = secret;
        }
        if let Ok(token) = std::env::var("LINE_CHANNEL_ACCESS_TOKEN") {
            self.line.channel_access_token = token;
        }
        if let Ok(port) = std::env::var("WEBHOOK_PORT") {
            if let Ok(port) = port.parse() {
                self.line.webhook_port = port;
            }
        }

        if let Ok(url) = std::env::var("SHOP_URL_LIGHT") {
            self.shop.light_url = url;
        }
        if let Ok(url) = std::env::var("SHOP_URL_SILVER") {
            self.shop.silver_url = url;
        }
        if let Ok(url) = std::env::var("SHOP_URL_GOLD") {
            self.shop.gold_url = url;
        }
    }

    /// 必須項目が揃っているか確認する。起動時に一度だけ呼ぶ。
    pub fn validate(&self) -> crate::Result<()> {
        if self.llm.api_key.is_empty() {
            return Err(Error::Config("LLM_API_KEY is not set".to_string()));
        }
        if self.line.channel_secret.is_empty() {
            return Err(Error::Config("LINE_CHANNEL_SECRET is not set".to_string()));
        }
        if self.line.channel_access_token.is_empty() {
            return Err(Error::Config(
                "LINE_CHANNEL_ACCESS_TOKEN is not set".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_provider(value: &str) -> LlmProvider {
    match value.to_lowercase().as_str() {
        "openai" | "glm" | "zai" => LlmProvider::OpenAi,
        _ => LlmProvider::Claude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.llm.provider, LlmProvider::Claude);
        assert_eq!(config.line.webhook_port, 5000);
        assert!(config.shop.light_url.contains("base.shop"));
    }

    #[test]
    fn test_parse_provider() {
        assert_eq!(parse_provider("openai"), LlmProvider::OpenAi);
        assert_eq!(parse_provider("OpenAI"), LlmProvider::OpenAi);
        assert_eq!(parse_provider("claude"), LlmProvider::Claude);
        assert_eq!(parse_provider(""), LlmProvider::Claude);
    }

    #[test]
    fn test_from_toml_config() {
        let toml_config: TomlConfig = toml::from_str(
            r#"
            [llm]
            api_key = "test-key"
            provider = "openai"
            model = "gpt-4o-mini"

            [line]
            channel_secret = "secret"
            channel_access_token = "token"
            webhook_port = 8080
            "#,
        )
        .unwrap();

        let config = Config::from_toml_config(toml_config);
        assert_eq!(config.llm.api_key, "test-key");
        assert_eq!(config.llm.provider, LlmProvider::OpenAi);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.line.webhook_port, 8080);
        // 未指定のセクションはデフォルト
        assert!(config.shop.light_url.contains("base.shop"));
    }

    #[test]
    fn test_expand_env_vars_passthrough() {
        assert_eq!(Config::expand_env_vars("plain text"), "plain text");
        // 未定義の環境変数は空文字列
        assert_eq!(
            Config::expand_env_vars("x${FORTUNE_UNDEFINED_VAR_FOR_TEST}y"),
            "xy"
        );
    }

    #[test]
    fn test_validate_requires_credentials() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }
}

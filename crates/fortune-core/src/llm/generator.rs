//! Text generation collaborator boundary

use async_trait::async_trait;

use crate::error::Result;

/// 鑑定文を生成する外部コラボレータ。
///
/// ダイアログエンジンはこのトレイトしか見ない。失敗はすべて呼び出し側に
/// エラーとして返り、セッションがコミットされる前に遷移を中断させる。
#[async_trait]
pub trait ReadingGenerator: Send + Sync {
    /// Generate reading text from a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate reading text from a prompt and a JPEG photo (palm readings).
    async fn generate_with_image(&self, prompt: &str, jpeg: &[u8]) -> Result<String>;
}

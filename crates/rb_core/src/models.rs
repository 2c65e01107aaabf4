use async_trait::async_trait;
use crate::Result;

#[async_trait]
pub trait TextTransformer: Send + Sync {
    fn name(&self) -> &str;

    /// Rewrite a source post into a long-form plain-text article.
    ///
    /// `body` may be empty. Every call reaches the backend; nothing is cached.
    async fn transform(&self, title: &str, body: &str) -> Result<String>;
}

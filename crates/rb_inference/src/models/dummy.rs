use std::fmt;
use async_trait::async_trait;
use rb_core::{Result, TextTransformer};

/// Offline transformer producing a fixed-shape narrative from the post itself.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextTransformer for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn transform(&self, title: &str, body: &str) -> Result<String> {
        let body = body.split_whitespace().collect::<Vec<_>>().join(" ");
        let middle = if body.is_empty() {
            "The original post carried no text beyond its title, so the discussion it sparked is where the substance lies.".to_string()
        } else {
            format!("In the original post, the author wrote: {}", body)
        };
        Ok(format!(
            "{}\n\nA recent community thread asked readers to weigh in on this topic.\n\n{}\n\nThe conversation shows how much people still have to say about it.",
            title.trim(),
            middle
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dummy_model() {
        let model = DummyModel::new();

        let article = model
            .transform("Test Post", "This is a   test\npost with text.")
            .await
            .unwrap();
        assert!(article.starts_with("Test Post\n\n"));
        assert!(article.contains("This is a test post with text."));

        let article = model.transform("Link only", "").await.unwrap();
        assert!(article.contains("no text beyond its title"));
    }
}

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use rb_core::{Error, Result, TextTransformer};
use crate::InferenceConfig;

pub mod chat;
pub mod dummy;

pub use chat::ChatCompletionModel;
pub use dummy::DummyModel;

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// Builds the transformer named by `kind`: `openai` (needs a config) or `dummy`.
pub fn create_model(kind: &str, config: Option<InferenceConfig>) -> Result<Arc<dyn TextTransformer>> {
    match kind {
        "openai" => {
            let config = config.ok_or_else(|| {
                Error::ConfigurationInvalid("The openai model needs an inference configuration".to_string())
            })?;
            Ok(Arc::new(ChatCompletionModel::new(config)?))
        }
        "dummy" => Ok(Arc::new(DummyModel::new())),
        other => Err(Error::ConfigurationInvalid(format!(
            "Unknown model: {}. Available models: openai, dummy",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_model() {
        assert_eq!(create_model("dummy", None).unwrap().name(), "Dummy");

        let model = create_model("openai", Some(InferenceConfig::new("sk-test"))).unwrap();
        assert_eq!(model.name(), "OpenAI");

        assert!(matches!(create_model("openai", None), Err(Error::ConfigurationInvalid(_))));
        assert!(matches!(create_model("gpt", None), Err(Error::ConfigurationInvalid(_))));
    }
}

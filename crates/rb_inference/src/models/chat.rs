use std::fmt;
use async_trait::async_trait;
use reqwest::Client;
use rb_core::{Error, Result, TextTransformer};
use super::{ChatMessage, ChatRequest, ChatResponse};
use crate::prompt::build_prompt;
use crate::InferenceConfig;

/// Longest slice of an error body kept in error messages.
const ERROR_BODY_LIMIT: usize = 200;

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionModel {
    client: Client,
    config: InferenceConfig,
}

impl fmt::Debug for ChatCompletionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompletionModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.config.base_url)
            .field("model_name", &self.config.model_name)
            .finish()
    }
}

impl ChatCompletionModel {
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::ConfigurationInvalid(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[async_trait]
impl TextTransformer for ChatCompletionModel {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn transform(&self, title: &str, body: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.config.model_name.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: build_prompt(title, body),
            }],
            max_tokens: self.config.max_tokens,
        };

        tracing::debug!("Requesting article from {} for: {}", self.config.model_name, title);
        let response = self.client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::TransformationFailed(format!("Request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::TransformationFailed(format!("Failed to read response: {}", e)))?;
        if !status.is_success() {
            return Err(Error::TransformationFailed(format!(
                "Backend returned {}: {}",
                status,
                excerpt(&text)
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| Error::TransformationFailed(format!("Malformed response: {}", e)))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(Error::TransformationFailed("Backend returned no article text".to_string()));
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::State,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct Stub {
        status: StatusCode,
        reply: Value,
        seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    }

    async fn completions(
        State(stub): State<Stub>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        stub.seen.lock().unwrap().push((auth, body));
        (stub.status, Json(stub.reply.clone()))
    }

    async fn serve(stub: Stub) -> String {
        let app = Router::new()
            .route("/v1/chat/completions", post(completions))
            .with_state(stub);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    fn stub(status: StatusCode, reply: Value) -> Stub {
        Stub {
            status,
            reply,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn model_for(base_url: String) -> ChatCompletionModel {
        let config = InferenceConfig::new("sk-test")
            .with_base_url(base_url)
            .with_model_name("test-model");
        ChatCompletionModel::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_transform_sends_prompt_and_returns_content() {
        let stub = stub(
            StatusCode::OK,
            json!({ "choices": [{ "message": { "role": "assistant", "content": "  A polished article.  " } }] }),
        );
        let seen = stub.seen.clone();
        let model = model_for(serve(stub).await);

        let article = model.transform("Why Rust?", "").await.unwrap();
        assert_eq!(article, "A polished article.");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (auth, body) = &seen[0];
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["role"], "user");
        let prompt = body["messages"][0]["content"].as_str().unwrap();
        assert!(prompt.contains("Reddit Post Title: Why Rust?"));
        assert!(body.get("max_tokens").is_none());
    }

    #[tokio::test]
    async fn test_identical_calls_are_not_cached() {
        let stub = stub(
            StatusCode::OK,
            json!({ "choices": [{ "message": { "content": "Article" } }] }),
        );
        let seen = stub.seen.clone();
        let model = model_for(serve(stub).await);

        model.transform("Same", "input").await.unwrap();
        model.transform("Same", "input").await.unwrap();
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_backend_error_status_is_transformation_failure() {
        let stub = stub(
            StatusCode::TOO_MANY_REQUESTS,
            json!({ "error": { "message": "quota exceeded" } }),
        );
        let model = model_for(serve(stub).await);

        let err = model.transform("Title", "Body").await.unwrap_err();
        assert!(matches!(err, Error::TransformationFailed(_)));
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_empty_choices_is_transformation_failure() {
        let model = model_for(serve(stub(StatusCode::OK, json!({ "choices": [] }))).await);
        let err = model.transform("Title", "Body").await.unwrap_err();
        assert!(matches!(err, Error::TransformationFailed(_)));

        let model = model_for(
            serve(stub(StatusCode::OK, json!({ "choices": [{ "message": { "content": "   " } }] }))).await,
        );
        let err = model.transform("Title", "Body").await.unwrap_err();
        assert!(matches!(err, Error::TransformationFailed(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transformation_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let model = model_for(format!("http://{}/v1", addr));
        let err = model.transform("Title", "Body").await.unwrap_err();
        assert!(matches!(err, Error::TransformationFailed(_)));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let model = ChatCompletionModel::new(InferenceConfig::new("sk-very-secret")).unwrap();
        assert!(!format!("{:?}", model).contains("sk-very-secret"));
    }
}

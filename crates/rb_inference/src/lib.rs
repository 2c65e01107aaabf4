use rb_core::config::{env_lookup, optional, parsed_or, required};
use rb_core::{Error, Result};
use std::fmt;
use std::time::Duration;

pub mod models;
pub mod prompt;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Settings for an OpenAI-compatible chat completion backend.
#[derive(Clone)]
pub struct InferenceConfig {
    pub api_key: String,
    pub base_url: String,
    pub model_name: String,
    pub timeout: Duration,
    pub max_tokens: Option<u32>,
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model_name", &self.model_name)
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl InferenceConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model_name: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_tokens: None,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = required(&lookup, "OPENAI_API_KEY")?;
        let base_url = optional(&lookup, "OPENAI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        url::Url::parse(&base_url)
            .map_err(|e| Error::ConfigurationInvalid(format!("OPENAI_BASE_URL: {}", e)))?;

        let max_tokens = match optional(&lookup, "OPENAI_MAX_TOKENS") {
            Some(raw) => Some(raw.parse().map_err(|e| {
                Error::ConfigurationInvalid(format!("OPENAI_MAX_TOKENS: {}", e))
            })?),
            None => None,
        };

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model_name: optional(&lookup, "OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(parsed_or(&lookup, "OPENAI_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?),
            max_tokens,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }
}

pub mod prelude {
    pub use super::models::create_model;
    pub use super::InferenceConfig;
    pub use rb_core::{Error, Result, TextTransformer};
}

pub use models::create_model;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_requires_api_key() {
        let err = InferenceConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::ConfigurationInvalid(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_config_defaults() {
        let config = InferenceConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model_name, DEFAULT_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.max_tokens, None);
    }

    #[test]
    fn test_config_overrides() {
        let config = InferenceConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:11434/v1/"),
            ("OPENAI_MODEL", "llama3"),
            ("OPENAI_TIMEOUT_SECS", "10"),
            ("OPENAI_MAX_TOKENS", "1200"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:11434/v1");
        assert_eq!(config.model_name, "llama3");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.max_tokens, Some(1200));
    }

    #[test]
    fn test_config_rejects_bad_base_url() {
        let result = InferenceConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "not a url"),
        ]));
        assert!(matches!(result, Err(Error::ConfigurationInvalid(_))));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = InferenceConfig::new("sk-very-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("<redacted>"));
    }
}

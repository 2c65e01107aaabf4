use async_trait::async_trait;
use rb_core::config::{env_lookup, optional, parsed_or, required};
use rb_core::{clamp_count, Error, Result, SourceFetcher, SourceItemDraft};
use reqwest::{redirect, Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::normalize_community;

pub const DEFAULT_AUTH_URL: &str = "https://www.reddit.com";
pub const DEFAULT_API_URL: &str = "https://oauth.reddit.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Tokens this close to expiry are refreshed before use.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);
/// Lifetime assumed when the token response omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);
/// Upper bound on how long a token is cached, whatever the server claims.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 3600);

fn token_expiry(now: Instant, expires_in: Option<u64>) -> Instant {
    let lifetime = expires_in
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TOKEN_LIFETIME)
        .min(MAX_TOKEN_LIFETIME);
    now.checked_add(lifetime).unwrap_or(now)
}

/// Credentials and endpoints for a Reddit "script" application.
#[derive(Clone)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
    pub auth_url: String,
    pub api_url: String,
    pub timeout: Duration,
}

impl fmt::Debug for RedditConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("auth_url", &self.auth_url)
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RedditConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = required(&lookup, "REDDIT_CLIENT_ID")?;
        let client_secret = required(&lookup, "REDDIT_CLIENT_SECRET")?;
        let username = required(&lookup, "REDDIT_USERNAME")?;
        let password = required(&lookup, "REDDIT_PASSWORD")?;

        let user_agent = optional(&lookup, "REDDIT_USER_AGENT").unwrap_or_else(|| {
            format!("script:rb_ingest:{} (by /u/{})", env!("CARGO_PKG_VERSION"), username)
        });
        let auth_url = base_url(&lookup, "REDDIT_AUTH_URL", DEFAULT_AUTH_URL)?;
        let api_url = base_url(&lookup, "REDDIT_API_URL", DEFAULT_API_URL)?;
        let timeout = Duration::from_secs(parsed_or(&lookup, "REDDIT_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?);

        Ok(Self {
            client_id,
            client_secret,
            username,
            password,
            user_agent,
            auth_url,
            api_url,
            timeout,
        })
    }
}

fn base_url<F>(lookup: &F, key: &str, default: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = optional(lookup, key).unwrap_or_else(|| default.to_string());
    url::Url::parse(&raw).map_err(|e| Error::ConfigurationInvalid(format!("{}: {}", key, e)))?;
    Ok(raw.trim_end_matches('/').to_string())
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

#[derive(Deserialize)]
struct Thing {
    kind: String,
    data: PostData,
}

#[derive(Deserialize)]
struct PostData {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: Option<String>,
}

/// Parses a subreddit listing into drafts, keeping only posts (`t3`).
fn parse_listing(raw: &str) -> Result<Vec<SourceItemDraft>> {
    let listing: Listing = serde_json::from_str(raw)
        .map_err(|e| Error::SourceUnavailable(format!("Malformed listing: {}", e)))?;
    Ok(listing
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == "t3")
        .map(|thing| SourceItemDraft::new(thing.data.id, thing.data.title, thing.data.selftext))
        .collect())
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// Fetches "hot" posts through Reddit's OAuth API.
pub struct RedditFetcher {
    client: Client,
    config: RedditConfig,
    token: Mutex<Option<AccessToken>>,
}

impl fmt::Debug for RedditFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditFetcher")
            .field("client", &"<reqwest::Client>")
            .field("config", &self.config)
            .finish()
    }
}

impl RedditFetcher {
    pub fn new(config: RedditConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| Error::ConfigurationInvalid(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            config,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + REFRESH_MARGIN {
                return Ok(token.value.clone());
            }
        }

        let token = self.authenticate().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn authenticate(&self) -> Result<AccessToken> {
        tracing::debug!("Authenticating with Reddit as {}", self.config.username);
        let response = self.client
            .post(format!("{}/api/v1/access_token", self.config.auth_url))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("Authentication request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::SourceUnavailable(format!("Authentication rejected: HTTP {}", status)));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("Malformed token response: {}", e)))?;
        if let Some(error) = body.error {
            return Err(Error::SourceUnavailable(format!("Authentication rejected: {}", error)));
        }
        let value = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::SourceUnavailable("Token response carried no access token".to_string()))?;

        Ok(AccessToken {
            value,
            expires_at: token_expiry(Instant::now(), body.expires_in),
        })
    }

    async fn forget_token(&self) {
        *self.token.lock().await = None;
    }
}

#[async_trait]
impl SourceFetcher for RedditFetcher {
    fn platform(&self) -> &str {
        "Reddit"
    }

    fn canonical_community(&self, community: &str) -> Result<String> {
        normalize_community(community).map(str::to_string)
    }

    async fn fetch(&self, community: &str, count: u32) -> Result<Vec<SourceItemDraft>> {
        let community = normalize_community(community)?;
        let limit = clamp_count(count as i64);
        let token = self.access_token().await?;

        let response = self.client
            .get(format!("{}/r/{}/hot", self.config.api_url, community))
            .query(&[("limit", limit.to_string()), ("raw_json", "1".to_string())])
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("Listing request failed: {}", e)))?;

        let status = response.status();
        if status.is_redirection() {
            // Reddit redirects unknown communities to its search page
            return Err(Error::SourceUnavailable(format!("r/{} does not exist", community)));
        }
        if !status.is_success() {
            let reason = match status {
                StatusCode::UNAUTHORIZED => {
                    self.forget_token().await;
                    "authentication expired or was revoked".to_string()
                }
                StatusCode::FORBIDDEN => format!("r/{} is private or quarantined", community),
                StatusCode::NOT_FOUND => format!("r/{} does not exist", community),
                StatusCode::TOO_MANY_REQUESTS => "rate limited".to_string(),
                other => format!("HTTP {}", other),
            };
            return Err(Error::SourceUnavailable(format!("Listing r/{} failed: {}", community, reason)));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("Failed to read listing: {}", e)))?;
        let mut drafts = parse_listing(&raw)?;
        drafts.truncate(limit as usize);

        tracing::debug!("Fetched {} posts from r/{}", drafts.len(), community);
        Ok(drafts)
    }
}

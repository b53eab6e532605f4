//! OpenDota REST API Client
//!
//! HTTP client for the player endpoints of the OpenDota API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{MatchSource, OpenDotaError, PlayerProfile};
use crate::filter::MatchRecord;

/// Record fields requested from `/players/{id}/matches`.
///
/// `lane_role` and `is_roaming` are needed by the post-filters.
pub const PROJECTED_FIELDS: &[&str] = &[
    "match_id",
    "player_slot",
    "radiant_win",
    "duration",
    "game_mode",
    "lobby_type",
    "hero_id",
    "start_time",
    "kills",
    "deaths",
    "assists",
    "lane_role",
    "is_roaming",
];

/// OpenDota REST API client
pub struct OpenDotaClient {
    client: Client,
    config: OpenDotaConfig,
}

/// Configuration for the OpenDota client
#[derive(Debug, Clone)]
pub struct OpenDotaConfig {
    /// Base URL for the API (e.g., "https://api.opendota.com/api")
    pub base_url: String,
    /// Optional API key for higher rate limits
    pub api_key: Option<String>,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for OpenDotaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.opendota.com/api".to_string(),
            api_key: None,
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PlayerResponse {
    profile: Option<PlayerProfile>,
}

impl OpenDotaClient {
    /// Create a new OpenDota client with the given configuration
    pub fn new(config: OpenDotaConfig) -> Result<Self, OpenDotaError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .user_agent(concat!("dotafilter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenDotaConfig {
        &self.config
    }

    /// URL of a player's profile
    pub fn player_url(&self, account_id: u64) -> String {
        let mut url = format!(
            "{}/players/{}",
            self.config.base_url.trim_end_matches('/'),
            account_id
        );
        if let Some(key) = &self.config.api_key {
            url.push_str(&format!("?api_key={}", urlencoding::encode(key)));
        }
        url
    }

    /// URL of a player's match list, filtered by a query encoding.
    ///
    /// Each `name=value` pair of `query_args` is percent-encoded here.
    pub fn matches_url(&self, account_id: u64, query_args: &str) -> String {
        let mut params: Vec<String> = query_args
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((name, value)) => format!(
                    "{}={}",
                    urlencoding::encode(name),
                    urlencoding::encode(value)
                ),
                None => urlencoding::encode(pair).into_owned(),
            })
            .collect();

        params.extend(PROJECTED_FIELDS.iter().map(|f| format!("project={}", f)));

        if let Some(key) = &self.config.api_key {
            params.push(format!("api_key={}", urlencoding::encode(key)));
        }

        format!(
            "{}/players/{}/matches?{}",
            self.config.base_url.trim_end_matches('/'),
            account_id,
            params.join("&")
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, OpenDotaError> {
        debug!(url = %url, "OpenDota request");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                OpenDotaError::Timeout
            } else if e.is_connect() {
                OpenDotaError::Unavailable
            } else {
                OpenDotaError::Request(e)
            }
        })?;

        let status = response.status();

        if status.as_u16() == 429 {
            warn!("OpenDota rate limit hit");
            return Err(OpenDotaError::RateLimited);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(OpenDotaError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        response
            .json()
            .await
            .map_err(|e| OpenDotaError::Parse(e.to_string()))
    }
}

#[async_trait]
impl MatchSource for OpenDotaClient {
    async fn player_profile(&self, account_id: u64) -> Result<Option<PlayerProfile>, OpenDotaError> {
        let response: PlayerResponse = self.get_json(&self.player_url(account_id)).await?;
        Ok(response.profile)
    }

    async fn player_matches(
        &self,
        account_id: u64,
        query_args: &str,
    ) -> Result<Vec<MatchRecord>, OpenDotaError> {
        let matches: Vec<MatchRecord> = self
            .get_json(&self.matches_url(account_id, query_args))
            .await?;
        debug!(account_id, count = matches.len(), "Fetched matches");
        Ok(matches)
    }
}

//! OpenDota Integration
//!
//! Fetches player profiles and match histories that filters are applied to.
//!
//! - **MatchSource**: trait over anything that can serve players and matches
//! - **OpenDotaClient**: the REST implementation

mod client;

pub use client::{OpenDotaClient, OpenDotaConfig, PROJECTED_FIELDS};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::filter::MatchRecord;

/// Source of player profiles and match histories
#[async_trait]
pub trait MatchSource: Send + Sync {
    /// Public profile of an account, `None` if the account has no public data
    async fn player_profile(&self, account_id: u64) -> Result<Option<PlayerProfile>, OpenDotaError>;

    /// Matches of an account, narrowed by a `name=value&...` query encoding
    async fn player_matches(
        &self,
        account_id: u64,
        query_args: &str,
    ) -> Result<Vec<MatchRecord>, OpenDotaError>;
}

/// Public profile of a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub account_id: u64,
    pub personaname: Option<String>,
    #[serde(default)]
    pub avatarfull: Option<String>,
}

/// Errors that can occur talking to OpenDota
#[derive(Debug, thiserror::Error)]
pub enum OpenDotaError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("OpenDota is unavailable")]
    Unavailable,

    #[error("Rate limited by OpenDota, try again in a minute")]
    RateLimited,

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

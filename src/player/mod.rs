//! Player Resolution
//!
//! Turns a player reference (account id, steam id, profile URL, mention or
//! linked name) into a Dota account id that match queries can run against.

mod reference;

pub use reference::{parse_player_ref, steam64_to_account_id, PlayerRef, STEAM_ID64_BASE};

use std::collections::HashMap;
use tracing::debug;

use crate::opendota::{MatchSource, OpenDotaError};

/// Profile page of an account on OpenDota
pub fn opendota_profile_url(account_id: u64) -> String {
    format!("https://www.opendota.com/players/{}", account_id)
}

/// Known links from names (or chat user ids) to Dota account ids
#[derive(Debug, Clone, Default)]
pub struct AccountLinks {
    accounts: HashMap<String, u64>,
    default_player: Option<String>,
}

impl AccountLinks {
    /// Create links from a name -> steam id table. Steam64 ids are converted.
    pub fn new(accounts: &HashMap<String, u64>, default_player: Option<String>) -> Self {
        Self {
            accounts: accounts
                .iter()
                .map(|(name, id)| (name.to_lowercase(), steam64_to_account_id(*id)))
                .collect(),
            default_player,
        }
    }

    /// Add or replace a link
    pub fn link(mut self, name: &str, steam_id: u64) -> Self {
        self.accounts
            .insert(name.to_lowercase(), steam64_to_account_id(steam_id));
        self
    }

    /// Set the reference used when no player is given
    pub fn with_default_player(mut self, reference: impl Into<String>) -> Self {
        self.default_player = Some(reference.into());
        self
    }

    /// Account id linked to a name, case-insensitive
    pub fn lookup(&self, name: &str) -> Option<u64> {
        self.accounts.get(&name.to_lowercase()).copied()
    }

    pub fn default_player(&self) -> Option<&str> {
        self.default_player.as_deref()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// A resolved Dota player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotaPlayer {
    /// Dota account id (32-bit form)
    pub steam_id: u64,
    /// How to refer to the player in output
    pub mention: String,
    /// True when resolved from the default player rather than an explicit reference
    pub is_author: bool,
}

impl DotaPlayer {
    /// Resolve a reference, or the default player when `reference` is `None`
    pub async fn resolve(
        reference: Option<&str>,
        links: &AccountLinks,
        source: &dyn MatchSource,
    ) -> Result<Self, PlayerError> {
        match reference {
            Some(reference) => {
                let player_ref = parse_player_ref(reference)?;
                Self::resolve_ref(player_ref, links, source).await
            }
            None => {
                let reference = links
                    .default_player()
                    .ok_or(PlayerError::SteamNotLinked { user: None })?;
                let player_ref = parse_player_ref(reference)?;

                let player = match Self::resolve_ref(player_ref, links, source).await {
                    Err(PlayerError::SteamNotLinked { .. }) => {
                        return Err(PlayerError::SteamNotLinked { user: None })
                    }
                    other => other?,
                };

                Ok(Self {
                    is_author: true,
                    ..player
                })
            }
        }
    }

    async fn resolve_ref(
        player_ref: PlayerRef,
        links: &AccountLinks,
        source: &dyn MatchSource,
    ) -> Result<Self, PlayerError> {
        debug!(?player_ref, "Resolving player");

        match player_ref {
            PlayerRef::AccountId(account_id) => {
                let profile = source
                    .player_profile(account_id)
                    .await?
                    .ok_or(PlayerError::NoMatchHistory {
                        steam_id: account_id,
                    })?;

                let name = profile
                    .personaname
                    .unwrap_or_else(|| account_id.to_string());

                Ok(Self {
                    steam_id: account_id,
                    mention: format!("[{}]({})", name, opendota_profile_url(account_id)),
                    is_author: false,
                })
            }
            PlayerRef::Mention(user_id) => {
                let mention = format!("<@{}>", user_id);
                let steam_id = links
                    .lookup(&user_id.to_string())
                    .ok_or_else(|| PlayerError::SteamNotLinked {
                        user: Some(mention.clone()),
                    })?;

                Ok(Self {
                    steam_id,
                    mention,
                    is_author: false,
                })
            }
            PlayerRef::Name(name) => {
                let steam_id = links
                    .lookup(&name)
                    .ok_or_else(|| PlayerError::SteamNotLinked {
                        user: Some(name.clone()),
                    })?;

                Ok(Self {
                    steam_id,
                    mention: name,
                    is_author: false,
                })
            }
        }
    }

    /// OpenDota profile URL
    pub fn profile_url(&self) -> String {
        opendota_profile_url(self.steam_id)
    }
}

/// Errors that can occur resolving a player
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("{}", steam_not_linked_message(.user.as_deref()))]
    SteamNotLinked { user: Option<String> },

    #[error("{}", no_match_history_message(.steam_id))]
    NoMatchHistory { steam_id: u64 },

    #[error("You have to name a linked player, @mention a linked user, or give a steam id (got \"{0}\")")]
    InvalidReference(String),

    #[error(transparent)]
    Source(#[from] OpenDotaError),
}

fn no_match_history_message(steam_id: &u64) -> String {
    format!(
        "It looks like you either haven't played dota on this account, or the matches you've played are hidden. \
         If you've played matches on this account, enable the **Expose Public Match Data** option in dota, \
         then go to {} and click the button under your name that says **REFRESH**",
        opendota_profile_url(*steam_id)
    )
}

fn steam_not_linked_message(user: Option<&str>) -> String {
    match user {
        Some(user) => format!(
            "{} doesn't have a steam account linked. Add them under [accounts] in your config.",
            user
        ),
        None => "Your steam account isn't linked yet.\nSet `default_player` in your config, or pass --player.".to_string(),
    }
}

//! # Dotafilter
//!
//! Free-text match filters for Dota 2. Short phrases such as
//! `"wins on radiant ranked mid lane last month"` become OpenDota query
//! parameters plus a predicate for conditions the API can't filter on.
//!
//! ## Modules
//!
//! - [`filter`]: Phrase scanner, clause descriptors and the match filter
//! - [`player`]: Player references and account links
//! - [`opendota`]: OpenDota REST client
//! - [`report`]: Match report formatting
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dotafilter::filter::MatchFilter;
//! use dotafilter::opendota::{MatchSource, OpenDotaClient, OpenDotaConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let filter = MatchFilter::standard()?;
//!     let parsed = filter.parse("ranked wins as dire last 2 weeks")?;
//!
//!     let client = OpenDotaClient::new(OpenDotaConfig::default())?;
//!     let matches = client
//!         .player_matches(86745912, &parsed.to_query_args())
//!         .await?;
//!
//!     let matches = parsed.filter_records(matches);
//!     println!("Found {} matches", matches.len());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod filter;
pub mod opendota;
pub mod player;
pub mod report;

// Re-export top-level types for convenience
pub use filter::{
    ClauseDescriptor, ClauseValue, FilterError, FilterResult, MatchFilter, MatchRecord,
    ParsedFilter, ResolvedClause,
};

pub use player::{AccountLinks, DotaPlayer, PlayerError, PlayerRef};

pub use opendota::{MatchSource, OpenDotaClient, OpenDotaError, PlayerProfile};

pub use config::{Config, ConfigError, LoggingConfig};

//! Dotafilter CLI
//!
//! Command-line interface for match filters:
//! - Parse a filter phrase
//! - Fetch a player's matches through a filter
//! - Generate a config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dotafilter::config::{generate_default_config, Config, LoggingConfig};
use dotafilter::filter::{MatchFilter, ParsedFilter};
use dotafilter::opendota::{MatchSource, OpenDotaClient};
use dotafilter::player::{DotaPlayer, PlayerError};
use dotafilter::report::{render_clauses, render_matches, MatchSummary};

#[derive(Parser)]
#[command(name = "dotafilter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Filter Dota 2 match histories with plain phrases")]
#[command(long_about = "Dotafilter turns phrases like \"wins on radiant ranked mid lane last month\"\ninto OpenDota queries and applies them to a player's match history.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/dotafilter/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show how a filter phrase is understood
    Parse {
        /// Filter phrase, e.g. "ranked wins last week"
        phrase: Vec<String>,
    },

    /// List a player's matches that fit a filter phrase
    Matches {
        /// Filter phrase (empty = all matches)
        phrase: Vec<String>,
        /// Player: account id, steam id, profile URL or linked name
        #[arg(short, long)]
        player: Option<String>,
        /// Maximum number of matches to request
        #[arg(short, long)]
        limit: Option<u32>,
        /// Only matches on this hero
        #[arg(long)]
        hero_id: Option<u32>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging);

    match cli.command {
        Commands::Parse { phrase } => {
            let parsed = parse_phrase(&phrase)?;
            let query_args = parsed.to_query_args();

            match cli.format.as_str() {
                "json" => {
                    let body = serde_json::json!({
                        "query": query_args,
                        "clauses": parsed.summary(),
                    });
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                _ => print!("{}", render_clauses(&parsed.summary(), &query_args)),
            }
        }

        Commands::Matches {
            phrase,
            player,
            limit,
            hero_id,
        } => {
            let mut parsed = parse_phrase(&phrase)?;
            if let Some(hero_id) = hero_id {
                parsed.add_constant("hero_id", i64::from(hero_id));
            }
            if let Some(limit) = limit {
                parsed.add_constant("limit", i64::from(limit));
            }

            let client = OpenDotaClient::new(config.opendota.client_config())?;
            let links = config.account_links();

            let player = match DotaPlayer::resolve(player.as_deref(), &links, &client).await {
                Ok(player) => player,
                Err(e) => exit_with(&e),
            };
            tracing::info!(steam_id = player.steam_id, "Resolved player {}", player.mention);

            let query_args = parsed.to_query_args();
            let matches = client
                .player_matches(player.steam_id, &query_args)
                .await
                .context("Failed to fetch matches")?;

            if matches.is_empty() && parsed.is_unfiltered() {
                exit_with(&PlayerError::NoMatchHistory {
                    steam_id: player.steam_id,
                });
            }

            let matches = parsed.filter_records(matches);

            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&matches)?),
                _ => {
                    let rows: Vec<MatchSummary> =
                        matches.iter().filter_map(MatchSummary::from_record).collect();
                    println!("Matches for {}", player.mention);
                    println!();
                    print!("{}", render_matches(&rows));
                }
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Ok(Config::load_with_env(path)?),
        None => Ok(Config::load_default()),
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("dotafilter={}", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn parse_phrase(words: &[String]) -> anyhow::Result<ParsedFilter> {
    let filter = MatchFilter::standard()?;
    match filter.parse(&words.join(" ")) {
        Ok(parsed) => Ok(parsed),
        Err(e) if e.is_internal() => {
            tracing::error!("Filter definition is broken: {}", e);
            Err(e.into())
        }
        Err(e) => exit_with(&e),
    }
}

/// Report a user-facing error and exit
fn exit_with(error: &dyn std::error::Error) -> ! {
    eprintln!("{}", error);
    std::process::exit(1);
}

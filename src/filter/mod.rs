//! Free-text match filters
//!
//! Turns short phrases into OpenDota query parameters plus a predicate for
//! conditions the server can't evaluate:
//!
//! - **Scanner**: whitespace normalization and word-bounded phrase extraction
//! - **Descriptors**: choice, counted time span and constant clauses
//! - **Matcher**: runs every clause once, in order, and rejects leftovers
//!
//! # Filter Language
//!
//! ```text
//! [wins|losses] [as|on radiant|dire] [ranked|unranked]
//! [safe|mid|off lane|jungle] [roaming|ganking]
//! [in|over] [the] [this|last|past] [N] day|week|month|year[s]
//! ```
//!
//! Phrases may appear in any order; each can be used once.
//!
//! # Examples
//!
//! ```rust,ignore
//! use dotafilter::filter::MatchFilter;
//!
//! let filter = MatchFilter::standard()?;
//! let parsed = filter.parse("wins on radiant ranked mid lane last month")?;
//!
//! assert_eq!(
//!     parsed.to_query_args(),
//!     "win=1&is_radiant=1&lobby_type=7&lane_role=2&date=30"
//! );
//!
//! let kept = parsed.filter_records(matches);
//! ```

mod descriptor;
pub mod dota;
mod error;
mod matcher;
mod record;
mod scanner;
mod span;

pub use descriptor::{Alternative, ClauseDescriptor, ClauseGrammar, ClauseValue, PostFilter};
pub use dota::dota_matches;
pub use error::{FilterError, FilterResult};
pub use matcher::{ClauseSet, ClauseSummary, MatchFilter, ParsedFilter, ResolvedClause};
pub use record::{field_equals, field_is_truthy, is_truthy, MatchRecord};
pub use scanner::{build_pattern, normalize, take_first_from, Scanner};
pub use span::{days_per_unit, span_pattern, SpanGrammar, TimeSpan, DAYS_PER_UNIT};

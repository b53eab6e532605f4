//! Standard Dota 2 match filter
//!
//! Recognizes result, side, lobby, lane, roaming and time-span phrases and maps
//! them onto OpenDota's `/players/{id}/matches` query parameters.
//!
//! Clause order is significant: earlier clauses consume their phrases first.

use std::sync::OnceLock;

use crate::filter::descriptor::{ClauseDescriptor, ClauseValue};
use crate::filter::error::FilterResult;
use crate::filter::matcher::MatchFilter;
use crate::filter::record::{field_equals, field_is_truthy};

pub const WIN: &str = "win";
pub const IS_RADIANT: &str = "is_radiant";
pub const LOBBY_TYPE: &str = "lobby_type";
pub const LANE_ROLE: &str = "lane_role";
pub const ROAMING: &str = "roaming";
pub const DATE: &str = "date";

/// Record field OpenDota uses for roaming players
pub const IS_ROAMING_FIELD: &str = "is_roaming";

/// Lobby type id of ranked matchmaking
pub const RANKED_LOBBY: i64 = 7;

/// Build the standard filter
pub fn dota_matches() -> FilterResult<MatchFilter> {
    let win = ClauseDescriptor::choice(
        WIN,
        Some(WIN),
        [(r"wins?|won|victory", 1), (r"loss|lost|losses|defeat", 0)],
    )?;

    let side = ClauseDescriptor::choice(
        IS_RADIANT,
        Some(IS_RADIANT),
        [(r"(as|on)? ?radiant", 1), (r"(as|on)? ?dire", 0)],
    )?;

    let lobby = ClauseDescriptor::choice(
        LOBBY_TYPE,
        Some(LOBBY_TYPE),
        [(r"ranked", RANKED_LOBBY), (r"(un|non)-?ranked", 0)],
    )?;

    // A roaming player has no fixed lane, so the lane check only applies
    // when roaming wasn't asked for.
    let lane = ClauseDescriptor::choice(
        LANE_ROLE,
        Some(LANE_ROLE),
        [
            (r"safe( ?lane)?", 1),
            (r"mid(dle)?( ?lane)?", 2),
            (r"(off|hard)( ?lane)?", 3),
            (r"jungl(e|ing)", 4),
        ],
    )?
    .with_post_filter(|clauses, record| {
        if clauses.is_resolved(ROAMING) {
            return true;
        }
        !field_is_truthy(record, IS_ROAMING_FIELD)
            && clauses
                .value(LANE_ROLE)
                .map(|lane| field_equals(record, LANE_ROLE, lane))
                .unwrap_or(true)
    });

    let roaming = ClauseDescriptor::choice(
        ROAMING,
        None,
        [(r"roam(ing)?|gank(ing)?", ClauseValue::Bool(true))],
    )?
    .with_post_filter(|_, record| field_is_truthy(record, IS_ROAMING_FIELD));

    let date = ClauseDescriptor::counted_span(DATE, Some(DATE))?;

    Ok(MatchFilter::new([win, side, lobby, lane, roaming, date]))
}

impl MatchFilter {
    /// The standard Dota filter, compiled once per process
    pub fn standard() -> FilterResult<MatchFilter> {
        static STANDARD: OnceLock<FilterResult<MatchFilter>> = OnceLock::new();
        STANDARD.get_or_init(dota_matches).clone()
    }
}

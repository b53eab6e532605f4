//! Match report formatting
//!
//! Flattens OpenDota match records into rows for terminal output.

use chrono::DateTime;
use serde::Serialize;

use crate::filter::{ClauseSummary, MatchRecord};

/// Player slots from this value up are on the dire side
const DIRE_SLOT_START: u64 = 128;

/// One row of a match report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub match_id: u64,
    pub hero_id: Option<u64>,
    pub won: Option<bool>,
    pub radiant: Option<bool>,
    pub lane: Option<&'static str>,
    pub roaming: bool,
    pub kda: Option<(u64, u64, u64)>,
    pub date: Option<String>,
}

impl MatchSummary {
    /// Summarize a record. Records without a match id are skipped.
    pub fn from_record(record: &MatchRecord) -> Option<Self> {
        let field = |name: &str| record.get(name).and_then(|v| v.as_u64());

        let match_id = field("match_id")?;
        let radiant = field("player_slot").map(|slot| slot < DIRE_SLOT_START);
        let radiant_win = record.get("radiant_win").and_then(|v| v.as_bool());
        let won = match (radiant, radiant_win) {
            (Some(radiant), Some(radiant_win)) => Some(radiant == radiant_win),
            _ => None,
        };

        let kda = match (field("kills"), field("deaths"), field("assists")) {
            (Some(k), Some(d), Some(a)) => Some((k, d, a)),
            _ => None,
        };

        let date = record
            .get("start_time")
            .and_then(|v| v.as_i64())
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.format("%Y-%m-%d").to_string());

        Some(Self {
            match_id,
            hero_id: field("hero_id"),
            won,
            radiant,
            lane: field("lane_role").and_then(lane_name),
            roaming: crate::filter::field_is_truthy(record, "is_roaming"),
            kda,
            date,
        })
    }
}

/// Display name of an OpenDota lane role
pub fn lane_name(lane_role: u64) -> Option<&'static str> {
    match lane_role {
        1 => Some("safe"),
        2 => Some("mid"),
        3 => Some("off"),
        4 => Some("jungle"),
        _ => None,
    }
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Render match rows as a text table
pub fn render_matches(rows: &[MatchSummary]) -> String {
    if rows.is_empty() {
        return "No matches found\n".to_string();
    }

    let mut out = format!(
        "{:<12} {:<6} {:<6} {:<8} {:<8} {:<10} {}\n",
        "Match", "Hero", "Result", "Side", "Lane", "K/D/A", "Date"
    );
    out.push_str(&"-".repeat(64));
    out.push('\n');

    for row in rows {
        let result = row.won.map(|w| if w { "Win" } else { "Loss" });
        let side = row.radiant.map(|r| if r { "Radiant" } else { "Dire" });
        let lane = if row.roaming { Some("roam") } else { row.lane };
        let kda = row.kda.map(|(k, d, a)| format!("{}/{}/{}", k, d, a));

        out.push_str(&format!(
            "{:<12} {:<6} {:<6} {:<8} {:<8} {:<10} {}\n",
            row.match_id,
            or_dash(row.hero_id),
            or_dash(result),
            or_dash(side),
            or_dash(lane),
            or_dash(kda),
            or_dash(row.date.as_deref()),
        ));
    }

    out
}

/// Render resolved clauses as a text table
pub fn render_clauses(clauses: &[ClauseSummary], query_args: &str) -> String {
    let mut out = format!("{:<12} {:<12} {}\n", "Clause", "Parameter", "Value");
    out.push_str(&"-".repeat(40));
    out.push('\n');

    for clause in clauses {
        out.push_str(&format!(
            "{:<12} {:<12} {}\n",
            clause.label,
            or_dash(clause.server_name.as_deref()),
            or_dash(clause.value.as_ref()),
        ));
    }

    out.push('\n');
    if query_args.is_empty() {
        out.push_str("Query: (none)\n");
    } else {
        out.push_str(&format!("Query: {}\n", query_args));
    }
    out
}

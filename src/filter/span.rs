//! Counted time spans
//!
//! Recognizes phrases like "last week", "over the past 3 months" or just "year"
//! and converts them into a number of days.

use regex::Regex;

use crate::filter::error::{FilterError, FilterResult};
use crate::filter::scanner::build_exact_pattern;

/// Days per unit. The unit alternation of the span pattern is generated from
/// this table, so every unit the pattern can capture has an entry.
pub const DAYS_PER_UNIT: &[(&str, i64)] = &[("day", 1), ("week", 7), ("month", 30), ("year", 365)];

/// A recognized time span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    /// How many units ("3 months" -> 3, "last month" -> 1)
    pub count: i64,
    /// Days in one unit
    pub unit_days: i64,
    /// Total span in days
    pub days: i64,
}

/// Look up the day multiplier for a unit keyword
pub fn days_per_unit(unit: &str) -> Option<i64> {
    let unit = unit.to_lowercase();
    DAYS_PER_UNIT
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, days)| *days)
}

/// Alternation source for span phrases
pub fn span_pattern() -> String {
    let units = DAYS_PER_UNIT
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join("|");

    format!(
        r"(?:(?:in|over) )?(?:the )?(?:(?:this|last|past) )?(?:(?P<count>\d+) ?)?(?P<unit>{})s?",
        units
    )
}

/// The counted-span grammar, compiled
#[derive(Debug, Clone)]
pub struct SpanGrammar {
    exact: Regex,
}

impl SpanGrammar {
    /// Compile the span grammar
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            exact: build_exact_pattern(&span_pattern())?,
        })
    }

    /// Resolve a phrase the scanner extracted with [`span_pattern`]
    pub fn resolve(&self, label: &str, matched: &str) -> FilterResult<TimeSpan> {
        let mismatch = || FilterError::GrammarTableMismatch {
            label: label.to_string(),
            matched: matched.to_string(),
        };

        let caps = self.exact.captures(matched).ok_or_else(mismatch)?;
        let unit = caps.name("unit").ok_or_else(mismatch)?.as_str();
        let unit_days = days_per_unit(unit).ok_or_else(mismatch)?;

        let count = match caps.name("count") {
            Some(count) => count
                .as_str()
                .parse::<i64>()
                .map_err(|_| FilterError::SpanOutOfRange {
                    count: count.as_str().to_string(),
                    unit: unit.to_lowercase(),
                })?,
            None => 1,
        };

        let days = count
            .checked_mul(unit_days)
            .ok_or_else(|| FilterError::SpanOutOfRange {
                count: count.to_string(),
                unit: unit.to_lowercase(),
            })?;

        Ok(TimeSpan {
            count,
            unit_days,
            days,
        })
    }
}

//! Match filter
//!
//! A [`MatchFilter`] is an ordered schema of clause descriptors. Parsing runs
//! every descriptor against the input exactly once, in declaration order, and
//! accepts the input only if nothing is left over afterwards.
//!
//! ```text
//! "wins on radiant ranked mid lane last month"
//!   win        -> "wins"        -> 1
//!   is_radiant -> "on radiant"  -> 1
//!   lobby_type -> "ranked"      -> 7
//!   lane_role  -> "mid lane"    -> 2
//!   roaming    -> (no match)
//!   date       -> "last month"  -> 30
//!   => win=1&is_radiant=1&lobby_type=7&lane_role=2&date=30
//! ```

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::filter::descriptor::{ClauseDescriptor, ClauseValue};
use crate::filter::error::{FilterError, FilterResult};
use crate::filter::record::MatchRecord;
use crate::filter::scanner::Scanner;

/// The outcome of attempting one descriptor against the input
#[derive(Debug, Clone)]
pub struct ResolvedClause {
    descriptor: Arc<ClauseDescriptor>,
    value: Option<ClauseValue>,
}

impl ResolvedClause {
    pub fn new(descriptor: Arc<ClauseDescriptor>, value: Option<ClauseValue>) -> Self {
        Self { descriptor, value }
    }

    pub fn descriptor(&self) -> &ClauseDescriptor {
        &self.descriptor
    }

    pub fn label(&self) -> &str {
        self.descriptor.label()
    }

    pub fn value(&self) -> Option<&ClauseValue> {
        self.value.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.value.is_some()
    }

    /// `name=value` for resolved clauses that have a server name
    pub fn to_query_arg(&self) -> Option<String> {
        let name = self.descriptor.server_name()?;
        let value = self.value.as_ref()?;
        Some(format!("{}={}", name, value))
    }

    /// Run this clause's post-filter. Vacuously true when unresolved or filter-less.
    pub fn check_post_filter(&self, clauses: &ClauseSet<'_>, record: &MatchRecord) -> bool {
        match (&self.value, self.descriptor.post_filter()) {
            (Some(_), Some(filter)) => filter(clauses, record),
            _ => true,
        }
    }
}

/// Read-only view over every clause of one parse, handed to post-filters
#[derive(Debug, Clone, Copy)]
pub struct ClauseSet<'a> {
    clauses: &'a [ResolvedClause],
}

impl<'a> ClauseSet<'a> {
    pub fn new(clauses: &'a [ResolvedClause]) -> Self {
        Self { clauses }
    }

    /// First clause with the given label
    pub fn get(&self, label: &str) -> Option<&'a ResolvedClause> {
        self.clauses.iter().find(|c| c.label() == label)
    }

    pub fn value(&self, label: &str) -> Option<&'a ClauseValue> {
        self.get(label).and_then(|c| c.value())
    }

    pub fn is_resolved(&self, label: &str) -> bool {
        self.value(label).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a ResolvedClause> {
        self.clauses.iter()
    }
}

/// Ordered schema of clause descriptors
///
/// Descriptors are shared behind `Arc` and never mutated, so one filter can
/// serve any number of parses, on any thread.
#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    descriptors: Vec<Arc<ClauseDescriptor>>,
}

impl MatchFilter {
    /// Create a filter from descriptors in priority order
    pub fn new(descriptors: impl IntoIterator<Item = ClauseDescriptor>) -> Self {
        Self {
            descriptors: descriptors.into_iter().map(Arc::new).collect(),
        }
    }

    /// Append a descriptor with the lowest priority so far
    pub fn clause(mut self, descriptor: ClauseDescriptor) -> Self {
        self.descriptors.push(Arc::new(descriptor));
        self
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ClauseDescriptor> {
        self.descriptors.iter().map(|d| d.as_ref())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Parse free text against this filter.
    ///
    /// Fails with [`FilterError::UnrecognizedResidue`] when any words are left
    /// once every descriptor has been attempted.
    pub fn parse(&self, input: &str) -> FilterResult<ParsedFilter> {
        let mut scanner = Scanner::new(input);
        let mut clauses = Vec::with_capacity(self.descriptors.len());

        for descriptor in &self.descriptors {
            let value = match (descriptor.constant_value(), descriptor.pattern()) {
                (Some(value), _) => Some(value.clone()),
                (None, Some(pattern)) => match scanner.take_first(pattern) {
                    Some(matched) => {
                        let value = descriptor.resolve(&matched)?;
                        debug!(
                            clause = descriptor.label(),
                            matched = %matched.trim(),
                            value = %value,
                            "Resolved clause"
                        );
                        Some(value)
                    }
                    None => None,
                },
                (None, None) => None,
            };

            clauses.push(ResolvedClause::new(Arc::clone(descriptor), value));
        }

        if !scanner.is_exhausted() {
            let residue = scanner.into_remaining();
            debug!(residue = %residue, "Rejected filter text");
            return Err(FilterError::UnrecognizedResidue { residue });
        }

        Ok(ParsedFilter { clauses })
    }
}

/// Serializable summary of one clause
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClauseSummary {
    pub label: String,
    pub server_name: Option<String>,
    pub value: Option<ClauseValue>,
}

/// An accepted parse: one clause per descriptor, plus any added constants
#[derive(Debug, Clone, Default)]
pub struct ParsedFilter {
    clauses: Vec<ResolvedClause>,
}

impl ParsedFilter {
    pub fn clauses(&self) -> &[ResolvedClause] {
        &self.clauses
    }

    pub fn clause_set(&self) -> ClauseSet<'_> {
        ClauseSet::new(&self.clauses)
    }

    /// Resolved value of the clause with this label
    pub fn value(&self, label: &str) -> Option<&ClauseValue> {
        self.clause_set().value(label)
    }

    /// True if no clause resolved a value
    pub fn is_unfiltered(&self) -> bool {
        self.clauses.iter().all(|c| !c.is_resolved())
    }

    /// Append a constant clause after parsing
    pub fn add_constant(&mut self, server_name: &str, value: impl Into<ClauseValue>) {
        let descriptor = ClauseDescriptor::constant(server_name, value);
        let value = descriptor.constant_value().cloned();
        self.clauses
            .push(ResolvedClause::new(Arc::new(descriptor), value));
    }

    /// Builder form of [`add_constant`](Self::add_constant)
    pub fn with_constant(mut self, server_name: &str, value: impl Into<ClauseValue>) -> Self {
        self.add_constant(server_name, value);
        self
    }

    /// Query encoding: `name=value` pairs joined by `&`, in declaration order.
    ///
    /// Values are not percent-encoded.
    pub fn to_query_args(&self) -> String {
        self.clauses
            .iter()
            .filter_map(ResolvedClause::to_query_arg)
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Composite post-filter: every active clause's post-filter must pass
    pub fn matches(&self, record: &MatchRecord) -> bool {
        let set = self.clause_set();
        self.clauses
            .iter()
            .all(|clause| clause.check_post_filter(&set, record))
    }

    /// The composite post-filter as a closure
    pub fn predicate(&self) -> impl Fn(&MatchRecord) -> bool + '_ {
        move |record: &MatchRecord| self.matches(record)
    }

    /// Keep only the records that pass every post-filter
    pub fn filter_records(&self, records: Vec<MatchRecord>) -> Vec<MatchRecord> {
        let total = records.len();
        let kept: Vec<_> = records.into_iter().filter(|r| self.matches(r)).collect();
        debug!(total, kept = kept.len(), "Applied post-filters");
        kept
    }

    pub fn summary(&self) -> Vec<ClauseSummary> {
        self.clauses
            .iter()
            .map(|c| ClauseSummary {
                label: c.label().to_string(),
                server_name: c.descriptor().server_name().map(str::to_string),
                value: c.value().cloned(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::record::field_is_truthy;
    use serde_json::json;

    fn record(value: serde_json::Value) -> MatchRecord {
        value.as_object().cloned().unwrap()
    }

    fn small_filter() -> MatchFilter {
        MatchFilter::new([
            ClauseDescriptor::choice("win", Some("win"), [("wins?", 1), ("loss", 0)]).unwrap(),
            ClauseDescriptor::choice("party", None, [("party", true)])
                .unwrap()
                .with_post_filter(|_, r| field_is_truthy(r, "party")),
            ClauseDescriptor::counted_span("date", Some("date")).unwrap(),
        ])
    }

    #[test]
    fn test_every_descriptor_attempted() {
        let parsed = small_filter().parse("wins").unwrap();
        assert_eq!(parsed.clauses().len(), 3);
        assert_eq!(parsed.value("win"), Some(&ClauseValue::Int(1)));
        assert_eq!(parsed.value("party"), None);
        assert_eq!(parsed.value("date"), None);
    }

    #[test]
    fn test_empty_input_accepted() {
        let parsed = small_filter().parse("   ").unwrap();
        assert!(parsed.is_unfiltered());
        assert_eq!(parsed.to_query_args(), "");
        assert!(parsed.matches(&MatchRecord::new()));
    }

    #[test]
    fn test_query_args_skip_serverless_clauses() {
        let parsed = small_filter().parse("party loss last week").unwrap();
        assert_eq!(parsed.to_query_args(), "win=0&date=7");
        assert_eq!(parsed.value("party"), Some(&ClauseValue::Bool(true)));
    }

    #[test]
    fn test_residue_rejected() {
        let result = small_filter().parse("wins yesterday");
        match result {
            Err(FilterError::UnrecognizedResidue { residue }) => assert_eq!(residue, "yesterday"),
            other => panic!("expected residue error, got {:?}", other),
        }
    }

    #[test]
    fn test_second_occurrence_is_residue() {
        let result = small_filter().parse("wins wins");
        assert!(matches!(
            result,
            Err(FilterError::UnrecognizedResidue { .. })
        ));
    }

    #[test]
    fn test_post_filter_only_when_resolved() {
        let filter = small_filter();
        let solo = record(json!({ "party": false }));
        let grouped = record(json!({ "party": true }));

        let parsed = filter.parse("wins").unwrap();
        assert!(parsed.matches(&solo));
        assert!(parsed.matches(&grouped));

        let parsed = filter.parse("party wins").unwrap();
        assert!(!parsed.matches(&solo));
        assert!(parsed.matches(&grouped));
    }

    #[test]
    fn test_key_with_leading_space() {
        let filter = MatchFilter::new([
            ClauseDescriptor::choice("x", Some("x"), [(" xyz", 1)]).unwrap(),
            ClauseDescriptor::choice("a", Some("a"), [("abc", 2)]).unwrap(),
        ]);

        let parsed = filter.parse("abc xyz").unwrap();
        assert_eq!(parsed.value("x"), Some(&ClauseValue::Int(1)));
        assert_eq!(parsed.to_query_args(), "x=1&a=2");
    }

    #[test]
    fn test_table_mismatch_aborts_parse() {
        // scans for "tie" but has no value for it
        let result_clause = ClauseDescriptor::choice("result", Some("result"), [("draw", 1)])
            .unwrap()
            .with_scan_pattern("draw|tie");
        let filter = MatchFilter::new([
            ClauseDescriptor::choice("win", Some("win"), [("wins?", 1)]).unwrap(),
            result_clause,
            ClauseDescriptor::counted_span("date", Some("date")).unwrap(),
        ]);

        assert_eq!(filter.parse("draw").unwrap().to_query_args(), "result=1");

        match filter.parse("wins tie last week") {
            Err(err @ FilterError::GrammarTableMismatch { .. }) => {
                assert!(err.is_internal());
                match err {
                    FilterError::GrammarTableMismatch { label, matched } => {
                        assert_eq!(label, "result");
                        assert_eq!(matched, "tie");
                    }
                    _ => unreachable!(),
                }
            }
            Err(other) => panic!("expected GrammarTableMismatch, got {:?}", other),
            Ok(parsed) => panic!("expected an error, got {:?}", parsed.summary()),
        }
    }

    #[test]
    fn test_filter_records() {
        let parsed = small_filter().parse("party").unwrap();
        let records = vec![
            record(json!({ "match_id": 1, "party": true })),
            record(json!({ "match_id": 2, "party": false })),
            record(json!({ "match_id": 3 })),
        ];

        let kept = parsed.filter_records(records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0]["match_id"], json!(1));

        let predicate = parsed.predicate();
        assert!(predicate(&record(json!({ "party": 1 }))));
    }

    #[test]
    fn test_add_constant() {
        let mut parsed = small_filter().parse("wins").unwrap();
        parsed.add_constant("hero_id", 74);
        let parsed = parsed.with_constant("limit", 20);

        assert_eq!(parsed.to_query_args(), "win=1&hero_id=74&limit=20");
        assert_eq!(parsed.value("hero_id"), Some(&ClauseValue::Int(74)));
    }

    #[test]
    fn test_constant_in_schema_not_scanned() {
        let filter = small_filter().clause(ClauseDescriptor::constant("significant", 0));
        let parsed = filter.parse("").unwrap();
        assert_eq!(parsed.to_query_args(), "significant=0");

        let result = filter.parse("significant");
        assert!(matches!(
            result,
            Err(FilterError::UnrecognizedResidue { .. })
        ));
    }

    #[test]
    fn test_filter_reused_across_parses() {
        let filter = small_filter();
        let first = filter.parse("wins").unwrap();
        let second = filter.parse("loss").unwrap();

        assert_eq!(first.to_query_args(), "win=1");
        assert_eq!(second.to_query_args(), "win=0");
    }

    #[test]
    fn test_parse_across_threads() {
        let filter = Arc::new(small_filter());
        let handles: Vec<_> = ["wins", "loss", "party", "3 days"]
            .into_iter()
            .map(|input| {
                let filter = Arc::clone(&filter);
                std::thread::spawn(move || filter.parse(input).unwrap().to_query_args())
            })
            .collect();

        let results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, vec!["win=1", "win=0", "", "date=3"]);
    }

    #[test]
    fn test_summary() {
        let parsed = small_filter().parse("wins").unwrap();
        let summary = parsed.summary();
        assert_eq!(summary[0].label, "win");
        assert_eq!(summary[0].value, Some(ClauseValue::Int(1)));
        assert_eq!(summary[1].server_name, None);
    }
}

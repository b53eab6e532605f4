//! Clause descriptors
//!
//! A descriptor describes one recognizable clause of filter text: the phrases
//! that express it, how a matched phrase turns into a value, which query
//! parameter (if any) receives that value, and an optional post-filter for
//! conditions the server cannot evaluate.
//!
//! Descriptors are immutable once built. Resolved values live in
//! [`ResolvedClause`](crate::filter::ResolvedClause)s produced per parse, never
//! on the descriptor itself.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::filter::error::{FilterError, FilterResult};
use crate::filter::matcher::ClauseSet;
use crate::filter::record::MatchRecord;
use crate::filter::scanner::{build_exact_pattern, build_pattern};
use crate::filter::span::{span_pattern, SpanGrammar};

/// A resolved clause value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClauseValue {
    Int(i64),
    Bool(bool),
    Text(String),
}

impl ClauseValue {
    /// Compare against a JSON field of a result record
    pub fn matches_json(&self, value: &serde_json::Value) -> bool {
        match (self, value) {
            (Self::Int(expected), serde_json::Value::Number(n)) => n.as_i64() == Some(*expected),
            (Self::Bool(expected), serde_json::Value::Bool(b)) => b == expected,
            (Self::Bool(expected), serde_json::Value::Number(n)) => {
                n.as_i64() == Some(i64::from(*expected))
            }
            (Self::Text(expected), serde_json::Value::String(s)) => s == expected,
            _ => false,
        }
    }
}

impl fmt::Display for ClauseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ClauseValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for ClauseValue {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<bool> for ClauseValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for ClauseValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ClauseValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Predicate over all resolved clauses and one result record
pub type PostFilter = Arc<dyn Fn(&ClauseSet<'_>, &MatchRecord) -> bool + Send + Sync>;

/// One phrase of a choice clause
#[derive(Debug, Clone)]
pub struct Alternative {
    source: String,
    exact: Regex,
    value: ClauseValue,
}

impl Alternative {
    /// The phrase pattern as written
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The value this phrase resolves to
    pub fn value(&self) -> &ClauseValue {
        &self.value
    }
}

/// How a descriptor turns text into a value
#[derive(Debug, Clone)]
pub enum ClauseGrammar {
    /// Literal phrases, each mapped to a fixed value. Order matters: the first
    /// phrase that matches wins.
    Choice(Vec<Alternative>),
    /// "N units" duration phrases, resolved to days
    CountedSpan(SpanGrammar),
    /// Pre-resolved value that is never scanned for
    Constant(ClauseValue),
}

/// One recognizable clause of filter text
#[derive(Clone)]
pub struct ClauseDescriptor {
    label: String,
    server_name: Option<String>,
    grammar: ClauseGrammar,
    pattern: Option<Regex>,
    post_filter: Option<PostFilter>,
}

impl ClauseDescriptor {
    /// Create a choice clause from `(phrase pattern, value)` pairs
    pub fn choice<I, P, V>(label: &str, server_name: Option<&str>, alternatives: I) -> FilterResult<Self>
    where
        I: IntoIterator<Item = (P, V)>,
        P: Into<String>,
        V: Into<ClauseValue>,
    {
        let invalid = |source| FilterError::InvalidPattern {
            label: label.to_string(),
            source,
        };

        let alternatives = alternatives
            .into_iter()
            .map(|(source, value)| {
                let source: String = source.into();
                let exact = build_exact_pattern(&source).map_err(invalid)?;
                Ok(Alternative {
                    source,
                    exact,
                    value: value.into(),
                })
            })
            .collect::<FilterResult<Vec<_>>>()?;

        let pattern = if alternatives.is_empty() {
            None
        } else {
            let alternation = alternatives
                .iter()
                .map(|a| format!("(?:{})", a.source))
                .collect::<Vec<_>>()
                .join("|");
            Some(build_pattern(&alternation).map_err(invalid)?)
        };

        Ok(Self {
            label: label.to_string(),
            server_name: server_name.map(str::to_string),
            grammar: ClauseGrammar::Choice(alternatives),
            pattern,
            post_filter: None,
        })
    }

    /// Create a counted time span clause, resolved to days
    pub fn counted_span(label: &str, server_name: Option<&str>) -> FilterResult<Self> {
        let invalid = |source| FilterError::InvalidPattern {
            label: label.to_string(),
            source,
        };

        let grammar = SpanGrammar::new().map_err(invalid)?;
        let pattern = build_pattern(&span_pattern()).map_err(invalid)?;

        Ok(Self {
            label: label.to_string(),
            server_name: server_name.map(str::to_string),
            grammar: ClauseGrammar::CountedSpan(grammar),
            pattern: Some(pattern),
            post_filter: None,
        })
    }

    /// Create a constant clause. Its label is the server name.
    pub fn constant(server_name: &str, value: impl Into<ClauseValue>) -> Self {
        Self {
            label: server_name.to_string(),
            server_name: Some(server_name.to_string()),
            grammar: ClauseGrammar::Constant(value.into()),
            pattern: None,
            post_filter: None,
        }
    }

    /// Attach a post-filter
    pub fn with_post_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&ClauseSet<'_>, &MatchRecord) -> bool + Send + Sync + 'static,
    {
        self.post_filter = Some(Arc::new(filter));
        self
    }

    /// Replace the scan pattern, leaving the value table alone
    #[cfg(test)]
    pub(crate) fn with_scan_pattern(mut self, alternation: &str) -> Self {
        self.pattern = Some(build_pattern(alternation).unwrap());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Query parameter name, or `None` for post-filter-only clauses
    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    pub fn grammar(&self) -> &ClauseGrammar {
        &self.grammar
    }

    /// Compiled scan pattern. Constants have none.
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub fn post_filter(&self) -> Option<&PostFilter> {
        self.post_filter.as_ref()
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.grammar, ClauseGrammar::Constant(_))
    }

    /// The value of a constant clause
    pub fn constant_value(&self) -> Option<&ClauseValue> {
        match &self.grammar {
            ClauseGrammar::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Turn a phrase extracted with [`pattern`](Self::pattern) into a value
    pub fn resolve(&self, matched: &str) -> FilterResult<ClauseValue> {
        match &self.grammar {
            ClauseGrammar::Choice(alternatives) => alternatives
                .iter()
                .find(|a| a.exact.is_match(matched))
                .map(|a| a.value.clone())
                .ok_or_else(|| FilterError::GrammarTableMismatch {
                    label: self.label.clone(),
                    matched: matched.to_string(),
                }),
            ClauseGrammar::CountedSpan(grammar) => grammar
                .resolve(&self.label, matched)
                .map(|span| ClauseValue::Int(span.days)),
            ClauseGrammar::Constant(value) => Ok(value.clone()),
        }
    }
}

impl fmt::Debug for ClauseDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClauseDescriptor")
            .field("label", &self.label)
            .field("server_name", &self.server_name)
            .field("grammar", &self.grammar)
            .field("post_filter", &self.post_filter.is_some())
            .finish()
    }
}

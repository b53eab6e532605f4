//! Filter error types
//!
//! Defines all error conditions that can occur while building or parsing a match filter.

use thiserror::Error;

/// Errors that can occur during filter operations
#[derive(Error, Debug, Clone)]
pub enum FilterError {
    /// Text was left over after every clause had its turn
    #[error("I don't know what you mean by \"{residue}\"")]
    UnrecognizedResidue { residue: String },

    /// A clause pattern matched text that its own value table cannot resolve.
    ///
    /// This is a bug in the clause definition, not bad user input.
    #[error("Clause '{label}' matched \"{matched}\" but has no value for it")]
    GrammarTableMismatch { label: String, matched: String },

    /// A counted time span is too large to express in days.
    ///
    /// Bad user input like residue, not a fault in the clause definitions.
    #[error("Time span of {count} {unit}s is too large")]
    SpanOutOfRange { count: String, unit: String },

    /// A clause pattern failed to compile
    #[error("Invalid pattern for clause '{label}': {source}")]
    InvalidPattern {
        label: String,
        #[source]
        source: regex::Error,
    },
}

impl FilterError {
    /// True for faults in the clause definitions themselves.
    ///
    /// These should be surfaced loudly instead of being shown to the user as a
    /// "try again" message.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            FilterError::GrammarTableMismatch { .. } | FilterError::InvalidPattern { .. }
        )
    }
}

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

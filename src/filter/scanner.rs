//! Text scanner
//!
//! Consumes recognized phrases out of a free-text filter, one pattern at a time.
//! Whatever the scanner still holds once every clause has had its turn is the
//! unrecognized residue.

use regex::{Regex, RegexBuilder};

/// Trim and collapse every whitespace run to a single space
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compile an alternation into a word-bounded, case-insensitive search pattern
pub fn build_pattern(alternation: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!(r"\b(?:{})\b", alternation))
        .case_insensitive(true)
        .build()
}

/// Compile an alternation so that it only matches a whole string
pub(crate) fn build_exact_pattern(alternation: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!(r"^(?:{})$", alternation))
        .case_insensitive(true)
        .build()
}

/// Remove the leftmost match of `pattern` from `text`.
///
/// Returns the normalized remainder and the matched phrase exactly as it
/// appeared, surrounding spaces included. When nothing matches, the remainder
/// is `text` unchanged.
pub fn take_first_from(text: &str, pattern: &Regex) -> (String, Option<String>) {
    let Some(found) = pattern.find(text) else {
        return (text.to_string(), None);
    };

    let mut rest = String::with_capacity(text.len());
    rest.push_str(&text[..found.start()]);
    rest.push(' ');
    rest.push_str(&text[found.end()..]);

    (normalize(&rest), Some(found.as_str().to_string()))
}

/// Per-parse text cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scanner {
    remaining: String,
}

impl Scanner {
    /// Start scanning `input`
    pub fn new(input: &str) -> Self {
        Self {
            remaining: normalize(input),
        }
    }

    /// Text not yet consumed
    pub fn remaining(&self) -> &str {
        &self.remaining
    }

    /// True once every word has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Take the leftmost match of `pattern` out of the remaining text
    pub fn take_first(&mut self, pattern: &Regex) -> Option<String> {
        let (rest, matched) = take_first_from(&self.remaining, pattern);
        if matched.is_some() {
            self.remaining = rest;
        }
        matched
    }

    /// Consume the scanner, returning whatever was left
    pub fn into_remaining(self) -> String {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  wins \t on\n\nradiant  "), "wins on radiant");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        let cases = [
            "",
            "  ",
            " a  b ",
            "wins on radiant",
            "\t\tx\ny  z\r\n",
            "\r\n\r\n",
            "mid\u{a0}lane",
            "\u{3000}ranked\u{3000}\u{3000}wins\u{3000}",
            " \t\r\n\u{a0}\u{3000} ",
            "a\u{2003}b\u{2009}\u{2009}c",
            "last\t \t2\n\n weeks",
            "x",
        ];

        for s in cases {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "input: {:?}", s);
            assert!(!once.contains("  "));
            assert_eq!(once.trim(), once);
        }

        assert_eq!(normalize("mid\u{a0}lane"), "mid lane");
        assert_eq!(normalize(" \t\r\n\u{a0}\u{3000} "), "");
    }

    #[test]
    fn test_word_boundary() {
        let pattern = build_pattern("win").unwrap();
        let mut scanner = Scanner::new("windy day");

        assert_eq!(scanner.take_first(&pattern), None);
        assert_eq!(scanner.remaining(), "windy day");
    }

    #[test]
    fn test_take_first_case_insensitive() {
        let pattern = build_pattern("wins?|won").unwrap();
        let mut scanner = Scanner::new("Ranked WINS mid");

        assert_eq!(scanner.take_first(&pattern), Some("WINS".to_string()));
        assert_eq!(scanner.remaining(), "Ranked mid");
    }

    #[test]
    fn test_take_first_leftmost_only() {
        let pattern = build_pattern("loss|wins?").unwrap();
        let mut scanner = Scanner::new("loss and win");

        assert_eq!(scanner.take_first(&pattern), Some("loss".to_string()));
        assert_eq!(scanner.remaining(), "and win");

        assert_eq!(scanner.take_first(&pattern), Some("win".to_string()));
        assert_eq!(scanner.remaining(), "and");
    }

    #[test]
    fn test_take_first_consumes_once() {
        let pattern = build_pattern("ranked").unwrap();
        let mut scanner = Scanner::new("ranked mid");

        assert!(scanner.take_first(&pattern).is_some());
        assert!(!pattern.is_match(scanner.remaining()));
        assert_eq!(scanner.take_first(&pattern), None);
    }

    #[test]
    fn test_take_first_renormalizes_middle() {
        let pattern = build_pattern("on radiant").unwrap();
        let mut scanner = Scanner::new("wins on radiant last week");

        assert_eq!(scanner.take_first(&pattern), Some("on radiant".to_string()));
        assert_eq!(scanner.remaining(), "wins last week");
    }

    #[test]
    fn test_take_first_from_is_pure() {
        let pattern = build_pattern("mid").unwrap();
        let text = "mid lane";

        let (rest, matched) = take_first_from(text, &pattern);
        assert_eq!(rest, "lane");
        assert_eq!(matched.as_deref(), Some("mid"));
        assert_eq!(text, "mid lane");

        let (rest, matched) = take_first_from("safe lane", &pattern);
        assert_eq!(rest, "safe lane");
        assert!(matched.is_none());
    }

    #[test]
    fn test_take_first_keeps_surrounding_space() {
        let pattern = build_pattern(" ?radiant").unwrap();
        let mut scanner = Scanner::new("wins radiant");

        assert_eq!(scanner.take_first(&pattern), Some(" radiant".to_string()));
        assert_eq!(scanner.remaining(), "wins");

        let (rest, matched) = take_first_from("abc xyz", &build_pattern(" xyz").unwrap());
        assert_eq!(rest, "abc");
        assert_eq!(matched.as_deref(), Some(" xyz"));
    }

    #[test]
    fn test_exhausted() {
        let pattern = build_pattern("roam(ing)?").unwrap();
        let mut scanner = Scanner::new("  roaming ");

        assert!(!scanner.is_exhausted());
        scanner.take_first(&pattern);
        assert!(scanner.is_exhausted());
        assert_eq!(scanner.into_remaining(), "");
    }

    #[test]
    fn test_exact_pattern() {
        let exact = build_exact_pattern("ranked").unwrap();
        assert!(exact.is_match("RANKED"));
        assert!(!exact.is_match("unranked"));
    }
}

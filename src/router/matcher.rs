//! Compiled number patterns shared by translation rules and routes.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::sync::Arc;

/// A compiled number pattern.
///
/// Matching is case-sensitive and unanchored: the pattern may match anywhere
/// in the number unless it carries its own `^`/`$` anchors.
#[derive(Clone)]
pub struct Pattern {
    regex: Arc<Regex>,
}

impl std::fmt::Debug for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Pattern").field(&self.regex.as_str()).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl Pattern {
    /// Compile a pattern.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Arc::new(Regex::new(pattern)?),
        })
    }

    /// Check if the number matches.
    pub fn matches(&self, number: &str) -> bool {
        self.regex.is_match(number)
    }

    /// Substitute every match of the pattern in `number` with `template`.
    ///
    /// Returns `None` when the pattern does not match.
    pub fn substitute<'a>(&self, number: &'a str, template: &str) -> Option<Cow<'a, str>> {
        if !self.regex.is_match(number) {
            return None;
        }
        Some(self.regex.replace_all(number, template))
    }

    /// Source text of the pattern.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

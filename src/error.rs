//! Resolution errors.

use std::fmt;

use thiserror::Error;

use crate::directory::DirectoryError;

/// Which kind of record carried a pattern that failed to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Dial plan translation rule
    TranslationRule,
    /// Voice route
    Route,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::TranslationRule => f.write_str("translation rule"),
            PatternKind::Route => f.write_str("route"),
        }
    }
}

/// Errors surfaced by a resolution request.
///
/// A call with no matching route is not an error; see
/// [`ResolutionResult::NoRouteFound`](crate::router::ResolutionResult::NoRouteFound).
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("invalid pattern in {kind} '{name}': {pattern}")]
    InvalidPattern {
        kind: PatternKind,
        name: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("subscriber not found: {0}")]
    SubscriberNotFound(String),

    #[error("routing policy not found: {0}")]
    PolicyNotFound(String),

    #[error("dial plan not found: {0}")]
    DialPlanNotFound(String),

    #[error("routing policy '{policy}' lists usage '{usage}' more than once")]
    DuplicateUsage { policy: String, usage: String },

    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError),
}

impl RoutingError {
    /// Whether this error points at bad catalog data rather than a lookup miss.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            RoutingError::InvalidPattern { .. } | RoutingError::DuplicateUsage { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pattern_display() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = RoutingError::InvalidPattern {
            kind: PatternKind::Route,
            name: "intl".to_string(),
            pattern: "(".to_string(),
            source,
        };
        let msg = err.to_string();
        assert!(msg.contains("route 'intl'"));
        assert!(msg.contains("("));
        assert!(err.is_data_error());
    }

    #[test]
    fn test_lookup_errors_are_not_data_errors() {
        let err = RoutingError::SubscriberNotFound("alice@example.com".to_string());
        assert!(err.to_string().contains("alice@example.com"));
        assert!(!err.is_data_error());
    }
}

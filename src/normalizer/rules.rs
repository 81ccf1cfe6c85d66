//! Dial plan translation rules.

use serde::Serialize;

use tracing::{debug, trace};

use crate::config::{DialPlanConfig, TranslationRuleConfig};
use crate::error::{PatternKind, RoutingError};
use crate::router::Pattern;

/// A compiled translation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationRule {
    /// Rule name
    pub name: String,
    /// Pattern matched against the dialed number
    pub pattern: Pattern,
    /// Replacement template
    pub replacement: String,
    /// Position in the dial plan
    pub order: usize,
}

impl TranslationRule {
    /// Compile a rule at the given position.
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        replacement: impl Into<String>,
        order: usize,
    ) -> Result<Self, RoutingError> {
        let name = name.into();
        let pattern = Pattern::new(pattern).map_err(|source| RoutingError::InvalidPattern {
            kind: PatternKind::TranslationRule,
            name: name.clone(),
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            name,
            pattern,
            replacement: replacement.into(),
            order,
        })
    }

    /// Compile a rule record; unnamed rules are named after their position.
    pub fn compile(config: &TranslationRuleConfig, order: usize) -> Result<Self, RoutingError> {
        let name = config
            .name
            .clone()
            .unwrap_or_else(|| format!("rule-{}", order));
        Self::new(name, &config.pattern, config.translation.clone(), order)
    }

    /// Apply the rule; `None` if the pattern does not match.
    pub fn apply(&self, number: &str) -> Option<String> {
        self.pattern
            .substitute(number, &self.replacement)
            .map(|s| s.into_owned())
    }
}

/// An ordered set of translation rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DialPlan {
    /// Dial plan name
    pub name: String,
    rules: Vec<TranslationRule>,
}

impl DialPlan {
    /// An empty plan: every number passes through unchanged.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Build a plan from `(name, pattern, replacement)` triples, in order.
    pub fn from_rules<'a, I>(name: impl Into<String>, rules: I) -> Result<Self, RoutingError>
    where
        I: IntoIterator<Item = (&'a str, &'a str, &'a str)>,
    {
        let rules = rules
            .into_iter()
            .enumerate()
            .map(|(order, (name, pattern, replacement))| {
                TranslationRule::new(name, pattern, replacement, order)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.into(),
            rules,
        })
    }

    /// Compile a dial plan record.
    pub fn compile(config: &DialPlanConfig) -> Result<Self, RoutingError> {
        let rules = config
            .rules
            .iter()
            .enumerate()
            .map(|(order, rule)| TranslationRule::compile(rule, order))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(plan = %config.name, rules = rules.len(), "dial plan compiled");

        Ok(Self {
            name: config.name.clone(),
            rules,
        })
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[TranslationRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Result of normalizing a dialed number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Normalization {
    /// Normalized number
    pub normalized: String,
    /// Rule that produced it, if any
    pub matched_rule: Option<TranslationRule>,
}

/// Normalize a dialed number.
///
/// The first rule (in plan order) whose pattern matches is applied and
/// evaluation stops. With no match the number is returned unchanged.
pub fn normalize(raw: &str, plan: &DialPlan) -> Normalization {
    for rule in plan.rules() {
        if let Some(normalized) = rule.apply(raw) {
            trace!(
                plan = %plan.name,
                rule = %rule.name,
                raw,
                normalized = %normalized,
                "translation rule matched"
            );
            return Normalization {
                normalized,
                matched_rule: Some(rule.clone()),
            };
        }
    }

    trace!(plan = %plan.name, raw, "no translation rule matched");

    Normalization {
        normalized: raw.to_string(),
        matched_rule: None,
    }
}

/// Compile rule records and normalize in one step.
pub fn normalize_records(
    raw: &str,
    rules: &[TranslationRuleConfig],
) -> Result<Normalization, RoutingError> {
    let plan = DialPlan::compile(&DialPlanConfig {
        name: String::new(),
        rules: rules.to_vec(),
    })?;
    Ok(normalize(raw, &plan))
}

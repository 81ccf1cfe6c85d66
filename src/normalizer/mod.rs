//! Dialed number normalization.
//!
//! Applies a dial plan's translation rules, in order, to a raw dialed number.
//! Only the first matching rule is applied.

mod rules;

pub use rules::{normalize, normalize_records, DialPlan, Normalization, TranslationRule};

//! Detection rules for remote change monitors.
mod rules;

pub use rules::{DetectionRule, DetectionRules, RuleSource};

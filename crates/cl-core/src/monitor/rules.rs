use std::fmt::{Display, Formatter};

use crate::config::ExtraRuleConfig;

/// Which family of log signature a rule targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSource {
    /// OEM clipboard services with their own log tags.
    Vendor,
    /// AOSP clipboard service lines.
    Generic,
    /// The companion app's own "clipboard changed" confirmation.
    Companion,
    /// Added through configuration.
    Custom,
}

impl Display for RuleSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RuleSource::Vendor => "vendor",
            RuleSource::Generic => "generic",
            RuleSource::Companion => "companion",
            RuleSource::Custom => "custom",
        };
        f.write_str(label)
    }
}

/// A line matches when it contains every pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionRule {
    pub name: String,
    pub source: RuleSource,
    pub patterns: Vec<String>,
}

impl DetectionRule {
    pub fn new<I, S>(name: impl Into<String>, source: RuleSource, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            source,
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, line: &str) -> bool {
        !self.patterns.is_empty() && self.patterns.iter().all(|p| line.contains(p.as_str()))
    }
}

/// Ordered rule table evaluated against every event-stream line.
///
/// First match wins; a line produces at most one notification no matter how
/// many rules it satisfies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionRules {
    rules: Vec<DetectionRule>,
}

impl Default for DetectionRules {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DetectionRules {
    pub fn new(rules: Vec<DetectionRule>) -> Self {
        Self { rules }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            DetectionRule::new(
                "samsung.clipboard_ex",
                RuleSource::Vendor,
                ["ClipboardServiceEx", "setPrimaryClip"],
            ),
            DetectionRule::new(
                "samsung.sem_clipboard",
                RuleSource::Vendor,
                ["SemClipboardManager", "addClip"],
            ),
            DetectionRule::new(
                "xiaomi.miui_clipboard",
                RuleSource::Vendor,
                ["MiuiClipboardManager", "setPrimaryClip"],
            ),
            DetectionRule::new(
                "aosp.set_primary_clip",
                RuleSource::Generic,
                ["ClipboardService", "setPrimaryClip"],
            ),
            DetectionRule::new(
                "aosp.primary_clip_changed",
                RuleSource::Generic,
                ["onPrimaryClipChanged"],
            ),
            DetectionRule::new(
                "companion.clipboard_changed",
                RuleSource::Companion,
                ["ClipboardMonitor", "Clipboard changed"],
            ),
        ])
    }

    /// Built-in rules followed by the configured ones. Entries with no
    /// patterns are dropped since they would match nothing.
    pub fn with_extra(mut self, extra: &[ExtraRuleConfig]) -> Self {
        self.rules.extend(
            extra
                .iter()
                .filter(|rule| !rule.contains.is_empty())
                .map(|rule| {
                    DetectionRule::new(rule.name.clone(), RuleSource::Custom, rule.contains.clone())
                }),
        );
        self
    }

    pub fn match_line(&self, line: &str) -> Option<&DetectionRule> {
        self.rules.iter().find(|rule| rule.matches(line))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetectionRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn companion_confirmation_matches() {
        let rules = DetectionRules::builtin();
        let line = "D/ClipboardMonitor( 4121): Clipboard changed: hello";
        let rule = rules.match_line(line).expect("rule");
        assert_eq!(rule.name, "companion.clipboard_changed");
        assert_eq!(rule.source, RuleSource::Companion);
    }

    #[test]
    fn vendor_rule_wins_over_generic_for_same_line() {
        let rules = DetectionRules::builtin();
        let line = "I/ClipboardServiceEx( 1200): setPrimaryClip pkg=com.android.chrome";
        assert_eq!(rules.match_line(line).unwrap().source, RuleSource::Vendor);
    }

    #[test]
    fn generic_rule_needs_every_pattern() {
        let rules = DetectionRules::builtin();
        assert!(rules
            .match_line("W/ClipboardService( 900): Denying clipboard access")
            .is_none());
        assert_eq!(
            rules
                .match_line("D/ClipboardService( 900): setPrimaryClip uid=10123")
                .unwrap()
                .name,
            "aosp.set_primary_clip"
        );
    }

    #[test]
    fn unrelated_lines_do_not_match() {
        let rules = DetectionRules::builtin();
        assert!(rules.match_line("I/ActivityManager( 900): Start proc").is_none());
        assert!(rules
            .match_line("I/ClipboardReadActivity( 77): Clipboard text found: hi")
            .is_none());
    }

    #[test]
    fn extra_rules_are_appended_and_empty_ones_skipped() {
        let rules = DetectionRules::builtin().with_extra(&[
            ExtraRuleConfig {
                name: "oem.clip".into(),
                contains: vec!["OemClip".into(), "copied".into()],
            },
            ExtraRuleConfig {
                name: "empty".into(),
                contains: vec![],
            },
        ]);

        assert_eq!(rules.len(), DetectionRules::builtin().len() + 1);
        let rule = rules.match_line("I/OemClip: text copied").unwrap();
        assert_eq!(rule.name, "oem.clip");
        assert_eq!(rule.source, RuleSource::Custom);
    }
}

//! Line-based resolution rules.
//!
//! Each rule pairs a line predicate (is this line worth looking at?) with an
//! extractor (what name does it yield?). Rules belong to a tier, identified
//! by [`Provenance`], and carry a priority within that tier. A [`RuleSet`]
//! keeps its rules sorted by `(tier, priority)` so the resolver can walk
//! them tier by tier.

use crate::consts;
use crate::models::Provenance;

pub type Predicate = fn(&str) -> bool;
pub type Extractor = fn(&str) -> Option<String>;

/// One heuristic applied to a single trimmed, non-empty line.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub provenance: Provenance,
    /// Lower runs first within a tier.
    pub priority: u8,
    pub predicate: Predicate,
    pub extractor: Extractor,
}
impl Rule {
    pub fn apply(&self, line: &str) -> Option<String> {
        if !(self.predicate)(line) {
            return None;
        }
        (self.extractor)(line).filter(|name| !name.trim().is_empty())
    }
}

/// Rules sorted by tier, then priority.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}
impl RuleSet {
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Self {
        let mut rules: Vec<_> = rules.into_iter().collect();
        // Stable: rules sharing a tier and priority keep insertion order.
        rules.sort_by_key(|rule| (rule.provenance, rule.priority));
        Self { rules }
    }

    /// Rules grouped per tier, tiers in resolution order.
    pub fn tiers(&self) -> impl Iterator<Item = &[Rule]> {
        self.rules.chunk_by(|a, b| a.provenance == b.provenance)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
impl Default for RuleSet {
    fn default() -> Self {
        Self::new([
            Rule {
                name: "single-capitalized-word",
                provenance: Provenance::Pattern,
                priority: 0,
                predicate: plausible_name_line,
                extractor: |line| consts::SINGLE_WORD_REGEX.is_match(line).then(|| line.to_string()),
            },
            Rule {
                name: "two-capitalized-words",
                provenance: Provenance::Pattern,
                priority: 1,
                predicate: plausible_name_line,
                extractor: |line| consts::TWO_WORDS_REGEX.is_match(line).then(|| line.to_string()),
            },
            Rule {
                name: "hyphenated-capitalized",
                provenance: Provenance::Pattern,
                priority: 2,
                predicate: plausible_name_line,
                extractor: |line| consts::HYPHENATED_REGEX.is_match(line).then(|| line.to_string()),
            },
            Rule {
                name: "first-token",
                provenance: Provenance::FallbackToken,
                priority: 0,
                predicate: plausible_fallback_line,
                extractor: |line| line.split_whitespace().next().map(str::to_string),
            },
        ])
    }
}

fn char_len(line: &str) -> usize {
    line.chars().count()
}

/// Skips numbers, hit points, and lines too short or long to be a name.
pub fn plausible_name_line(line: &str) -> bool {
    !consts::LEADING_DIGIT_REGEX.is_match(line)
        && !consts::HIT_POINTS_REGEX.is_match(line)
        && consts::PATTERN_LINE_LENGTH.contains(&char_len(line))
}

pub fn plausible_fallback_line(line: &str) -> bool {
    consts::FALLBACK_LINE_LENGTH.contains(&char_len(line))
        && line.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Onix", true)]
    #[case("Mr Mime", true)]
    #[case("90 HP", false)]
    #[case("HP 120", false)]
    #[case("Shp", false)]
    #[case("4 Energy", false)]
    #[case("Ab", false)]
    #[case("An extremely long line of flavour text", false)]
    fn name_line_filter(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(plausible_name_line(line), expected);
    }

    #[rstest]
    #[case("basic pokemon", true)]
    #[case("-- dashes", false)]
    #[case("12 damage", false)]
    #[case("ab", false)]
    #[case("a line that is much too long", false)]
    fn fallback_line_filter(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(plausible_fallback_line(line), expected);
    }

    #[test]
    fn default_rules_are_grouped_by_tier() {
        let rules = RuleSet::default();
        let tiers: Vec<_> = rules.tiers().map(|tier| (tier[0].provenance, tier.len())).collect();
        assert_eq!(tiers, vec![(Provenance::Pattern, 3), (Provenance::FallbackToken, 1)]);
    }

    #[test]
    fn rules_sort_by_priority_within_tier() {
        let noop: Extractor = |_| None;
        let rules = RuleSet::new([
            Rule { name: "late", provenance: Provenance::Pattern, priority: 9, predicate: |_| true, extractor: noop },
            Rule {
                name: "fallback",
                provenance: Provenance::FallbackToken,
                priority: 0,
                predicate: |_| true,
                extractor: noop,
            },
            Rule { name: "early", provenance: Provenance::Pattern, priority: 1, predicate: |_| true, extractor: noop },
        ]);
        let names: Vec<_> = rules.tiers().flatten().map(|rule| rule.name).collect();
        assert_eq!(names, vec!["early", "late", "fallback"]);
    }

    #[rstest]
    #[case("Ho-Oh", Some("Ho-Oh"))]
    #[case("Porygon-Z", Some("Porygon-Z"))]
    #[case("Nidoran", Some("Nidoran"))]
    #[case("ONIX", None)]
    fn hyphenated_rule(#[case] line: &str, #[case] expected: Option<&str>) {
        let rules = RuleSet::default();
        let rule = rules.tiers().flatten().find(|rule| rule.name == "hyphenated-capitalized").unwrap();
        assert_eq!(rule.apply(line).as_deref(), expected);
    }
}

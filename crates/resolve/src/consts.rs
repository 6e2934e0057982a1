use regex::Regex;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

/// Line lengths (in characters) considered by the shape patterns.
pub(crate) const PATTERN_LINE_LENGTH: RangeInclusive<usize> = 3..=25;
/// Line lengths (in characters) considered by the first-token fallback.
pub(crate) const FALLBACK_LINE_LENGTH: RangeInclusive<usize> = 3..=20;

// Card furniture that is never a name: hit-point lines ("60 HP", "HP 120").
regex!(HIT_POINTS_REGEX, r"(?i)hp");
regex!(LEADING_DIGIT_REGEX, r"^[0-9]");
// Name shapes, highest priority first.
regex!(SINGLE_WORD_REGEX, r"^[A-Z][a-z]+$");
regex!(TWO_WORDS_REGEX, r"^[A-Z][a-z]+ [A-Z][a-z]+$");
regex!(HYPHENATED_REGEX, r"^[A-Z][a-z]+-?[A-Z]?[a-z]*$");

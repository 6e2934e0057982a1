use std::fmt::{Display, Formatter, Result as FmtResult};

/// Which resolution tier produced a [`Candidate`].
///
/// Variants are ordered by tier: earlier tiers are tried first and compare
/// as smaller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Provenance {
    /// Matched an entry of the known-name list.
    KnownList,
    /// A whole line matched one of the name shape patterns.
    Pattern,
    /// First token of the first plausible line.
    FallbackToken,
}
impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::KnownList => "known-list",
            Provenance::Pattern => "pattern",
            Provenance::FallbackToken => "fallback-token",
        }
    }
}
impl Display for Provenance {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved card name, tagged with the tier that produced it.
///
/// Never empty: construction from an empty or whitespace-only name fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    name: String,
    provenance: Provenance,
}
impl Candidate {
    pub fn new(name: impl Into<String>, provenance: Provenance) -> Option<Self> {
        let name = name.into();
        match name.trim().is_empty() {
            true => None,
            false => Some(Self { name, provenance }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn into_name(self) -> String {
        self.name
    }
}
impl AsRef<str> for Candidate {
    fn as_ref(&self) -> &str {
        &self.name
    }
}
impl Display for Candidate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_candidates_are_rejected() {
        assert!(Candidate::new("", Provenance::Pattern).is_none());
        assert!(Candidate::new("  \t", Provenance::FallbackToken).is_none());
        assert_eq!(Candidate::new("Onix", Provenance::Pattern).unwrap().name(), "Onix");
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(Provenance::KnownList < Provenance::Pattern);
        assert!(Provenance::Pattern < Provenance::FallbackToken);
        assert_eq!(Provenance::FallbackToken.to_string(), "fallback-token");
    }
}

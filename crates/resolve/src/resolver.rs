//! Tiered card name resolution.

use crate::error::{ErrorKind, Result};
use crate::known::KnownNames;
use crate::models::{Candidate, Provenance};
use crate::rules::RuleSet;
use exn::OptionExt;
use tracing::instrument;

/// Turns recognised text into a single [`Candidate`] card name.
///
/// Resolution is deterministic and side-effect free. Tiers are tried in
/// order, and the first one to produce a name wins:
///
/// 1. **Known list**: the first [`KnownNames`] entry (in list order, not
///    text order) found anywhere in the lower-cased text.
/// 2. **Pattern**: the first line, in text order, matching one of the name
///    shape rules; for each line the rules are tried by priority before
///    moving on to the next line.
/// 3. **Fallback**: the first token of the first plausible line.
///
/// Empty or whitespace-only text never resolves.
#[derive(Debug, Clone)]
pub struct Resolver {
    names: KnownNames,
    rules: RuleSet,
}
impl Resolver {
    pub fn new(names: KnownNames, rules: RuleSet) -> Self {
        Self { names, rules }
    }

    /// Resolver using the builtin known-name list and default rules.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(KnownNames::builtin()?, RuleSet::default()))
    }

    pub fn names(&self) -> &KnownNames {
        &self.names
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn resolve(&self, text: &str) -> Result<Candidate> {
        if text.trim().is_empty() {
            exn::bail!(ErrorKind::NoMatch);
        }
        let candidate = self.known_name(text).or_else(|| self.line_rules(text)).ok_or_raise(|| ErrorKind::NoMatch)?;
        tracing::debug!(name = candidate.name(), provenance = %candidate.provenance(), "Resolved card name");
        Ok(candidate)
    }

    fn known_name(&self, text: &str) -> Option<Candidate> {
        let lowercase = text.to_lowercase();
        self.names.first_in(&lowercase).and_then(|name| Candidate::new(name, Provenance::KnownList))
    }

    fn line_rules(&self, text: &str) -> Option<Candidate> {
        let lines: Vec<&str> = text.split('\n').map(str::trim).filter(|line| !line.is_empty()).collect();
        for tier in self.rules.tiers() {
            for line in &lines {
                for rule in tier {
                    if let Some(name) = rule.apply(line) {
                        tracing::trace!(rule = rule.name, line, "Line rule matched");
                        return Candidate::new(name, rule.provenance);
                    }
                }
            }
        }
        None
    }
}

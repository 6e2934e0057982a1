//! Card name resolution from recognised text.
//!
//! Text coming out of a recogniser is noisy: hit points, attack names,
//! flavour text and misread characters all end up in the same blob. This
//! crate picks a single card name out of it, or reports that it couldn't.
//! See [`Resolver`] for the tiers involved.

mod consts;
pub mod error;
mod known;
pub mod models;
mod resolver;
pub mod rules;

use crate::error::Result;
pub use crate::known::KnownNames;
use crate::models::Candidate;
pub use crate::resolver::Resolver;
pub use crate::rules::{Rule, RuleSet};

/// Easy, top-level entrypoint: resolve `text` using the builtin known-name
/// list and the default rules.
///
/// # Examples
///
/// ```rust
/// use cardscan_resolve::{models::Provenance, resolve};
///
/// let candidate = resolve("Pikachu\n60 HP\nBasic").unwrap();
/// assert_eq!(candidate.name(), "Pikachu");
/// assert_eq!(candidate.provenance(), Provenance::KnownList);
/// ```
pub fn resolve(text: &str) -> Result<Candidate> {
    Resolver::builtin()?.resolve(text)
}

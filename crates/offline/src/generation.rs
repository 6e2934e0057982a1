use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

const VERSION_SEPARATOR: &str = "-v";

/// A cache generation tag, `<prefix>-v<version>`.
///
/// Every stored entry belongs to exactly one generation. Bumping the version
/// and installing again is how the whole offline store is invalidated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation {
    prefix: String,
    version: u32,
}
impl Generation {
    pub fn new(prefix: impl Into<String>, version: u32) -> Result<Self> {
        let prefix = prefix.into();
        let valid = !prefix.is_empty()
            && version > 0
            && prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            exn::bail!(ErrorKind::InvalidGeneration(format!("{prefix}{VERSION_SEPARATOR}{version}")));
        }
        Ok(Self { prefix, version })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// The generation that supersedes this one.
    pub fn next(&self) -> Self {
        Self { prefix: self.prefix.clone(), version: self.version.saturating_add(1) }
    }
}
impl Display for Generation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{VERSION_SEPARATOR}{}", self.prefix, self.version)
    }
}
impl FromStr for Generation {
    type Err = exn::Exn<ErrorKind>;

    fn from_str(tag: &str) -> Result<Self> {
        let (prefix, version) =
            tag.trim().rsplit_once(VERSION_SEPARATOR).ok_or_raise(|| ErrorKind::InvalidGeneration(tag.to_string()))?;
        let version: u32 = version.parse().ok().ok_or_raise(|| ErrorKind::InvalidGeneration(tag.to_string()))?;
        Self::new(prefix, version)
    }
}

//! Ordered list of known card names.
//!
//! The default list is embedded into the binary at compile time using
//! [`rust-embed`](rust_embed), and can be replaced with a user-supplied file
//! in the same format:
//!
//! - one card per line, in priority order;
//! - regional spellings of the same card on one line, separated by `|`;
//! - blank lines and lines starting with `#` are ignored.
//!
//! Every spelling is its own entry. List order is the only tie-break when
//! several known names occur in the same text.

use crate::error::{Error, ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use rust_embed::Embed;
use std::path::Path;
use std::str::FromStr;

const DEFAULT_LIST: &str = "default.txt";
const ALIAS_SEPARATOR: char = '|';
const COMMENT: char = '#';

#[derive(Embed)]
#[folder = "../../assets/names/"]
struct Builtins;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    name: String,
    lowercase: String,
    /// Index of the line (card) this spelling was declared on.
    card: usize,
}

/// An ordered, alias-aware list of known card names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownNames {
    entries: Vec<Entry>,
}
impl KnownNames {
    /// The list shipped with the binary.
    pub fn builtin() -> Result<Self> {
        let file = Builtins::get(DEFAULT_LIST)
            .ok_or_raise(|| ErrorKind::InvalidNameList(format!("builtin list `{DEFAULT_LIST}` missing")))?;
        let text = std::str::from_utf8(&file.data)
            .or_raise(|| ErrorKind::InvalidNameList(format!("builtin list `{DEFAULT_LIST}` is not UTF-8")))?;
        text.parse()
    }

    /// Load a list from a file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).or_raise(|| ErrorKind::Unreadable(path.to_path_buf()))?;
        text.parse()
    }

    /// Every spelling, in priority order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Other spellings declared for the same card as `name` (including
    /// `name` itself), in declaration order.
    pub fn aliases_of(&self, name: &str) -> Vec<&str> {
        let Some(card) = self.entries.iter().find(|e| e.name.eq_ignore_ascii_case(name)).map(|e| e.card) else {
            return Vec::new();
        };
        self.entries.iter().filter(|e| e.card == card).map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first entry, in list order, that occurs anywhere in the
    /// already lower-cased `haystack`.
    pub(crate) fn first_in(&self, haystack: &str) -> Option<&str> {
        self.entries.iter().find(|e| haystack.contains(e.lowercase.as_str())).map(|e| e.name.as_str())
    }
}
impl FromStr for KnownNames {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut entries = Vec::new();
        let lines = s.lines().map(str::trim).filter(|line| !line.is_empty() && !line.starts_with(COMMENT));
        for (card, line) in lines.enumerate() {
            for alias in line.split(ALIAS_SEPARATOR).map(str::trim) {
                if alias.is_empty() {
                    exn::bail!(ErrorKind::InvalidNameList(format!("empty alias in line `{line}`")));
                }
                entries.push(Entry {
                    name: alias.to_string(),
                    lowercase: alias.to_lowercase(),
                    card,
                });
            }
        }
        if entries.is_empty() {
            exn::bail!(ErrorKind::InvalidNameList("no names declared".to_string()));
        }
        Ok(Self { entries })
    }
}

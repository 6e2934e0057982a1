//! Catalog record model.
//!
//! Mirrors the subset of the remote payload the application reads. Every
//! field besides `id` and `name` may be missing upstream.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub set: Option<CardSet>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub images: Option<Images>,
    #[serde(default)]
    pub tcgplayer: Option<Market>,
}
impl CatalogRecord {
    /// Price entry for `tier`, if the record carries one under the tier's
    /// canonical key or any of its aliases.
    pub fn price(&self, tier: PriceTier) -> Option<&Price> {
        let prices = &self.tcgplayer.as_ref()?.prices;
        tier.keys().iter().find_map(|key| prices.get(*key))
    }

    pub fn set_name(&self) -> Option<&str> {
        self.set.as_ref().map(|set| set.name.as_str()).filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub printed_total: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Images {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}
impl Images {
    /// Large image, falling back to small.
    pub fn preferred(&self) -> Option<&str> {
        self.large.as_deref().filter(|url| !url.is_empty()).or_else(|| self.small.as_deref().filter(|url| !url.is_empty()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Keyed by the upstream tier name; unknown tiers are kept.
    #[serde(default)]
    pub prices: BTreeMap<String, Price>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub mid: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub market: Option<f64>,
}

/// The price tiers the application displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PriceTier {
    Normal,
    Holofoil,
    ReverseHolofoil,
    FirstEditionHolofoil,
    FirstEdition,
}
impl PriceTier {
    pub const ALL: [PriceTier; 5] =
        [Self::Normal, Self::Holofoil, Self::ReverseHolofoil, Self::FirstEditionHolofoil, Self::FirstEdition];

    /// Upstream keys, canonical first.
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            Self::Normal => &["normal"],
            Self::Holofoil => &["holofoil"],
            Self::ReverseHolofoil => &["reverseHolofoil"],
            Self::FirstEditionHolofoil => &["1stEditionHolofoil", "firstEditionHolofoil"],
            Self::FirstEdition => &["1stEdition", "firstEdition"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.keys()[0]
    }
}
impl Display for PriceTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// One page of search results. The offline cache substitutes an `error`
/// payload when the catalog can't be reached.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Page {
    #[serde(default)]
    pub data: Option<Vec<CatalogRecord>>,
    #[serde(default)]
    pub error: Option<String>,
}

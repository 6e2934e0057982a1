//! Human-readable rendering of catalog records.
//!
//! Absent values render as a placeholder dash. Zero prices count as absent,
//! the same as a missing price: a listed price of `0.00` is never shown.

use crate::models::{CatalogRecord, Price, PriceTier};
use std::fmt::{Display, Formatter, Result as FmtResult};

pub const PLACEHOLDER: &str = "-";
pub const UNKNOWN_SET: &str = "Unknown set";

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

/// `$x.xx`, or the placeholder for a missing, zero, or NaN value.
pub fn format_price(value: Option<f64>) -> String {
    match present(value) {
        Some(value) => format!("${value:.2}"),
        None => PLACEHOLDER.to_string(),
    }
}

/// Market price, falling back to mid.
pub fn tier_value(price: Option<&Price>) -> Option<f64> {
    let price = price?;
    present(price.market).or_else(|| present(price.mid))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRow {
    pub label: &'static str,
    pub value: String,
}

/// Everything the result view shows for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSummary {
    pub name: String,
    pub set: String,
    pub image: Option<String>,
    pub rarity: String,
    pub number: String,
    pub artist: String,
    pub prices: Vec<PriceRow>,
}
impl From<&CatalogRecord> for CardSummary {
    fn from(record: &CatalogRecord) -> Self {
        let first_edition = present(record.price(PriceTier::FirstEditionHolofoil).and_then(|p| p.market))
            .or_else(|| present(record.price(PriceTier::FirstEdition).and_then(|p| p.market)));
        let prices = vec![
            PriceRow { label: "Normal", value: format_price(tier_value(record.price(PriceTier::Normal))) },
            PriceRow { label: "Holofoil", value: format_price(tier_value(record.price(PriceTier::Holofoil))) },
            PriceRow {
                label: "Reverse Holofoil",
                value: format_price(tier_value(record.price(PriceTier::ReverseHolofoil))),
            },
            PriceRow { label: "1st Edition", value: format_price(first_edition) },
        ];
        let number = match record.number.as_deref().filter(|n| !n.is_empty()) {
            Some(number) => {
                let total = record.set.as_ref().and_then(|set| set.printed_total).filter(|total| *total != 0);
                match total {
                    Some(total) => format!("{number}/{total}"),
                    None => format!("{number}/?"),
                }
            },
            None => PLACEHOLDER.to_string(),
        };
        let or_placeholder =
            |value: &Option<String>| value.as_deref().filter(|v| !v.is_empty()).unwrap_or(PLACEHOLDER).to_string();
        Self {
            name: record.name.clone(),
            set: record.set_name().unwrap_or(UNKNOWN_SET).to_string(),
            image: record.images.as_ref().and_then(|images| images.preferred()).map(str::to_string),
            rarity: or_placeholder(&record.rarity),
            number,
            artist: or_placeholder(&record.artist),
            prices,
        }
    }
}
impl Display for CardSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "  Set:     {}", self.set)?;
        writeln!(f, "  Number:  {}", self.number)?;
        writeln!(f, "  Rarity:  {}", self.rarity)?;
        writeln!(f, "  Artist:  {}", self.artist)?;
        if let Some(image) = &self.image {
            writeln!(f, "  Image:   {image}")?;
        }
        writeln!(f, "  Prices:")?;
        for row in &self.prices {
            writeln!(f, "    {:<18}{}", row.label, row.value)?;
        }
        Ok(())
    }
}

/// One-line listing used for multi-result searches.
pub fn search_line(record: &CatalogRecord) -> String {
    let rarity = record.rarity.as_deref().filter(|r| !r.is_empty()).unwrap_or("Unknown");
    format!("{}  {} · {} · {}", record.id, record.name, record.set_name().unwrap_or(UNKNOWN_SET), rarity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(Some(12.5), "$12.50")]
    #[case(Some(250.0), "$250.00")]
    #[case(Some(0.0), "-")]
    #[case(None, "-")]
    #[case(Some(f64::NAN), "-")]
    #[case(Some(0.004), "$0.00")]
    fn price_formatting(#[case] value: Option<f64>, #[case] expected: &str) {
        assert_eq!(format_price(value), expected);
    }

    #[rstest]
    #[case(Some(3.0), Some(2.0), Some(3.0))]
    #[case(Some(0.0), Some(2.0), Some(2.0))]
    #[case(None, Some(2.0), Some(2.0))]
    #[case(None, Some(0.0), None)]
    fn market_falls_back_to_mid(#[case] market: Option<f64>, #[case] mid: Option<f64>, #[case] expected: Option<f64>) {
        let price = Price { market, mid, ..Price::default() };
        assert_eq!(tier_value(Some(&price)), expected);
    }

    fn price_of<'a>(summary: &'a CardSummary, label: &str) -> &'a str {
        summary.prices.iter().find(|row| row.label == label).map(|row| row.value.as_str()).unwrap()
    }

    #[test]
    fn charizard_summary() {
        let record: CatalogRecord = serde_json::from_value(fixtures::charizard()).unwrap();
        let summary = CardSummary::from(&record);
        assert_eq!(price_of(&summary, "Holofoil"), "$250.00");
        assert_eq!(price_of(&summary, "Normal"), "-");
        assert_eq!(summary.set, "Base");
        assert_eq!(summary.number, "4/102");
        assert_eq!(summary.image.as_deref(), Some("https://images.pokemontcg.io/base1/4_hires.png"));
        assert!(summary.to_string().contains("Mitsuhiro Arita"));
    }

    #[test]
    fn sparse_summary_uses_placeholders() {
        let record: CatalogRecord =
            serde_json::from_value(json!({ "id": "x-1", "name": "Ditto", "number": "132" })).unwrap();
        let summary = CardSummary::from(&record);
        assert_eq!(summary.set, UNKNOWN_SET);
        assert_eq!(summary.number, "132/?");
        assert_eq!(summary.rarity, PLACEHOLDER);
        assert_eq!(summary.artist, PLACEHOLDER);
        assert_eq!(summary.image, None);
        assert!(summary.prices.iter().all(|row| row.value == PLACEHOLDER));
    }

    #[test]
    fn first_edition_prefers_holofoil_market_only() {
        let record: CatalogRecord = serde_json::from_value(json!({
            "id": "base1-4",
            "name": "Charizard",
            "tcgplayer": { "prices": {
                "1stEditionHolofoil": { "mid": 9000.0 },
                "1stEdition": { "market": 4200.0 }
            } }
        }))
        .unwrap();
        assert_eq!(price_of(&CardSummary::from(&record), "1st Edition"), "$4200.00");
    }

    #[test]
    fn search_lines() {
        let record: CatalogRecord = serde_json::from_value(json!({ "id": "x-1", "name": "Ditto" })).unwrap();
        assert_eq!(search_line(&record), "x-1  Ditto · Unknown set · Unknown");
    }
}

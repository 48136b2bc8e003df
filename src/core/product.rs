//! Product recommendations attached to bot replies.
//!
//! Products come straight from the backend and are never modified by the
//! client. The display helpers here apply the fallbacks the product card
//! shows when a field is missing.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Shown in place of a missing price.
pub const PRICE_PLACEHOLDER: &str = "Check website";
/// Shown in place of a missing rating.
pub const DEFAULT_RATING: &str = "4.0";
/// Star count used when the rating is missing or not a number.
const DEFAULT_STARS: f64 = 4.0;
const MAX_STARS: usize = 5;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Product {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub rating: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub flipkart_link: Option<String>,
    #[serde(default)]
    pub amazon_link: Option<String>,
    #[serde(rename = "inStock", default)]
    pub in_stock: Option<bool>,
}

/// Storefronts a product card can link out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marketplace {
    Flipkart,
    Amazon,
}

impl Marketplace {
    pub const ALL: [Marketplace; 2] = [Marketplace::Flipkart, Marketplace::Amazon];

    pub fn label(self) -> &'static str {
        match self {
            Marketplace::Flipkart => "Buy on Flipkart",
            Marketplace::Amazon => "Buy on Amazon",
        }
    }
}

/// Accepts `"4.5"`, `4.5`, or `null` for fields the backend is loose about.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

impl Product {
    pub fn price_label(&self) -> &str {
        non_empty(&self.price).unwrap_or(PRICE_PLACEHOLDER)
    }

    pub fn rating_label(&self) -> &str {
        non_empty(&self.rating).unwrap_or(DEFAULT_RATING)
    }

    /// Whole stars to draw: floor of the numeric rating, clamped to 0..=5.
    /// Missing, unparsable, or zero ratings fall back to 4.
    pub fn star_count(&self) -> usize {
        let value = non_empty(&self.rating)
            .and_then(|r| r.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v != 0.0)
            .unwrap_or(DEFAULT_STARS);
        (value.floor().max(0.0) as usize).min(MAX_STARS)
    }

    /// Products are in stock unless the backend explicitly says otherwise.
    pub fn in_stock(&self) -> bool {
        self.in_stock != Some(false)
    }

    pub fn link(&self, marketplace: Marketplace) -> Option<&str> {
        match marketplace {
            Marketplace::Flipkart => non_empty(&self.flipkart_link),
            Marketplace::Amazon => non_empty(&self.amazon_link),
        }
    }

    /// Marketplaces this product has a usable link for, in display order.
    pub fn marketplaces(&self) -> Vec<Marketplace> {
        Marketplace::ALL
            .into_iter()
            .filter(|m| self.link(*m).is_some())
            .collect()
    }
}

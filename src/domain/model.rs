use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::utils::error::SocProofError;

/// Localized metadata for one service, scraped from the catalog page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub time: String,
    pub category: String,
}

/// Catalog entries keyed by service identifier.
pub type Catalog = BTreeMap<u32, CatalogEntry>;

/// A purchasable service: API commercial fields merged with catalog text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub service: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub rate: f64,
    pub min: u64,
    pub max: u64,
    pub refill: bool,
    pub cancel: bool,
    pub category: String,
    pub description: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatus {
    pub order_id: String,
    pub charge: f64,
    pub status: String,
    pub remains: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub balance: f64,
    pub currency: String,
}

/// Catalog language. Selects the catalog page and the cache keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ru,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = SocProofError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ru" => Ok(Language::Ru),
            other => Err(SocProofError::invalid_argument(
                "language",
                other,
                "Expected \"en\" or \"ru\"",
            )),
        }
    }
}

/// Order identifiers for a status query: one order or several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderQuery {
    Single(String),
    Many(Vec<String>),
}

impl OrderQuery {
    /// Comma-joined form sent in the `orders` parameter. Blank ids are dropped.
    pub fn to_wire(&self) -> String {
        match self {
            OrderQuery::Single(id) => id.trim().to_string(),
            OrderQuery::Many(ids) => ids
                .iter()
                .map(|id| id.trim())
                .filter(|id| !id.is_empty())
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_wire().is_empty()
    }
}

impl From<u64> for OrderQuery {
    fn from(id: u64) -> Self {
        OrderQuery::Single(id.to_string())
    }
}

impl From<&str> for OrderQuery {
    fn from(id: &str) -> Self {
        OrderQuery::Single(id.to_string())
    }
}

impl From<String> for OrderQuery {
    fn from(id: String) -> Self {
        OrderQuery::Single(id)
    }
}

impl From<&String> for OrderQuery {
    fn from(id: &String) -> Self {
        OrderQuery::Single(id.clone())
    }
}

impl From<Vec<u64>> for OrderQuery {
    fn from(ids: Vec<u64>) -> Self {
        OrderQuery::Many(ids.iter().map(u64::to_string).collect())
    }
}

impl From<&[u64]> for OrderQuery {
    fn from(ids: &[u64]) -> Self {
        OrderQuery::Many(ids.iter().map(u64::to_string).collect())
    }
}

impl<const N: usize> From<[u64; N]> for OrderQuery {
    fn from(ids: [u64; N]) -> Self {
        OrderQuery::Many(ids.iter().map(u64::to_string).collect())
    }
}

impl From<Vec<String>> for OrderQuery {
    fn from(ids: Vec<String>) -> Self {
        OrderQuery::Many(ids)
    }
}

impl From<&[String]> for OrderQuery {
    fn from(ids: &[String]) -> Self {
        OrderQuery::Many(ids.to_vec())
    }
}

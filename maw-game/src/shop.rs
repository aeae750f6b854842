//! Dregs shop catalog and purchase rules
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{MawError, MawResult};

const DEFAULT_SHOP_DATA: &str = include_str!("../data/shop.json");

/// What a purchase hands back to the caller's economy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShopReward {
    Gold { amount: u64 },
    Gems { amount: u64 },
    Item { item_id: String, count: u32 },
}

/// A single item available in the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopItem {
    pub id: String,
    pub name: String,
    /// Price in dregs
    pub cost: u64,
    /// Lifetime purchase cap; `None` means unlimited
    #[serde(default)]
    pub max_stock: Option<u32>,
    pub reward: ShopReward,
}

/// Remaining stock for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopStock {
    Unlimited,
    Limited(u32),
}

impl ShopStock {
    #[must_use]
    pub const fn is_exhausted(self) -> bool {
        matches!(self, Self::Limited(0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ShopCatalog {
    pub items: Vec<ShopItem>,
}

impl ShopCatalog {
    /// Load shop data from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn embedded() -> Self {
        Self::from_json(DEFAULT_SHOP_DATA).unwrap_or_default()
    }

    /// Find an item by ID.
    #[must_use]
    pub fn find_item(&self, item_id: &str) -> Option<&ShopItem> {
        self.items.iter().find(|item| item.id == item_id)
    }
}

/// Lifetime purchase counters keyed by item id.
pub type PurchaseLedger = BTreeMap<String, u32>;

/// Stock left for `item` given the purchase ledger.
#[must_use]
pub fn remaining_stock(item: &ShopItem, purchases: &PurchaseLedger) -> ShopStock {
    match item.max_stock {
        None => ShopStock::Unlimited,
        Some(max) => {
            let bought = purchases.get(&item.id).copied().unwrap_or(0);
            ShopStock::Limited(max.saturating_sub(bought))
        }
    }
}

/// Validate a purchase and apply it to the balance and ledger.
///
/// # Errors
///
/// Returns [`MawError::OutOfStock`] when the cap is reached and
/// [`MawError::InsufficientDregs`] when the balance cannot cover the cost.
pub fn apply_purchase(
    item: &ShopItem,
    purchases: &mut PurchaseLedger,
    dregs: &mut u64,
) -> MawResult<ShopReward> {
    if remaining_stock(item, purchases).is_exhausted() {
        return Err(MawError::OutOfStock(item.id.clone()));
    }
    if *dregs < item.cost {
        return Err(MawError::InsufficientDregs {
            required: item.cost,
            available: *dregs,
        });
    }
    *dregs -= item.cost;
    *purchases.entry(item.id.clone()).or_insert(0) += 1;
    Ok(item.reward.clone())
}

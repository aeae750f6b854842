//! Boon definitions and the combined static catalog.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{WEIGHT_COMMON, WEIGHT_EPIC, WEIGHT_RARE, WEIGHT_UNKNOWN};
use crate::shop::{ShopCatalog, ShopItem};
use crate::waves::{TierConfig, TierTable, WaveConfig, WaveTable};

const DEFAULT_BOON_DATA: &str = include_str!("../data/boons.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoonCategory {
    Offensive,
    Defensive,
    Tactical,
    Synergy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    /// Rarity names this build does not know; weighted like common.
    #[serde(other)]
    Unknown,
}

impl Rarity {
    /// Relative weight when drawing offerings.
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::Common => WEIGHT_COMMON,
            Self::Rare => WEIGHT_RARE,
            Self::Epic => WEIGHT_EPIC,
            Self::Unknown => WEIGHT_UNKNOWN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoonScope {
    Heroes,
    Enemies,
    All,
}

/// Effect descriptor interpreted by the battle layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoonEffect {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub params: BTreeMap<String, f64>,
}

impl BoonEffect {
    #[must_use]
    pub fn param(&self, name: &str) -> Option<f64> {
        self.params.get(name).copied()
    }
}

/// A run-scoped modifier offered between waves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boon {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: BoonCategory,
    pub rarity: Rarity,
    pub scope: BoonScope,
    pub hook: String,
    pub effect: BoonEffect,
    #[serde(default)]
    pub is_seed: bool,
    #[serde(default)]
    pub seed_tags: Vec<String>,
    #[serde(default)]
    pub is_payoff: bool,
    #[serde(default)]
    pub payoff_tags: Vec<String>,
}

impl Boon {
    /// Whether this payoff answers any of `seed`'s synergy tags.
    #[must_use]
    pub fn pays_off(&self, seed: &Self) -> bool {
        self.is_payoff
            && seed.is_seed
            && self.payoff_tags.iter().any(|tag| seed.seed_tags.contains(tag))
    }
}

/// Container for every boon definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BoonCatalog {
    pub boons: Vec<Boon>,
}

impl BoonCatalog {
    /// Load boon data from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into boon definitions.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn from_boons(boons: Vec<Boon>) -> Self {
        Self { boons }
    }

    #[must_use]
    pub fn all(&self) -> &[Boon] {
        &self.boons
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Boon> {
        self.boons.iter().find(|boon| boon.id == id)
    }

    /// Payoff boons whose tags intersect `seed`'s seed tags, in catalog order.
    #[must_use]
    pub fn payoffs_for_seed(&self, seed: &Boon) -> Vec<&Boon> {
        self.boons.iter().filter(|boon| boon.pays_off(seed)).collect()
    }
}

impl BoonCatalog {
    /// The boon table compiled into the crate.
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_json(DEFAULT_BOON_DATA).unwrap_or_default()
    }
}

/// Every static table the engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MawCatalog {
    pub boons: BoonCatalog,
    pub waves: WaveTable,
    pub tiers: TierTable,
    pub shop: ShopCatalog,
}

impl MawCatalog {
    /// Catalog built from the JSON tables under `data/`.
    #[must_use]
    pub fn embedded() -> Self {
        Self {
            boons: BoonCatalog::embedded(),
            waves: WaveTable::embedded(),
            tiers: TierTable::embedded(),
            shop: ShopCatalog::embedded(),
        }
    }

    #[must_use]
    pub fn all_boons(&self) -> &[Boon] {
        self.boons.all()
    }

    #[must_use]
    pub fn boon(&self, id: &str) -> Option<&Boon> {
        self.boons.get(id)
    }

    /// Payoff boons whose tags intersect `seed`'s seed tags.
    #[must_use]
    pub fn payoffs_for_seed(&self, seed: &Boon) -> Vec<&Boon> {
        self.boons.payoffs_for_seed(seed)
    }

    #[must_use]
    pub fn wave(&self, wave: u8) -> Option<&WaveConfig> {
        self.waves.get(wave)
    }

    #[must_use]
    pub fn tier(&self, tier: u8) -> Option<&TierConfig> {
        self.tiers.get(tier)
    }

    #[must_use]
    pub fn shop_item(&self, item_id: &str) -> Option<&ShopItem> {
        self.shop.find_item(item_id)
    }
}

impl Default for MawCatalog {
    fn default() -> Self {
        Self::embedded()
    }
}

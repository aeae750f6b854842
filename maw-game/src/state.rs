//! Durable Maw state: the daily session, permanent progress, the active run,
//! and the save record that carries all of them.
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::constants::{MAX_DAYS_SKIPPED, MIN_TIER, SAVE_SCHEMA_VERSION};
use crate::data::Boon;
use crate::offerings::Offerings;
use crate::shop::PurchaseLedger;

/// Rewards accrued by a run (or snapshotted at the best depth).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRewards {
    pub gold: u64,
    pub gems: u64,
    pub dregs: u64,
    #[serde(default)]
    pub items: Vec<String>,
}

impl RunRewards {
    pub fn accrue(&mut self, gained: &WaveRewards) {
        self.gold = self.gold.saturating_add(gained.gold);
        self.gems = self.gems.saturating_add(gained.gems);
        self.dregs = self.dregs.saturating_add(gained.dregs);
        if let Some(item) = &gained.item {
            self.items.push(item.clone());
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gold == 0 && self.gems == 0 && self.dregs == 0 && self.items.is_empty()
    }
}

/// Reward delta granted by one completed wave.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveRewards {
    pub gold: u64,
    pub gems: u64,
    pub dregs: u64,
    pub item: Option<String>,
}

/// The single in-progress run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveRun {
    pub tier: u8,
    pub wave: u8,
    /// Highest wave completed in this run.
    #[serde(default)]
    pub depth: u8,
    #[serde(default)]
    pub boons: Vec<Boon>,
    #[serde(default)]
    pub rewards: RunRewards,
    #[serde(default)]
    pub pending_boon_selection: bool,
    #[serde(default)]
    pub offerings: Offerings,
    /// Opaque battle-layer snapshot, stored and returned untouched.
    #[serde(default)]
    pub party_state: serde_json::Value,
    #[serde(default)]
    pub complete: bool,
}

impl ActiveRun {
    #[must_use]
    pub fn new(tier: u8) -> Self {
        Self {
            tier,
            wave: 1,
            depth: 0,
            boons: Vec::new(),
            rewards: RunRewards::default(),
            pending_boon_selection: false,
            offerings: Offerings::new(),
            party_state: serde_json::Value::Null,
            complete: false,
        }
    }

    #[must_use]
    pub fn holds(&self, boon_id: &str) -> bool {
        self.boons.iter().any(|boon| boon.id == boon_id)
    }
}

/// State scoped to one calendar day; cleared by the daily reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyState {
    pub selected_tier: Option<u8>,
    pub closed: bool,
    pub best_depth: u8,
    pub pending_rewards: Option<RunRewards>,
    pub last_play_date: Option<NaiveDate>,
    pub days_skipped: u8,
    pub run_attempts: u32,
    pub last_run_boons: Vec<Boon>,
    pub last_run_depth: u8,
}

/// Progress that survives every daily reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermanentState {
    pub tier_unlocks: BTreeMap<u8, bool>,
    pub dregs: u64,
    pub player_salt: Option<String>,
    pub shop_purchases: PurchaseLedger,
}

impl Default for PermanentState {
    fn default() -> Self {
        Self {
            tier_unlocks: BTreeMap::from([(MIN_TIER, true)]),
            dregs: 0,
            player_salt: None,
            shop_purchases: PurchaseLedger::new(),
        }
    }
}

impl PermanentState {
    #[must_use]
    pub fn is_unlocked(&self, tier: u8) -> bool {
        tier == MIN_TIER || self.tier_unlocks.get(&tier).copied().unwrap_or(false)
    }
}

/// Distinguishes an absent field (`None`) from an explicit null (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

const fn default_schema_version() -> u32 {
    SAVE_SCHEMA_VERSION
}

/// Serializable snapshot of every durable field.
///
/// Each field is optional so older or partial records load cleanly: absent
/// fields leave the engine's current value in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MawSave {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub selected_tier: Option<Option<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_depth: Option<u8>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub pending_rewards: Option<Option<RunRewards>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub last_play_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_skipped: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_boons: Option<Vec<Boon>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_depth: Option<u8>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub active_run: Option<Option<ActiveRun>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_unlocks: Option<BTreeMap<u8, bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dregs: Option<u64>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub player_salt: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_purchases: Option<PurchaseLedger>,
}

impl Default for MawSave {
    fn default() -> Self {
        Self {
            schema_version: SAVE_SCHEMA_VERSION,
            selected_tier: None,
            closed: None,
            best_depth: None,
            pending_rewards: None,
            last_play_date: None,
            days_skipped: None,
            run_attempts: None,
            last_run_boons: None,
            last_run_depth: None,
            active_run: None,
            tier_unlocks: None,
            dregs: None,
            player_salt: None,
            shop_purchases: None,
        }
    }
}

impl MawSave {
    /// Capture every field.
    #[must_use]
    pub fn capture(
        daily: &DailyState,
        permanent: &PermanentState,
        active_run: Option<&ActiveRun>,
    ) -> Self {
        Self {
            schema_version: SAVE_SCHEMA_VERSION,
            selected_tier: Some(daily.selected_tier),
            closed: Some(daily.closed),
            best_depth: Some(daily.best_depth),
            pending_rewards: Some(daily.pending_rewards.clone()),
            last_play_date: Some(daily.last_play_date),
            days_skipped: Some(daily.days_skipped),
            run_attempts: Some(daily.run_attempts),
            last_run_boons: Some(daily.last_run_boons.clone()),
            last_run_depth: Some(daily.last_run_depth),
            active_run: Some(active_run.cloned()),
            tier_unlocks: Some(permanent.tier_unlocks.clone()),
            dregs: Some(permanent.dregs),
            player_salt: Some(permanent.player_salt.clone()),
            shop_purchases: Some(permanent.shop_purchases.clone()),
        }
    }

    /// Overwrite each present field; absent fields are left alone.
    pub fn apply(
        self,
        daily: &mut DailyState,
        permanent: &mut PermanentState,
        active_run: &mut Option<ActiveRun>,
    ) {
        if let Some(value) = self.selected_tier {
            daily.selected_tier = value;
        }
        if let Some(value) = self.closed {
            daily.closed = value;
        }
        if let Some(value) = self.best_depth {
            daily.best_depth = value;
        }
        if let Some(value) = self.pending_rewards {
            daily.pending_rewards = value;
        }
        if let Some(value) = self.last_play_date {
            daily.last_play_date = value;
        }
        if let Some(value) = self.days_skipped {
            daily.days_skipped = value.min(MAX_DAYS_SKIPPED);
        }
        if let Some(value) = self.run_attempts {
            daily.run_attempts = value;
        }
        if let Some(value) = self.last_run_boons {
            daily.last_run_boons = value;
        }
        if let Some(value) = self.last_run_depth {
            daily.last_run_depth = value;
        }
        if let Some(value) = self.active_run {
            *active_run = value;
        }
        if let Some(value) = self.tier_unlocks {
            permanent.tier_unlocks = value;
            permanent.tier_unlocks.insert(MIN_TIER, true);
        }
        if let Some(value) = self.dregs {
            permanent.dregs = value;
        }
        if let Some(value) = self.player_salt {
            permanent.player_salt = value;
        }
        if let Some(value) = self.shop_purchases {
            permanent.shop_purchases = value;
        }
    }
}

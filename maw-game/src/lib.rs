//! Maw Game Engine
//!
//! Platform-agnostic core logic for the Maw, a seeded daily roguelike run
//! mode: tier gating, boon offerings, wave rewards, the dregs shop, and
//! persistence. Combat is owned by the host; this crate only tracks the
//! run around it.

pub mod constants;
pub mod data;
pub mod engine;
pub mod error;
pub mod numbers;
pub mod offerings;
pub mod rng;
pub mod seed;
pub mod shop;
pub mod state;
pub mod waves;

// Re-export commonly used types
pub use data::{Boon, BoonCatalog, BoonCategory, BoonEffect, BoonScope, MawCatalog, Rarity};
pub use engine::{ClaimedRewards, MawEngine, MawStatus, RecoveryBonus, RunSummary, WaveOutcome};
pub use error::{MawError, MawResult};
pub use offerings::{Offerings, generate_boon_offerings, offering_ids};
pub use rng::{SeededRandom, Weighted};
pub use seed::{boon_seed, daily_seed, date_key, encounter_seed, generate_player_salt, string_hash};
pub use shop::{ShopCatalog, ShopItem, ShopReward, ShopStock};
pub use state::{ActiveRun, DailyState, MawSave, PermanentState, RunRewards, WaveRewards};
pub use waves::{
    EncounterPlan, IntRange, TierConfig, TierTable, WaveConfig, WavePhase, WaveTable, plan_encounter,
};

use anyhow::Context;
use std::convert::Infallible;

/// Trait for abstracting catalog loading.
/// Hosts that ship their own tables provide this.
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the full static catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if any table cannot be read or parsed.
    fn load_catalog(&self) -> Result<MawCatalog, Self::Error>;
}

/// Serves the JSON tables compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedCatalog;

impl CatalogLoader for EmbeddedCatalog {
    type Error = Infallible;

    fn load_catalog(&self) -> Result<MawCatalog, Self::Error> {
        Ok(MawCatalog::embedded())
    }
}

/// Trait for abstracting save/load of Maw records.
/// Platform-specific implementations should provide this.
pub trait SaveStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist a record under `slot`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn save_record(&self, slot: &str, record: &MawSave) -> Result<(), Self::Error>;

    /// Read the record under `slot`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot exists but cannot be read.
    fn load_record(&self, slot: &str) -> Result<Option<MawSave>, Self::Error>;

    /// Remove the record under `slot`.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be removed.
    fn delete_record(&self, slot: &str) -> Result<(), Self::Error>;
}

/// Wires a catalog source and a save backend to [`MawEngine`] sessions.
pub struct MawHost<L, S>
where
    L: CatalogLoader,
    S: SaveStorage,
{
    loader: L,
    storage: S,
}

impl<L, S> MawHost<L, S>
where
    L: CatalogLoader,
    S: SaveStorage,
{
    pub const fn new(loader: L, storage: S) -> Self {
        Self { loader, storage }
    }

    /// Fresh engine over the loader's catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn new_engine(&self) -> Result<MawEngine, L::Error> {
        self.loader.load_catalog().map(MawEngine::new)
    }

    /// Save an engine's state to `slot`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be saved.
    pub fn save_engine(&self, slot: &str, engine: &MawEngine) -> Result<(), S::Error> {
        self.storage.save_record(slot, &engine.save_state())
    }

    /// Rebuild an engine from `slot` over a freshly loaded catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if storage, catalog loading, or the record itself fails.
    pub fn load_engine(&self, slot: &str) -> anyhow::Result<Option<MawEngine>>
    where
        L::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        let Some(record) = self
            .storage
            .load_record(slot)
            .map_err(Into::<anyhow::Error>::into)
            .with_context(|| format!("reading save slot {slot}"))?
        else {
            return Ok(None);
        };
        let mut engine = self.new_engine().map_err(Into::<anyhow::Error>::into)?;
        engine
            .load_state(record)
            .with_context(|| format!("applying save slot {slot}"))?;
        Ok(Some(engine))
    }

    /// Remove `slot` from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be removed.
    pub fn delete_engine(&self, slot: &str) -> Result<(), S::Error> {
        self.storage.delete_record(slot)
    }
}

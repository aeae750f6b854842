//! Centralized balance and tuning constants for Maw run logic.
//!
//! Catalog numbers (boon effects, wave rewards, tier ranges) live in the JSON
//! tables under `data/`; the values here define the deterministic math the
//! engine applies on top of those tables.

// Run shape ----------------------------------------------------------------
pub const BOSS_WAVE: u8 = 11;
pub const MAX_TIER: u8 = 5;
pub const MIN_TIER: u8 = 1;
pub const OFFERING_COUNT: usize = 3;
pub const MILESTONE_WAVES: [u8; 3] = [5, 10, 11];

// Seed streams -------------------------------------------------------------
pub(crate) const WAVE_SEED_STRIDE: i32 = 1_000;
pub(crate) const ENCOUNTER_SEED_OFFSET: i32 = 1;
pub(crate) const SALT_LENGTH: usize = 8;
pub(crate) const SALT_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// Boon weighting -----------------------------------------------------------
pub(crate) const WEIGHT_COMMON: f64 = 60.0;
pub(crate) const WEIGHT_RARE: f64 = 30.0;
pub(crate) const WEIGHT_EPIC: f64 = 10.0;
pub(crate) const WEIGHT_UNKNOWN: f64 = WEIGHT_COMMON;

// Daily cycle --------------------------------------------------------------
pub const MAX_DAYS_SKIPPED: u8 = 3;
pub(crate) const REST_BONUS_PER_DAY: f64 = 0.9;

// Between-wave recovery ----------------------------------------------------
pub(crate) const RECOVERY_HP_PCT: u8 = 10;
pub(crate) const RECOVERY_MP_PCT: u8 = 5;

// Persistence --------------------------------------------------------------
pub const SAVE_SCHEMA_VERSION: u32 = 1;

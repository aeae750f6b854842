//! Seed derivation for daily Maw runs.
//!
//! A daily seed is the 31-multiplier string hash of `<date>-<tier>-<salt>`
//! folded to 32 bits. Per-wave streams are offset from it so boon offerings
//! and encounter plans never share generator state.

use chrono::NaiveDate;
use rand::Rng;

use crate::constants::{ENCOUNTER_SEED_OFFSET, SALT_ALPHABET, SALT_LENGTH, WAVE_SEED_STRIDE};

/// 31-multiplier hash over UTF-16 code units, wrapping in 32 bits.
#[must_use]
pub fn string_hash(input: &str) -> i32 {
    input.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_mul(31).wrapping_add(i32::from(unit))
    })
}

/// Canonical date key used in seed sources and saves.
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Seed for a (date, tier, player) triple.
#[must_use]
pub fn daily_seed(date: NaiveDate, tier: u8, salt: &str) -> i32 {
    string_hash(&format!("{}-{tier}-{salt}", date_key(date)))
}

/// Seed for boon offerings after completing `wave`.
#[must_use]
pub fn boon_seed(daily: i32, wave: u8) -> i32 {
    daily.wrapping_add(i32::from(wave).wrapping_mul(WAVE_SEED_STRIDE))
}

/// Seed for the enemy roster of `wave`.
#[must_use]
pub fn encounter_seed(daily: i32, wave: u8) -> i32 {
    boon_seed(daily, wave).wrapping_add(ENCOUNTER_SEED_OFFSET)
}

/// Generate a fresh base36 player salt.
pub fn generate_player_salt<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SALT_LENGTH)
        .map(|_| char::from(SALT_ALPHABET[rng.random_range(0..SALT_ALPHABET.len())]))
        .collect()
}

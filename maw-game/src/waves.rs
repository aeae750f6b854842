//! Wave and tier tables plus deterministic encounter planning.
use serde::{Deserialize, Serialize};

use crate::constants::BOSS_WAVE;
use crate::rng::SeededRandom;

const DEFAULT_WAVE_DATA: &str = include_str!("../data/waves.json");
const DEFAULT_TIER_DATA: &str = include_str!("../data/tiers.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WavePhase {
    Warmup,
    Pressure,
    Danger,
    Boss,
}

impl WavePhase {
    /// Phase bucket for a wave number.
    #[must_use]
    pub const fn for_wave(wave: u8) -> Self {
        match wave {
            0..=3 => Self::Warmup,
            4..=6 => Self::Pressure,
            7..=10 => Self::Danger,
            _ => Self::Boss,
        }
    }
}

/// Inclusive integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    pub min: u32,
    pub max: u32,
}

impl IntRange {
    #[must_use]
    pub const fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    fn roll(&self, rng: &mut SeededRandom) -> u32 {
        let lo = i32::try_from(self.min).unwrap_or(i32::MAX);
        let hi = i32::try_from(self.max.max(self.min)).unwrap_or(i32::MAX);
        u32::try_from(rng.int(lo, hi)).unwrap_or(self.min)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveConfig {
    pub wave: u8,
    pub phase: WavePhase,
    pub enemy_count: IntRange,
    pub gold: u64,
    pub dregs: u64,
    #[serde(default)]
    pub milestone_gems: u64,
    #[serde(default)]
    pub is_milestone: bool,
}

impl WaveConfig {
    #[must_use]
    pub const fn is_boss(&self) -> bool {
        self.wave >= BOSS_WAVE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WaveTable {
    pub waves: Vec<WaveConfig>,
}

impl WaveTable {
    /// Load wave data from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn embedded() -> Self {
        Self::from_json(DEFAULT_WAVE_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, wave: u8) -> Option<&WaveConfig> {
        self.waves.iter().find(|cfg| cfg.wave == wave)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    pub tier: u8,
    pub level_range: IntRange,
    pub reward_multiplier: f64,
    #[serde(default)]
    pub boss_item: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TierTable {
    pub tiers: Vec<TierConfig>,
}

impl TierTable {
    /// Load tier data from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn embedded() -> Self {
        Self::from_json(DEFAULT_TIER_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, tier: u8) -> Option<&TierConfig> {
        self.tiers.iter().find(|cfg| cfg.tier == tier)
    }
}

/// Enemy roster rolled for one wave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterPlan {
    pub wave: u8,
    pub phase: WavePhase,
    pub enemy_levels: Vec<u32>,
    pub is_boss: bool,
    pub is_milestone: bool,
}

impl EncounterPlan {
    #[must_use]
    pub fn enemy_count(&self) -> usize {
        self.enemy_levels.len()
    }
}

/// Roll the enemy count and levels for a wave from its dedicated seed.
///
/// The boss wave leads with an enemy at the tier's maximum level.
#[must_use]
pub fn plan_encounter(seed: i32, wave: &WaveConfig, tier: &TierConfig) -> EncounterPlan {
    let mut rng = SeededRandom::new(seed);
    let count = wave.enemy_count.roll(&mut rng);
    let mut enemy_levels: Vec<u32> = (0..count)
        .map(|_| tier.level_range.roll(&mut rng))
        .collect();
    if wave.is_boss()
        && let Some(lead) = enemy_levels.first_mut()
    {
        *lead = tier.level_range.max;
    }
    EncounterPlan {
        wave: wave.wave,
        phase: wave.phase,
        enemy_levels,
        is_boss: wave.is_boss(),
        is_milestone: wave.is_milestone,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_bucket_by_wave() {
        assert_eq!(WavePhase::for_wave(1), WavePhase::Warmup);
        assert_eq!(WavePhase::for_wave(4), WavePhase::Pressure);
        assert_eq!(WavePhase::for_wave(10), WavePhase::Danger);
        assert_eq!(WavePhase::for_wave(11), WavePhase::Boss);
    }

    #[test]
    fn embedded_tables_match_phase_buckets() {
        let waves = WaveTable::embedded();
        for cfg in &waves.waves {
            assert_eq!(cfg.phase, WavePhase::for_wave(cfg.wave), "wave {}", cfg.wave);
        }
        assert!(waves.get(11).unwrap().is_boss());
        assert!(waves.get(12).is_none());
        let tiers = TierTable::embedded();
        assert!((tiers.get(1).unwrap().reward_multiplier - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn encounter_plan_respects_ranges() {
        let waves = WaveTable::embedded();
        let tiers = TierTable::embedded();
        let tier = tiers.get(3).unwrap();
        for wave in &waves.waves {
            for seed in 0..50 {
                let plan = plan_encounter(seed, wave, tier);
                let count = u32::try_from(plan.enemy_count()).unwrap();
                assert!(wave.enemy_count.contains(count));
                assert!(plan.enemy_levels.iter().all(|lvl| tier.level_range.contains(*lvl)));
                assert_eq!(plan, plan_encounter(seed, wave, tier));
            }
        }
    }

    #[test]
    fn boss_leads_with_max_level() {
        let waves = WaveTable::embedded();
        let tiers = TierTable::embedded();
        let tier = tiers.get(2).unwrap();
        let plan = plan_encounter(-99, waves.get(11).unwrap(), tier);
        assert!(plan.is_boss && plan.is_milestone);
        assert_eq!(plan.enemy_levels[0], tier.level_range.max);
    }
}

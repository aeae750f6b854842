use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use log::debug;
use maw_game::constants::BOSS_WAVE;
use maw_game::{
    ClaimedRewards, MawEngine, MawSave, SeededRandom, WaveOutcome, WavePhase, offering_ids,
};
use serde::Serialize;
use serde_json::json;

use crate::logic::policy::{BoonPolicy, PickStrategy};

/// One simulated day: who plays, when, on which tier, with which picks.
#[derive(Debug, Clone, Serialize)]
pub struct SessionConfig {
    pub salt: String,
    pub date: NaiveDate,
    pub tier: u8,
    pub strategy: PickStrategy,
    pub iteration: u32,
}

impl SessionConfig {
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{} t{} {} {}",
            maw_game::date_key(self.date),
            self.tier,
            self.salt,
            self.strategy
        )
    }

    fn policy_seed(&self) -> u64 {
        u64::from(self.iteration)
            .wrapping_mul(0x9E37_79B9_7F4A_7C15)
            .wrapping_add(u64::from(maw_game::string_hash(&self.salt).cast_unsigned()))
    }
}

/// Per-wave trace entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaveRecord {
    pub wave: u8,
    pub enemy_levels: Vec<u32>,
    pub offered: Vec<String>,
    pub picked: Option<String>,
    pub run_gold: u64,
    pub run_dregs: u64,
}

/// Everything observed during one simulated session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub config: SessionConfig,
    pub waves: Vec<WaveRecord>,
    pub depth: u8,
    pub cleared: bool,
    pub wiped_at: Option<u8>,
    pub best_depth: u8,
    pub unlocked_tier: Option<u8>,
    pub claimed: Option<ClaimedRewards>,
    pub purchases: Vec<String>,
    pub final_dregs: u64,
}

impl SessionSummary {
    /// Offerings and picks in order; equal traces mean equal runs.
    #[must_use]
    pub fn trace(&self) -> Vec<(Vec<String>, Option<String>)> {
        self.waves
            .iter()
            .map(|w| (w.offered.clone(), w.picked.clone()))
            .collect()
    }
}

/// A finished session plus the engine that played it.
pub struct SessionRun {
    pub summary: SessionSummary,
    pub engine: MawEngine,
}

const fn wipe_base_pct(phase: WavePhase) -> f64 {
    match phase {
        WavePhase::Warmup => 3.0,
        WavePhase::Pressure => 8.0,
        WavePhase::Danger => 14.0,
        WavePhase::Boss => 25.0,
    }
}

/// Deterministic party-wipe roll for a wave.
///
/// Each held boon shaves one point off the phase base, floored at one.
fn party_wiped(daily_seed: i32, iteration: u32, wave: u8, phase: WavePhase, held: usize) -> bool {
    let salt = i32::try_from(iteration).unwrap_or(i32::MAX);
    let seed = daily_seed
        .wrapping_add(salt.wrapping_mul(7919))
        .wrapping_add(i32::from(wave) * 31);
    let held = u32::try_from(held).unwrap_or(u32::MAX);
    let pct = (wipe_base_pct(phase) - f64::from(held)).max(1.0);
    SeededRandom::new(seed).chance(pct)
}

/// Play one run to the boss or a wipe, recording every wave.
fn play_run(
    engine: &mut MawEngine,
    date: NaiveDate,
    iteration: u32,
    policy: &mut dyn BoonPolicy,
    allow_wipes: bool,
) -> Result<(Vec<WaveRecord>, Option<u8>, Option<u8>)> {
    let daily_seed = engine.daily_seed(date)?;
    engine.start_run()?;
    let mut records = Vec::new();
    for wave in 1..=BOSS_WAVE {
        let plan = engine.plan_wave(wave)?;
        let held = engine.active_run().map_or(0, |run| run.boons.len());
        if allow_wipes && party_wiped(daily_seed, iteration, wave, plan.phase, held) {
            let summary = engine.fail_run()?;
            debug!("party wiped on wave {wave} after depth {}", summary.depth);
            return Ok((records, Some(wave), None));
        }

        let outcome = engine
            .complete_wave(json!({ "wave": wave, "enemies": plan.enemy_levels }))
            .with_context(|| format!("completing wave {wave}"))?;
        let (run_gold, run_dregs) = engine
            .active_run()
            .map_or((0, 0), |run| (run.rewards.gold, run.rewards.dregs));
        let mut record = WaveRecord {
            wave,
            enemy_levels: plan.enemy_levels,
            offered: offering_ids(outcome.offerings()),
            picked: None,
            run_gold,
            run_dregs,
        };

        match outcome {
            WaveOutcome::RunComplete { unlocked_tier, .. } => {
                records.push(record);
                engine.end_run()?;
                return Ok((records, None, unlocked_tier));
            }
            WaveOutcome::BoonChoice { offerings, .. } => {
                let held = engine
                    .active_run()
                    .map(|run| run.boons.clone())
                    .unwrap_or_default();
                let decision = policy.pick_boon(&held, &offerings);
                let choice = offerings
                    .get(decision.offer_index)
                    .or_else(|| offerings.first())
                    .context("wave produced no offerings")?;
                debug!(
                    "{} picked {} on wave {wave} ({})",
                    policy.name(),
                    choice.id,
                    decision.rationale.as_deref().unwrap_or("-")
                );
                let boon = engine.select_boon(&choice.id)?;
                record.picked = Some(boon.id);
                records.push(record);
            }
        }
    }
    Ok((records, None, None))
}

/// Clear the boss on each lower tier on the days before `date`, so `tier`
/// is unlocked by play rather than by editing the save.
fn unlock_through_play(engine: &mut MawEngine, config: &SessionConfig) -> Result<()> {
    for tier in 1..config.tier {
        let back = u64::from(config.tier - tier);
        let day = config
            .date
            .checked_sub_days(Days::new(back))
            .context("date underflow while preparing tiers")?;
        engine.check_daily_reset(day);
        engine.select_tier(tier, day)?;
        let mut policy = PickStrategy::First.create_policy(0);
        let (_, _, unlocked) = play_run(engine, day, config.iteration, policy.as_mut(), false)?;
        if unlocked.is_none() && !engine.is_tier_unlocked(tier + 1) {
            anyhow::bail!("boss clear on tier {tier} did not unlock tier {}", tier + 1);
        }
        engine.close_maw()?;
    }
    Ok(())
}

/// Spend dregs on each affordable, in-stock item once, cheapest first.
fn shop_sweep(engine: &mut MawEngine) -> Vec<String> {
    let mut items: Vec<(u64, String)> = engine
        .catalog()
        .shop
        .items
        .iter()
        .map(|item| (item.cost, item.id.clone()))
        .collect();
    items.sort();
    items
        .into_iter()
        .filter_map(|(_, id)| engine.purchase_shop_item(&id).ok().map(|_| id))
        .collect()
}

/// Simulate a full daily session for `config`.
///
/// # Errors
///
/// Returns an error when any engine operation fails unexpectedly.
pub fn simulate_session(config: &SessionConfig) -> Result<SessionRun> {
    let mut engine = MawEngine::default();
    engine.load_state(MawSave {
        player_salt: Some(Some(config.salt.clone())),
        ..MawSave::default()
    })?;

    unlock_through_play(&mut engine, config)
        .with_context(|| format!("preparing tier {}", config.tier))?;

    engine.check_daily_reset(config.date);
    engine.select_tier(config.tier, config.date)?;
    let mut policy = config.strategy.create_policy(config.policy_seed());
    let (waves, wiped_at, unlocked_tier) = play_run(
        &mut engine,
        config.date,
        config.iteration,
        policy.as_mut(),
        true,
    )?;

    let depth = waves.last().map_or(0, |w| w.wave);
    let best_depth = engine.daily().best_depth;
    let claimed = match engine.close_maw() {
        Ok(claimed) => Some(claimed),
        Err(maw_game::MawError::NothingToClaim) => None,
        Err(err) => return Err(err.into()),
    };
    let purchases = shop_sweep(&mut engine);

    let summary = SessionSummary {
        config: config.clone(),
        cleared: wiped_at.is_none() && depth == BOSS_WAVE,
        waves,
        depth,
        wiped_at,
        best_depth,
        unlocked_tier,
        claimed,
        purchases,
        final_dregs: engine.permanent().dregs,
    };
    Ok(SessionRun { summary, engine })
}

//! The Maw run engine: daily gate, run lifecycle, rewards, shop, persistence.
//!
//! The engine owns all Maw state and never reads the clock; hosts pass
//! "today" into the operations that depend on it. Call
//! [`MawEngine::check_daily_reset`] before any other daily operation.
use chrono::NaiveDate;
use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    BOSS_WAVE, MAX_DAYS_SKIPPED, MAX_TIER, MIN_TIER, RECOVERY_HP_PCT, RECOVERY_MP_PCT,
    REST_BONUS_PER_DAY, SAVE_SCHEMA_VERSION,
};
use crate::data::{Boon, MawCatalog};
use crate::error::{MawError, MawResult};
use crate::numbers::scale_floor;
use crate::offerings::{Offerings, generate_boon_offerings};
use crate::seed::{boon_seed, daily_seed, date_key, encounter_seed, generate_player_salt};
use crate::shop::{ShopReward, ShopStock, apply_purchase, remaining_stock};
use crate::state::{ActiveRun, DailyState, MawSave, PermanentState, RunRewards, WaveRewards};
use crate::waves::{EncounterPlan, plan_encounter};

/// Between-wave recovery annotation; the battle layer applies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryBonus {
    pub hp_pct: u8,
    pub mp_pct: u8,
}

impl Default for RecoveryBonus {
    fn default() -> Self {
        Self {
            hp_pct: RECOVERY_HP_PCT,
            mp_pct: RECOVERY_MP_PCT,
        }
    }
}

/// Result of completing a wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WaveOutcome {
    /// A regular wave: the player must pick one of `offerings`.
    BoonChoice {
        wave: u8,
        gained: WaveRewards,
        offerings: Offerings,
        recovery: RecoveryBonus,
        new_best: bool,
    },
    /// The boss fell; the run is over.
    RunComplete {
        gained: WaveRewards,
        unlocked_tier: Option<u8>,
        new_best: bool,
    },
}

impl WaveOutcome {
    #[must_use]
    pub const fn is_run_complete(&self) -> bool {
        matches!(self, Self::RunComplete { .. })
    }

    #[must_use]
    pub fn offerings(&self) -> &[Boon] {
        match self {
            Self::BoonChoice { offerings, .. } => offerings,
            Self::RunComplete { .. } => &[],
        }
    }

    #[must_use]
    pub const fn gained(&self) -> &WaveRewards {
        match self {
            Self::BoonChoice { gained, .. } | Self::RunComplete { gained, .. } => gained,
        }
    }
}

/// Progress banked when a run ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub tier: u8,
    pub depth: u8,
    pub boons: Vec<Boon>,
    pub rewards: RunRewards,
    pub complete: bool,
}

/// Rewards paid out by [`MawEngine::close_maw`].
///
/// Only `dregs` is committed by the engine. Gold, gems, and items must be
/// applied by the caller's economy; they are lost otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimedRewards {
    pub gold: u64,
    pub gems: u64,
    pub dregs: u64,
    pub items: Vec<String>,
    pub rest_multiplier: f64,
}

/// Read-only snapshot for UI and tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MawStatus {
    pub selected_tier: Option<u8>,
    pub closed: bool,
    pub best_depth: u8,
    pub days_skipped: u8,
    pub rest_multiplier: f64,
    pub dregs: u64,
    pub run_attempts: u32,
    pub run_wave: Option<u8>,
    pub awaiting_boon: bool,
    pub claimable: Option<ClaimedRewards>,
}

/// Owner of all Maw state for one player session.
#[derive(Debug, Clone)]
pub struct MawEngine {
    catalog: MawCatalog,
    daily: DailyState,
    permanent: PermanentState,
    active_run: Option<ActiveRun>,
}

impl Default for MawEngine {
    fn default() -> Self {
        Self::new(MawCatalog::embedded())
    }
}

impl MawEngine {
    #[must_use]
    pub fn new(catalog: MawCatalog) -> Self {
        Self {
            catalog,
            daily: DailyState::default(),
            permanent: PermanentState::default(),
            active_run: None,
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &MawCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn daily(&self) -> &DailyState {
        &self.daily
    }

    #[must_use]
    pub const fn permanent(&self) -> &PermanentState {
        &self.permanent
    }

    #[must_use]
    pub const fn active_run(&self) -> Option<&ActiveRun> {
        self.active_run.as_ref()
    }

    #[must_use]
    pub fn is_tier_unlocked(&self, tier: u8) -> bool {
        self.permanent.is_unlocked(tier)
    }

    // Daily gate ---------------------------------------------------------

    /// Roll daily state over when `today` differs from the last play date.
    ///
    /// Returns `true` when a reset happened. The last play date itself is
    /// kept so repeated checks before a tier is chosen yield the same
    /// `days_skipped`. An active run is discarded without banking; a run
    /// meant to survive midnight must be finished before the host resets.
    pub fn check_daily_reset(&mut self, today: NaiveDate) -> bool {
        let last = self.daily.last_play_date;
        if last == Some(today) {
            return false;
        }
        let days_skipped = last.map_or(0, |last| {
            let gap = (today - last)
                .num_days()
                .clamp(0, i64::from(MAX_DAYS_SKIPPED));
            u8::try_from(gap).unwrap_or(MAX_DAYS_SKIPPED)
        });
        if let Some(last) = last
            && today < last
        {
            warn!(
                "clock moved backwards from {} to {}; resetting daily state anyway",
                date_key(last),
                date_key(today)
            );
        }
        debug!(
            "daily reset for {} (last played {:?}, {days_skipped} day(s) skipped)",
            date_key(today),
            last.map(date_key)
        );
        self.daily = DailyState {
            last_play_date: last,
            days_skipped,
            ..DailyState::default()
        };
        if let Some(run) = self.active_run.take() {
            warn!(
                "discarding unbanked tier {} run at depth {} on daily reset",
                run.tier, run.depth
            );
        }
        true
    }

    /// Reward multiplier granted for days away: `1.0 + 0.9 * days_skipped`.
    #[must_use]
    pub fn rest_bonus_multiplier(&self) -> f64 {
        1.0 + f64::from(self.daily.days_skipped) * REST_BONUS_PER_DAY
    }

    /// Generate the player salt on first use; returns the salt.
    pub fn ensure_player_salt_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &str {
        self.permanent
            .player_salt
            .get_or_insert_with(|| generate_player_salt(rng))
    }

    /// [`Self::ensure_player_salt_with`] using the thread-local generator.
    pub fn ensure_player_salt(&mut self) -> &str {
        self.ensure_player_salt_with(&mut rand::rng())
    }

    /// Lock in today's tier.
    ///
    /// # Errors
    ///
    /// Fails when the Maw is closed, a tier was already chosen, the tier is
    /// out of range, or the tier is still locked.
    pub fn select_tier(&mut self, tier: u8, today: NaiveDate) -> MawResult<()> {
        self.select_tier_with(tier, today, &mut rand::rng())
    }

    /// [`Self::select_tier`] with an explicit generator for salt creation.
    ///
    /// # Errors
    ///
    /// See [`Self::select_tier`].
    pub fn select_tier_with<R: Rng + ?Sized>(
        &mut self,
        tier: u8,
        today: NaiveDate,
        rng: &mut R,
    ) -> MawResult<()> {
        if self.daily.closed {
            return Err(MawError::AlreadyClosed);
        }
        if self.daily.selected_tier.is_some() {
            return Err(MawError::AlreadySelected);
        }
        if !(MIN_TIER..=MAX_TIER).contains(&tier) {
            return Err(MawError::InvalidTier(tier));
        }
        if !self.is_tier_unlocked(tier) {
            return Err(MawError::TierLocked(tier));
        }
        self.daily.selected_tier = Some(tier);
        self.ensure_player_salt_with(rng);
        self.daily.last_play_date = Some(today);
        debug!("tier {tier} selected for {}", date_key(today));
        Ok(())
    }

    /// Seed for today's (tier, player) pair.
    ///
    /// # Errors
    ///
    /// Returns [`MawError::NoTierSelected`] or [`MawError::MissingSalt`].
    pub fn daily_seed(&self, today: NaiveDate) -> MawResult<i32> {
        let tier = self.daily.selected_tier.ok_or(MawError::NoTierSelected)?;
        let salt = self
            .permanent
            .player_salt
            .as_deref()
            .ok_or(MawError::MissingSalt)?;
        Ok(daily_seed(today, tier, salt))
    }

    /// Seed for the session the tier was locked in on. A run still going
    /// after midnight keeps generating from this date until the next
    /// [`Self::check_daily_reset`] discards it.
    fn session_seed(&self) -> MawResult<i32> {
        let day = self
            .daily
            .last_play_date
            .ok_or(MawError::NoTierSelected)?;
        self.daily_seed(day)
    }

    // Generation -----------------------------------------------------------

    /// Offerings for `wave` given the active run's held boons.
    ///
    /// # Errors
    ///
    /// Fails when no tier is selected or the salt is missing.
    pub fn generate_boon_offerings(&self, today: NaiveDate, wave: u8) -> MawResult<Offerings> {
        let seed = boon_seed(self.daily_seed(today)?, wave);
        let held = self.active_run.as_ref().map_or(&[][..], |run| &run.boons);
        Ok(generate_boon_offerings(&self.catalog.boons, seed, held))
    }

    /// Enemy roster for `wave` of today's tier.
    ///
    /// # Errors
    ///
    /// Fails when no tier is selected, the salt is missing, or the wave or
    /// tier has no catalog entry.
    pub fn plan_wave(&self, wave: u8) -> MawResult<EncounterPlan> {
        let tier = self.daily.selected_tier.ok_or(MawError::NoTierSelected)?;
        let seed = encounter_seed(self.session_seed()?, wave);
        let wave_cfg = self
            .catalog
            .waves
            .get(wave)
            .ok_or_else(|| MawError::CatalogMismatch(format!("wave {wave}")))?;
        let tier_cfg = self
            .catalog
            .tiers
            .get(tier)
            .ok_or_else(|| MawError::CatalogMismatch(format!("tier {tier}")))?;
        Ok(plan_encounter(seed, wave_cfg, tier_cfg))
    }

    // Run lifecycle ------------------------------------------------------

    /// Begin a run at wave 1, replacing any previous run.
    ///
    /// # Errors
    ///
    /// Fails when the Maw is closed or no tier is selected.
    pub fn start_run(&mut self) -> MawResult<&ActiveRun> {
        if self.daily.closed {
            return Err(MawError::AlreadyClosed);
        }
        let tier = self.daily.selected_tier.ok_or(MawError::NoTierSelected)?;
        if let Some(previous) = &self.active_run
            && !previous.complete
        {
            warn!(
                "replacing unfinished run at wave {} without banking it",
                previous.wave
            );
        }
        self.daily.run_attempts = self.daily.run_attempts.saturating_add(1);
        debug!("run {} started on tier {tier}", self.daily.run_attempts);
        Ok(self.active_run.insert(ActiveRun::new(tier)))
    }

    /// Record a cleared wave, accrue its rewards, and either offer boons or
    /// finish the run on the boss wave.
    ///
    /// # Errors
    ///
    /// Fails when there is no run, a boon choice is still pending, the run is
    /// already complete, or catalog data for the run is missing.
    pub fn complete_wave(&mut self, party_state: serde_json::Value) -> MawResult<WaveOutcome> {
        let run = self.active_run.as_ref().ok_or(MawError::NoActiveRun)?;
        if run.complete {
            return Err(MawError::RunAlreadyComplete);
        }
        if run.pending_boon_selection {
            return Err(MawError::SelectionPending);
        }
        let is_boss = run.wave >= BOSS_WAVE;
        let seed = if is_boss {
            None
        } else {
            Some(boon_seed(self.session_seed()?, run.wave))
        };

        let catalog = &self.catalog;
        let Some(run) = self.active_run.as_mut() else {
            return Err(MawError::NoActiveRun);
        };
        let tier_cfg = catalog
            .tiers
            .get(run.tier)
            .ok_or_else(|| MawError::CatalogMismatch(format!("tier {}", run.tier)))?;
        let wave_cfg = catalog
            .waves
            .get(run.wave)
            .ok_or_else(|| MawError::CatalogMismatch(format!("wave {}", run.wave)))?;

        let multiplier = tier_cfg.reward_multiplier;
        let gained = WaveRewards {
            gold: scale_floor(wave_cfg.gold, multiplier),
            gems: if wave_cfg.is_milestone {
                scale_floor(wave_cfg.milestone_gems, multiplier)
            } else {
                0
            },
            dregs: scale_floor(wave_cfg.dregs, multiplier),
            item: if is_boss {
                tier_cfg.boss_item.clone()
            } else {
                None
            },
        };
        run.rewards.accrue(&gained);
        run.party_state = party_state;
        run.depth = run.wave;

        let new_best = run.wave > self.daily.best_depth;
        if new_best {
            self.daily.best_depth = run.wave;
            self.daily.pending_rewards = Some(run.rewards.clone());
        }
        debug!(
            "wave {} cleared on tier {} (+{} gold, +{} dregs, best {})",
            run.wave, run.tier, gained.gold, gained.dregs, self.daily.best_depth
        );

        let Some(seed) = seed else {
            run.complete = true;
            let next = run.tier.saturating_add(1);
            let unlocked_tier = if next <= MAX_TIER && !self.permanent.is_unlocked(next) {
                self.permanent.tier_unlocks.insert(next, true);
                info!("tier {next} unlocked");
                Some(next)
            } else {
                None
            };
            return Ok(WaveOutcome::RunComplete {
                gained,
                unlocked_tier,
                new_best,
            });
        };

        let offerings = generate_boon_offerings(&catalog.boons, seed, &run.boons);
        run.pending_boon_selection = true;
        run.offerings = offerings.clone();
        Ok(WaveOutcome::BoonChoice {
            wave: run.wave,
            gained,
            offerings,
            recovery: RecoveryBonus::default(),
            new_best,
        })
    }

    /// Take one of the live offerings and advance to the next wave.
    ///
    /// # Errors
    ///
    /// Fails when there is no run, no pending choice, or `boon_id` was not
    /// offered.
    pub fn select_boon(&mut self, boon_id: &str) -> MawResult<Boon> {
        let run = self.active_run.as_mut().ok_or(MawError::NoActiveRun)?;
        if !run.pending_boon_selection {
            return Err(MawError::NoPendingSelection);
        }
        let Some(pos) = run.offerings.iter().position(|boon| boon.id == boon_id) else {
            return Err(MawError::BoonNotOffered(boon_id.to_string()));
        };
        let boon = run.offerings.remove(pos);
        run.offerings.clear();
        run.pending_boon_selection = false;
        run.boons.push(boon.clone());
        run.wave = run.wave.saturating_add(1).min(BOSS_WAVE);
        debug!("boon {} chosen, advancing to wave {}", boon.id, run.wave);
        Ok(boon)
    }

    fn bank_run(&mut self) -> MawResult<RunSummary> {
        let run = self.active_run.take().ok_or(MawError::NoActiveRun)?;
        self.daily.last_run_boons.clone_from(&run.boons);
        self.daily.last_run_depth = run.depth;
        if run.depth > self.daily.best_depth {
            self.daily.best_depth = run.depth;
            self.daily.pending_rewards = Some(run.rewards.clone());
        }
        debug!("run banked at depth {} on tier {}", run.depth, run.tier);
        Ok(RunSummary {
            tier: run.tier,
            depth: run.depth,
            boons: run.boons,
            rewards: run.rewards,
            complete: run.complete,
        })
    }

    /// End the run after a party wipe. Progress is banked; the run cannot
    /// be resumed.
    ///
    /// # Errors
    ///
    /// Fails when there is no run or the run already beat the boss.
    pub fn fail_run(&mut self) -> MawResult<RunSummary> {
        match &self.active_run {
            None => Err(MawError::NoActiveRun),
            Some(run) if run.complete => Err(MawError::RunAlreadyComplete),
            Some(_) => self.bank_run(),
        }
    }

    /// Leave the run, banking its progress.
    ///
    /// # Errors
    ///
    /// Returns [`MawError::NoActiveRun`] when there is nothing to end.
    pub fn end_run(&mut self) -> MawResult<RunSummary> {
        self.bank_run()
    }

    fn preview_claim(&self) -> Option<ClaimedRewards> {
        let pending = self.daily.pending_rewards.as_ref()?;
        let rest_multiplier = self.rest_bonus_multiplier();
        Some(ClaimedRewards {
            gold: scale_floor(pending.gold, rest_multiplier),
            gems: scale_floor(pending.gems, rest_multiplier),
            dregs: scale_floor(pending.dregs, rest_multiplier),
            items: pending.items.clone(),
            rest_multiplier,
        })
    }

    /// Claim the best-depth rewards and close the Maw for the day.
    ///
    /// # Errors
    ///
    /// Fails when already closed or nothing has been earned today.
    pub fn close_maw(&mut self) -> MawResult<ClaimedRewards> {
        if self.daily.closed {
            return Err(MawError::AlreadyClosed);
        }
        let claimed = self.preview_claim().ok_or(MawError::NothingToClaim)?;
        if self.active_run.is_some() {
            self.bank_run()?;
        }
        self.permanent.dregs = self.permanent.dregs.saturating_add(claimed.dregs);
        self.daily.closed = true;
        self.daily.days_skipped = 0;
        info!(
            "maw closed: {} dregs banked at x{:.1} (balance {})",
            claimed.dregs, claimed.rest_multiplier, self.permanent.dregs
        );
        Ok(claimed)
    }

    // Shop -----------------------------------------------------------------

    /// Buy one unit of a shop item with dregs.
    ///
    /// # Errors
    ///
    /// Fails when the item is unknown, out of stock, or unaffordable.
    pub fn purchase_shop_item(&mut self, item_id: &str) -> MawResult<ShopReward> {
        let item = self
            .catalog
            .shop
            .find_item(item_id)
            .ok_or_else(|| MawError::UnknownShopItem(item_id.to_string()))?;
        let reward = apply_purchase(
            item,
            &mut self.permanent.shop_purchases,
            &mut self.permanent.dregs,
        )?;
        debug!("purchased {item_id}, {} dregs left", self.permanent.dregs);
        Ok(reward)
    }

    /// Remaining stock for a shop item.
    ///
    /// # Errors
    ///
    /// Returns [`MawError::UnknownShopItem`] for ids not in the catalog.
    pub fn shop_item_stock(&self, item_id: &str) -> MawResult<ShopStock> {
        let item = self
            .catalog
            .shop
            .find_item(item_id)
            .ok_or_else(|| MawError::UnknownShopItem(item_id.to_string()))?;
        Ok(remaining_stock(item, &self.permanent.shop_purchases))
    }

    // Queries --------------------------------------------------------------

    /// Held boons that fire on `hook`, in pick order.
    #[must_use]
    pub fn boons_for_hook(&self, hook: &str) -> Vec<&Boon> {
        self.active_run
            .as_ref()
            .map(|run| run.boons.iter().filter(|boon| boon.hook == hook).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn status(&self) -> MawStatus {
        MawStatus {
            selected_tier: self.daily.selected_tier,
            closed: self.daily.closed,
            best_depth: self.daily.best_depth,
            days_skipped: self.daily.days_skipped,
            rest_multiplier: self.rest_bonus_multiplier(),
            dregs: self.permanent.dregs,
            run_attempts: self.daily.run_attempts,
            run_wave: self.active_run.as_ref().map(|run| run.wave),
            awaiting_boon: self
                .active_run
                .as_ref()
                .is_some_and(|run| run.pending_boon_selection),
            claimable: if self.daily.closed {
                None
            } else {
                self.preview_claim()
            },
        }
    }

    // Persistence ----------------------------------------------------------

    #[must_use]
    pub fn save_state(&self) -> MawSave {
        MawSave::capture(&self.daily, &self.permanent, self.active_run.as_ref())
    }

    /// Apply a save record; absent fields keep their current values.
    ///
    /// # Errors
    ///
    /// Returns [`MawError::UnsupportedSchema`] for records from a newer build.
    pub fn load_state(&mut self, record: MawSave) -> MawResult<()> {
        if record.schema_version > SAVE_SCHEMA_VERSION {
            return Err(MawError::UnsupportedSchema {
                found: record.schema_version,
                supported: SAVE_SCHEMA_VERSION,
            });
        }
        record.apply(&mut self.daily, &mut self.permanent, &mut self.active_run);
        Ok(())
    }
}

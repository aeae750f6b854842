use colored::Colorize;
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use maw_game::MawEngine;
use maw_game::numbers::u64_to_f64;

use crate::logic::policy::PickStrategy;
use crate::logic::simulation::{SessionConfig, SessionSummary, simulate_session};

/// Aggregated outcome for one (salt, date, tier, policy) combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    pub mean_depth: f64,
    pub clear_rate: f64,
    pub mean_dregs: f64,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
}

/// One sweep cell before iterations are applied.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub salt: String,
    pub date: NaiveDate,
    pub tier: u8,
    pub strategy: PickStrategy,
}

impl Scenario {
    #[must_use]
    pub fn config(&self, iteration: u32) -> SessionConfig {
        SessionConfig {
            salt: self.salt.clone(),
            date: self.date,
            tier: self.tier,
            strategy: self.strategy,
            iteration,
        }
    }
}

/// Cross product of the resolved CLI inputs.
#[must_use]
pub fn build_scenarios(
    salts: &[String],
    dates: &[NaiveDate],
    tiers: &[u8],
    strategies: &[PickStrategy],
) -> Vec<Scenario> {
    let mut scenarios = Vec::new();
    for salt in salts {
        for &date in dates {
            for &tier in tiers {
                for &strategy in strategies {
                    scenarios.push(Scenario {
                        salt: salt.clone(),
                        date,
                        tier,
                        strategy,
                    });
                }
            }
        }
    }
    scenarios
}

pub struct LogicTester {
    verbose: bool,
}

impl LogicTester {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Run every scenario; returns results plus the engine from the last
    /// successful session (for `--save`).
    pub fn run_all(
        &self,
        scenarios: &[Scenario],
        iterations: u32,
    ) -> (Vec<ScenarioResult>, Option<MawEngine>) {
        let mut last_engine = None;
        let results = scenarios
            .iter()
            .map(|scenario| {
                let (result, engine) = self.run_scenario(scenario, iterations);
                if engine.is_some() {
                    last_engine = engine;
                }
                result
            })
            .collect();
        (results, last_engine)
    }

    fn run_scenario(
        &self,
        scenario: &Scenario,
        iterations: u32,
    ) -> (ScenarioResult, Option<MawEngine>) {
        let name = scenario.config(0).label();
        if self.verbose {
            println!("🧪 Testing scenario: {}", name.bright_white());
        }

        let mut failures = Vec::new();
        let mut durations = Vec::new();
        let mut depths = Vec::new();
        let mut clears = 0usize;
        let mut dregs = Vec::new();
        let mut last_engine = None;

        for iteration in 0..iterations {
            let config = scenario.config(iteration);
            let started = Instant::now();
            match run_checked(&config) {
                Ok((summary, engine)) => {
                    durations.push(started.elapsed());
                    depths.push(f64::from(summary.depth));
                    dregs.push(summary.final_dregs);
                    if summary.cleared {
                        clears += 1;
                    }
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} depth {} wiped {:?} picks {}",
                            iteration + 1,
                            iterations,
                            summary.depth,
                            summary.wiped_at,
                            summary
                                .waves
                                .iter()
                                .filter_map(|w| w.picked.as_deref())
                                .collect::<Vec<_>>()
                                .join(",")
                        );
                    }
                    last_engine = Some(engine);
                }
                Err(err) => {
                    let message = format!("Iteration {} ({name}): {err:#}", iteration + 1);
                    warn!("{message}");
                    if self.verbose {
                        println!("  ❌ {}", message.red());
                    }
                    failures.push(message);
                }
            }
        }

        let successful = durations.len();
        let result = ScenarioResult {
            scenario_name: name,
            passed: failures.is_empty(),
            iterations_run: usize::try_from(iterations).unwrap_or(usize::MAX),
            successful_iterations: successful,
            failures,
            mean_depth: mean(&depths),
            clear_rate: ratio(clears, successful),
            mean_dregs: mean(&dregs.iter().map(|d| u64_to_f64(*d)).collect::<Vec<_>>()),
            average_duration: average(&durations),
        };
        (result, last_engine)
    }
}

/// Simulate twice and apply the session invariants.
fn run_checked(config: &SessionConfig) -> anyhow::Result<(SessionSummary, MawEngine)> {
    let first = simulate_session(config)?;
    let replay = simulate_session(config)?;
    if first.summary.trace() != replay.summary.trace() {
        anyhow::bail!("replay produced a different offering trace");
    }
    check_invariants(&first.summary)?;
    Ok((first.summary, first.engine))
}

fn check_invariants(summary: &SessionSummary) -> anyhow::Result<()> {
    for pair in summary.waves.windows(2) {
        if pair[1].run_gold < pair[0].run_gold || pair[1].run_dregs < pair[0].run_dregs {
            anyhow::bail!("rewards shrank between waves {} and {}", pair[0].wave, pair[1].wave);
        }
    }
    if summary.best_depth != summary.depth {
        anyhow::bail!(
            "best depth {} does not match deepest wave {}",
            summary.best_depth,
            summary.depth
        );
    }
    let mut seen = Vec::new();
    for record in &summary.waves {
        if record.wave < maw_game::constants::BOSS_WAVE
            && record.offered.len() != maw_game::constants::OFFERING_COUNT
        {
            anyhow::bail!("wave {} offered {} boons", record.wave, record.offered.len());
        }
        if let Some(repeat) = record.offered.iter().find(|id| seen.contains(*id)) {
            anyhow::bail!("wave {} re-offered held boon {repeat}", record.wave);
        }
        if let Some(picked) = &record.picked {
            seen.push(picked.clone());
        }
    }
    if summary.cleared && summary.config.tier < maw_game::constants::MAX_TIER
        && summary.unlocked_tier.is_none()
    {
        anyhow::bail!("boss clear on tier {} unlocked nothing", summary.config.tier);
    }
    Ok(())
}

fn len_as_f64(len: usize) -> f64 {
    u64_to_f64(u64::try_from(len).unwrap_or(u64::MAX))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / len_as_f64(values.len())
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        len_as_f64(part) / len_as_f64(whole)
    }
}

fn average(durations: &[Duration]) -> Duration {
    if durations.is_empty() {
        Duration::ZERO
    } else {
        durations.iter().sum::<Duration>() / u32::try_from(durations.len()).unwrap_or(1)
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_micros().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = u128::deserialize(deserializer)?;
        Ok(Duration::from_micros(u64::try_from(micros).unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 6).unwrap()
    }

    #[test]
    fn scenarios_cover_the_cross_product() {
        let scenarios = build_scenarios(
            &["abc123".to_string(), "zzz999".to_string()],
            &[date()],
            &[1, 2],
            &PickStrategy::ALL,
        );
        assert_eq!(scenarios.len(), 2 * 2 * 4);
        assert_eq!(scenarios[0].config(5).iteration, 5);
    }

    #[test]
    fn run_all_passes_and_returns_engine() {
        let scenarios = build_scenarios(&["abc123".to_string()], &[date()], &[1], &[PickStrategy::First]);
        let (results, engine) = LogicTester::new(false).run_all(&scenarios, 3);
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert!(result.passed, "{:?}", result.failures);
        assert_eq!(result.successful_iterations, 3);
        assert!((0.0..=1.0).contains(&result.clear_rate));
        assert!(result.mean_depth <= 11.0);
        assert!(engine.is_some());
    }

    #[test]
    fn result_serializes_duration_as_micros() {
        let result = ScenarioResult {
            scenario_name: "x".to_string(),
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            mean_depth: 4.0,
            clear_rate: 0.0,
            mean_dregs: 12.0,
            average_duration: Duration::from_micros(1500),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["average_duration"], serde_json::json!(1500));
        let back: ScenarioResult = serde_json::from_value(value).unwrap();
        assert_eq!(back.average_duration, Duration::from_micros(1500));
    }

    #[test]
    fn helpers_handle_empty_input() {
        assert!(mean(&[]).abs() < f64::EPSILON);
        assert!(ratio(1, 0).abs() < f64::EPSILON);
        assert_eq!(average(&[]), Duration::ZERO);
    }

    #[test]
    fn helpers_average_counts() {
        assert!((mean(&[2.0, 4.0, 9.0]) - 5.0).abs() < 1e-9);
        assert!((ratio(3, 4) - 0.75).abs() < 1e-9);
        assert!((len_as_f64(7) - 7.0).abs() < f64::EPSILON);
    }
}

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use maw_game::{Boon, Rarity};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Boon choice returned by a [`BoonPolicy`].
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub offer_index: usize,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub fn new(offer_index: usize, rationale: Option<String>) -> Self {
        Self {
            offer_index,
            rationale,
        }
    }
}

/// Policy interface for automated boon picks.
pub trait BoonPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Choose one of `offers` given the boons already held.
    fn pick_boon(&mut self, held: &[Boon], offers: &[Boon]) -> PolicyDecision;
}

/// Built-in pick strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickStrategy {
    First,
    Rarest,
    Synergy,
    Random,
}

impl PickStrategy {
    pub const ALL: [Self; 4] = [Self::First, Self::Rarest, Self::Synergy, Self::Random];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Rarest => "rarest",
            Self::Synergy => "synergy",
            Self::Random => "random",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::First => "Always take the first offer",
            Self::Rarest => "Take the highest-rarity offer",
            Self::Synergy => "Prefer payoffs for held seeds, then new seeds",
            Self::Random => "Uniform pick from a ChaCha20 stream",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn BoonPolicy> {
        match self {
            Self::First => Box::new(FirstPolicy),
            Self::Rarest => Box::new(RarestPolicy),
            Self::Synergy => Box::new(SynergyPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for PickStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PickStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        match Self::ALL.into_iter().find(|p| p.label() == lowered) {
            Some(policy) => Ok(policy),
            None => bail!("Unknown policy: {s}"),
        }
    }
}

/// Parse a comma-separated policy list; `all` expands to every strategy.
pub fn resolve_policies(tokens: &[String]) -> Result<Vec<PickStrategy>> {
    let mut policies = Vec::new();
    for token in tokens {
        if token.eq_ignore_ascii_case("all") {
            for policy in PickStrategy::ALL {
                if !policies.contains(&policy) {
                    policies.push(policy);
                }
            }
            continue;
        }
        let policy: PickStrategy = token.parse()?;
        if !policies.contains(&policy) {
            policies.push(policy);
        }
    }
    if policies.is_empty() {
        policies.push(PickStrategy::First);
    }
    Ok(policies)
}

struct FirstPolicy;
struct RarestPolicy;
struct SynergyPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

const fn rarity_rank(rarity: Rarity) -> u8 {
    match rarity {
        Rarity::Epic => 3,
        Rarity::Rare => 2,
        Rarity::Common | Rarity::Unknown => 1,
    }
}

impl BoonPolicy for FirstPolicy {
    fn name(&self) -> &'static str {
        "first"
    }

    fn pick_boon(&mut self, _held: &[Boon], _offers: &[Boon]) -> PolicyDecision {
        PolicyDecision::new(0, None)
    }
}

impl BoonPolicy for RarestPolicy {
    fn name(&self) -> &'static str {
        "rarest"
    }

    fn pick_boon(&mut self, _held: &[Boon], offers: &[Boon]) -> PolicyDecision {
        // Ties keep the earliest offer.
        let (idx, rank) = offers
            .iter()
            .enumerate()
            .map(|(idx, boon)| (idx, rarity_rank(boon.rarity)))
            .fold((0, 0), |best, cur| if cur.1 > best.1 { cur } else { best });
        PolicyDecision::new(idx, Some(format!("rank {rank}")))
    }
}

impl BoonPolicy for SynergyPolicy {
    fn name(&self) -> &'static str {
        "synergy"
    }

    fn pick_boon(&mut self, held: &[Boon], offers: &[Boon]) -> PolicyDecision {
        if let Some(idx) = offers
            .iter()
            .position(|offer| held.iter().any(|h| offer.pays_off(h)))
        {
            return PolicyDecision::new(idx, Some("payoff".to_string()));
        }
        if let Some(idx) = offers.iter().position(|offer| offer.is_seed) {
            return PolicyDecision::new(idx, Some("seed".to_string()));
        }
        PolicyDecision::new(0, Some("fallback".to_string()))
    }
}

impl BoonPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn pick_boon(&mut self, _held: &[Boon], offers: &[Boon]) -> PolicyDecision {
        if offers.is_empty() {
            return PolicyDecision::new(0, None);
        }
        PolicyDecision::new(self.rng.random_range(0..offers.len()), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maw_game::MawCatalog;

    fn boons(ids: &[&str]) -> Vec<Boon> {
        let catalog = MawCatalog::embedded();
        ids.iter()
            .map(|id| catalog.boon(id).unwrap().clone())
            .collect()
    }

    #[test]
    fn parses_labels_and_all() {
        assert_eq!("Synergy".parse::<PickStrategy>().unwrap(), PickStrategy::Synergy);
        assert!("greedy".parse::<PickStrategy>().is_err());
        let all = resolve_policies(&["first".to_string(), "all".to_string()]).unwrap();
        assert_eq!(all, PickStrategy::ALL.to_vec());
        assert_eq!(resolve_policies(&[]).unwrap(), vec![PickStrategy::First]);
    }

    #[test]
    fn rarest_prefers_epic() {
        let offers = boons(&["iron_skin", "immolate", "kindling"]);
        let mut policy = PickStrategy::Rarest.create_policy(0);
        assert_eq!(policy.pick_boon(&[], &offers).offer_index, 1);
    }

    #[test]
    fn synergy_prefers_payoff_then_seed() {
        let held = boons(&["venom_coat"]);
        let offers = boons(&["iron_skin", "bulwark", "toxic_bloom"]);
        let mut policy = PickStrategy::Synergy.create_policy(0);
        assert_eq!(policy.pick_boon(&held, &offers).offer_index, 2);
        assert_eq!(policy.pick_boon(&[], &offers).offer_index, 1);
    }

    #[test]
    fn random_is_reproducible_per_seed() {
        let offers = boons(&["iron_skin", "bulwark", "toxic_bloom"]);
        let picks = |seed| {
            let mut policy = PickStrategy::Random.create_policy(seed);
            (0..20)
                .map(|_| policy.pick_boon(&[], &offers).offer_index)
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(7), picks(7));
        assert!(picks(7).iter().all(|idx| *idx < offers.len()));
    }
}

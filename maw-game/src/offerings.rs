//! Boon offering generation.
//!
//! Offerings are a pure function of the seed and the held boons: held boons
//! are never offered again, a payoff matching a held seed boon (when one
//! exists) is guaranteed the first slot, and the rest are drawn by rarity
//! weight without replacement.
use smallvec::SmallVec;
use std::collections::HashSet;

use crate::constants::OFFERING_COUNT;
use crate::data::{Boon, BoonCatalog};
use crate::rng::{SeededRandom, Weighted};

/// Up to three offered boons, stored inline.
pub type Offerings = SmallVec<[Boon; OFFERING_COUNT]>;

#[must_use]
pub fn generate_boon_offerings(catalog: &BoonCatalog, seed: i32, held: &[Boon]) -> Offerings {
    let held_ids: HashSet<&str> = held.iter().map(|boon| boon.id.as_str()).collect();
    let mut pool: Vec<&Boon> = catalog
        .all()
        .iter()
        .filter(|boon| !held_ids.contains(boon.id.as_str()))
        .collect();
    let mut rng = SeededRandom::new(seed);
    let mut offers = Offerings::new();

    let held_seeds: Vec<&Boon> = held.iter().filter(|boon| boon.is_seed).collect();
    if !held_seeds.is_empty() {
        let payoffs: Vec<&Boon> = pool
            .iter()
            .copied()
            .filter(|boon| held_seeds.iter().any(|seed_boon| boon.pays_off(seed_boon)))
            .collect();
        if let Some(guaranteed) = rng.pick(&payoffs).copied() {
            offers.push(guaranteed.clone());
            pool.retain(|boon| boon.id != guaranteed.id);
        }
    }

    while offers.len() < OFFERING_COUNT {
        let weighted: Vec<Weighted<&Boon>> = pool
            .iter()
            .map(|boon| Weighted::new(*boon, boon.rarity.weight()))
            .collect();
        let Some(choice) = rng.weighted_pick(&weighted).copied() else {
            break;
        };
        offers.push(choice.clone());
        pool.retain(|boon| boon.id != choice.id);
    }

    offers
}

/// Ids of an offering batch, in order.
#[must_use]
pub fn offering_ids(offers: &[Boon]) -> Vec<String> {
    offers.iter().map(|boon| boon.id.clone()).collect()
}

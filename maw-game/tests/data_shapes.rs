use std::collections::HashSet;

use maw_game::constants::{BOSS_WAVE, MAX_TIER, MILESTONE_WAVES, MIN_TIER};
use maw_game::{MawCatalog, MawEngine, MawSave, Rarity, ShopStock, WavePhase};
use serde_json::{Value, json};

#[test]
fn boon_ids_are_unique_and_tags_are_consistent() {
    let catalog = MawCatalog::embedded();
    let mut ids = HashSet::new();
    for boon in catalog.all_boons() {
        assert!(ids.insert(boon.id.as_str()), "duplicate boon {}", boon.id);
        assert!(!boon.name.is_empty());
        assert!(!boon.hook.is_empty());
        assert_ne!(boon.rarity, Rarity::Unknown, "{} has a typo'd rarity", boon.id);
        assert_eq!(boon.is_seed, !boon.seed_tags.is_empty(), "{}", boon.id);
        assert_eq!(boon.is_payoff, !boon.payoff_tags.is_empty(), "{}", boon.id);
    }
}

#[test]
fn every_seed_tag_has_a_payoff() {
    let catalog = MawCatalog::embedded();
    for seed in catalog.all_boons().iter().filter(|b| b.is_seed) {
        assert!(
            !catalog.payoffs_for_seed(seed).is_empty(),
            "{} has no payoff",
            seed.id
        );
    }
}

#[test]
fn wave_table_covers_the_run() {
    let catalog = MawCatalog::embedded();
    let mut last_gold = 0;
    for wave in 1..=BOSS_WAVE {
        let cfg = catalog.wave(wave).unwrap();
        assert_eq!(cfg.phase, WavePhase::for_wave(wave));
        assert_eq!(cfg.is_milestone, MILESTONE_WAVES.contains(&wave));
        assert_eq!(cfg.milestone_gems > 0, cfg.is_milestone, "wave {wave}");
        assert!(cfg.enemy_count.min >= 1 && cfg.enemy_count.min <= cfg.enemy_count.max);
        assert!(cfg.gold > last_gold, "gold should grow by wave");
        last_gold = cfg.gold;
    }
    assert!(catalog.wave(BOSS_WAVE).unwrap().is_boss());
}

#[test]
fn tier_table_scales_upward() {
    let catalog = MawCatalog::embedded();
    let mut last_mult = 0.0;
    for tier in MIN_TIER..=MAX_TIER {
        let cfg = catalog.tier(tier).unwrap();
        assert!(cfg.reward_multiplier > last_mult);
        assert!(cfg.level_range.min <= cfg.level_range.max);
        assert!(cfg.boss_item.is_some());
        last_mult = cfg.reward_multiplier;
    }
    assert!(catalog.tier(MAX_TIER + 1).is_none());
}

#[test]
fn shop_items_are_priced_and_stocked() {
    let engine = MawEngine::default();
    let catalog = engine.catalog();
    assert!(!catalog.shop.items.is_empty());
    for item in &catalog.shop.items {
        assert!(item.cost > 0, "{} is free", item.id);
        let stock = engine.shop_item_stock(&item.id).unwrap();
        match item.max_stock {
            None => assert_eq!(stock, ShopStock::Unlimited),
            Some(max) => assert_eq!(stock, ShopStock::Limited(max)),
        }
        assert_eq!(catalog.shop_item(&item.id), Some(item));
    }
}

#[test]
fn save_record_uses_stable_field_names() {
    let engine = MawEngine::default();
    let value = serde_json::to_value(engine.save_state()).unwrap();
    assert_eq!(value["schema_version"], json!(1));
    assert_eq!(value["tier_unlocks"], json!({ "1": true }));
    assert_eq!(value["player_salt"], Value::Null);
    assert_eq!(value["active_run"], Value::Null);
    assert_eq!(value["dregs"], json!(0));
}

#[test]
fn legacy_record_without_version_loads() {
    let legacy = r#"{
        "selected_tier": 2,
        "best_depth": 7,
        "last_play_date": "2026-02-05",
        "tier_unlocks": { "2": true },
        "dregs": 340,
        "player_salt": "k9x2m1qa",
        "shop_purchases": { "healing_tonic": 2 }
    }"#;
    let record: MawSave = serde_json::from_str(legacy).unwrap();
    let mut engine = MawEngine::default();
    engine.load_state(record).unwrap();

    assert_eq!(engine.daily().selected_tier, Some(2));
    assert_eq!(engine.daily().best_depth, 7);
    assert!(engine.is_tier_unlocked(1));
    assert!(engine.is_tier_unlocked(2));
    assert_eq!(engine.permanent().dregs, 340);
    assert_eq!(
        engine.shop_item_stock("healing_tonic").unwrap(),
        ShopStock::Limited(3)
    );
    assert!(engine.active_run().is_none());
}

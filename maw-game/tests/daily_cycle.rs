use chrono::{Days, NaiveDate};
use maw_game::constants::MAX_DAYS_SKIPPED;
use maw_game::{MawEngine, MawError, MawSave, ShopReward, ShopStock};
use serde_json::json;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn salted_engine() -> MawEngine {
    let mut engine = MawEngine::default();
    engine
        .load_state(MawSave {
            player_salt: Some(Some("abc123".to_string())),
            ..MawSave::default()
        })
        .unwrap();
    engine
}

fn play_to_depth(engine: &mut MawEngine, depth: u8) {
    engine.start_run().unwrap();
    for wave in 1..=depth {
        let outcome = engine.complete_wave(json!({})).unwrap();
        if wave < depth {
            let pick = outcome.offerings()[0].id.clone();
            engine.select_boon(&pick).unwrap();
        }
    }
    engine.fail_run().unwrap();
}

#[test]
fn two_days_away_grants_two_point_eight() {
    let mut engine = salted_engine();
    let first = day(2026, 2, 4);
    engine.check_daily_reset(first);
    engine.select_tier(1, first).unwrap();

    let back = day(2026, 2, 6);
    assert!(engine.check_daily_reset(back));
    assert_eq!(engine.daily().days_skipped, 2);
    assert!((engine.rest_bonus_multiplier() - 2.8).abs() < 1e-9);
}

#[test]
fn long_absence_clamps_to_three_days() {
    let mut engine = salted_engine();
    let first = day(2026, 1, 1);
    engine.check_daily_reset(first);
    engine.select_tier(1, first).unwrap();

    let later = first.checked_add_days(Days::new(10)).unwrap();
    engine.check_daily_reset(later);
    assert_eq!(engine.daily().days_skipped, MAX_DAYS_SKIPPED);
    assert!((engine.rest_bonus_multiplier() - 3.7).abs() < 1e-9);
}

#[test]
fn clock_moving_backwards_counts_as_no_rest() {
    let mut engine = salted_engine();
    let first = day(2026, 3, 10);
    engine.check_daily_reset(first);
    engine.select_tier(1, first).unwrap();
    assert!(engine.check_daily_reset(day(2026, 3, 8)));
    assert_eq!(engine.daily().days_skipped, 0);
    assert!(!engine.daily().closed);
    assert!((engine.rest_bonus_multiplier() - 1.0).abs() < f64::EPSILON);
}

#[test]
fn reset_discards_an_unfinished_run() {
    let mut engine = salted_engine();
    let today = day(2026, 2, 6);
    engine.check_daily_reset(today);
    engine.select_tier(1, today).unwrap();
    play_to_depth(&mut engine, 3);
    engine.start_run().unwrap();
    assert!(engine.active_run().is_some());

    assert!(engine.check_daily_reset(today.succ_opt().unwrap()));
    assert!(engine.active_run().is_none());
    assert_eq!(engine.daily().best_depth, 0);
    assert_eq!(engine.daily().pending_rewards, None);
    assert_eq!(engine.daily().run_attempts, 0);
}

#[test]
fn rest_bonus_is_spent_by_closing() {
    let mut engine = salted_engine();
    let first = day(2026, 2, 3);
    engine.check_daily_reset(first);
    engine.select_tier(1, first).unwrap();

    let today = day(2026, 2, 6);
    engine.check_daily_reset(today);
    assert_eq!(engine.daily().days_skipped, 3);
    engine.select_tier(1, today).unwrap();
    play_to_depth(&mut engine, 5);

    let pending = engine.daily().pending_rewards.clone().unwrap();
    let claimed = engine.close_maw().unwrap();
    assert!((claimed.rest_multiplier - 3.7).abs() < 1e-9);
    assert!(claimed.dregs >= pending.dregs * 3);
    assert_eq!(engine.permanent().dregs, claimed.dregs);
    assert!(claimed.gems > 0, "wave 5 is a milestone");
    assert_eq!(engine.daily().days_skipped, 0);
    assert!((engine.rest_bonus_multiplier() - 1.0).abs() < f64::EPSILON);

    let tomorrow = today.succ_opt().unwrap();
    assert!(engine.check_daily_reset(tomorrow));
    assert!(!engine.daily().closed);
    assert_eq!(engine.daily().days_skipped, 1);
    assert!((engine.rest_bonus_multiplier() - 1.9).abs() < 1e-9);
}

#[test]
fn best_depth_only_moves_forward() {
    let mut engine = salted_engine();
    let today = day(2026, 2, 6);
    engine.check_daily_reset(today);
    engine.select_tier(1, today).unwrap();

    play_to_depth(&mut engine, 6);
    let best_rewards = engine.daily().pending_rewards.clone().unwrap();
    play_to_depth(&mut engine, 2);
    assert_eq!(engine.daily().best_depth, 6);
    assert_eq!(engine.daily().pending_rewards.as_ref(), Some(&best_rewards));
    assert_eq!(engine.daily().last_run_depth, 2);
    assert_eq!(engine.daily().run_attempts, 2);
}

#[test]
fn closed_maw_blocks_the_day() {
    let mut engine = salted_engine();
    let today = day(2026, 2, 6);
    engine.check_daily_reset(today);
    engine.select_tier(1, today).unwrap();
    play_to_depth(&mut engine, 1);
    engine.close_maw().unwrap();

    assert_eq!(engine.close_maw().err(), Some(MawError::AlreadyClosed));
    assert_eq!(engine.start_run().err(), Some(MawError::AlreadyClosed));
    assert!(!engine.check_daily_reset(today));
    assert!(engine.daily().closed);
}

#[test]
fn dregs_flow_into_the_shop() {
    let mut engine = salted_engine();
    engine
        .load_state(MawSave {
            dregs: Some(200),
            ..MawSave::default()
        })
        .unwrap();

    for _ in 0..5 {
        let reward = engine.purchase_shop_item("healing_tonic").unwrap();
        assert!(matches!(reward, ShopReward::Item { .. }));
    }
    assert_eq!(
        engine.purchase_shop_item("healing_tonic"),
        Err(MawError::OutOfStock("healing_tonic".to_string()))
    );
    assert!(engine.shop_item_stock("healing_tonic").unwrap().is_exhausted());
    assert_eq!(engine.permanent().dregs, 100);

    assert_eq!(
        engine.purchase_shop_item("ember_relic"),
        Err(MawError::InsufficientDregs {
            required: 250,
            available: 100
        })
    );
    assert_eq!(
        engine.purchase_shop_item("gold_cache").unwrap(),
        ShopReward::Gold { amount: 500 }
    );
    assert_eq!(engine.shop_item_stock("gold_cache"), Ok(ShopStock::Unlimited));
    assert_eq!(engine.permanent().dregs, 50);
}

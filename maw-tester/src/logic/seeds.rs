use anyhow::{Context, Result, bail};
use chrono::{Days, NaiveDate};
use maw_game::constants::{MAX_TIER, MIN_TIER};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Default session date used when `--dates` is empty.
pub const DEFAULT_DATE: &str = "2026-02-06";
/// Default salt used when `--seeds` is empty.
pub const DEFAULT_SALT: &str = "abc123";

/// Longest date range a single `--dates` token may expand to.
const MAX_RANGE_DAYS: u64 = 366;

/// Resolve salt tokens.
///
/// Literal tokens are used as-is (lowercased). `gen:N` derives `N` salts from
/// a fixed ChaCha20 stream so sweeps stay reproducible across machines.
pub fn resolve_salts(tokens: &[String]) -> Result<Vec<String>> {
    let mut salts: Vec<String> = Vec::new();
    for token in tokens {
        if let Some(count) = token.strip_prefix("gen:") {
            let count: u64 = count
                .parse()
                .with_context(|| format!("invalid salt count in {token}"))?;
            salts.extend(generated_salts(count));
            continue;
        }
        if !token.chars().all(|c| c.is_ascii_alphanumeric()) {
            bail!("Salt must be alphanumeric: {token}");
        }
        let salt = token.to_ascii_lowercase();
        if !salts.contains(&salt) {
            salts.push(salt);
        }
    }
    if salts.is_empty() {
        salts.push(DEFAULT_SALT.to_string());
    }
    Ok(salts)
}

fn generated_salts(count: u64) -> Vec<String> {
    let mut rng = ChaCha20Rng::seed_from_u64(0x4D41_5700);
    (0..count)
        .map(|_| {
            let reseed: u64 = rng.random();
            maw_game::generate_player_salt(&mut ChaCha20Rng::seed_from_u64(reseed))
        })
        .collect()
}

/// Resolve date tokens: `YYYY-MM-DD` or an inclusive `start..end` range.
pub fn resolve_dates(tokens: &[String]) -> Result<Vec<NaiveDate>> {
    let mut dates = Vec::new();
    for token in tokens {
        if let Some((start, end)) = token.split_once("..") {
            let start = parse_date(start)?;
            let end = parse_date(end)?;
            if end < start {
                bail!("Date range runs backwards: {token}");
            }
            let span = u64::try_from((end - start).num_days()).unwrap_or(0);
            if span >= MAX_RANGE_DAYS {
                bail!("Date range longer than {MAX_RANGE_DAYS} days: {token}");
            }
            dates.extend(
                (0..=span).filter_map(|offset| start.checked_add_days(Days::new(offset))),
            );
        } else {
            dates.push(parse_date(token)?);
        }
    }
    if dates.is_empty() {
        dates.push(parse_date(DEFAULT_DATE)?);
    }
    dates.sort_unstable();
    dates.dedup();
    Ok(dates)
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date {raw:?} (expected YYYY-MM-DD)"))
}

/// Resolve tier tokens; `all` expands to every tier.
pub fn resolve_tiers(tokens: &[String]) -> Result<Vec<u8>> {
    let mut tiers = Vec::new();
    for token in tokens {
        if token.eq_ignore_ascii_case("all") {
            tiers.extend(MIN_TIER..=MAX_TIER);
            continue;
        }
        let tier: u8 = token
            .parse()
            .with_context(|| format!("invalid tier {token}"))?;
        if !(MIN_TIER..=MAX_TIER).contains(&tier) {
            bail!("Tier out of range ({MIN_TIER}-{MAX_TIER}): {tier}");
        }
        tiers.push(tier);
    }
    if tiers.is_empty() {
        tiers.push(MIN_TIER);
    }
    tiers.sort_unstable();
    tiers.dedup();
    Ok(tiers)
}

//! Seeded pseudo-random generator behind every run-generation decision.
//!
//! The generator is Mulberry32: a single 32-bit word of state, advanced by a
//! fixed odd increment and finished with two xorshift-multiply rounds. Output
//! is bit-exact for a given seed and call sequence on every platform.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::numbers::{floor_f64_to_i64, floor_f64_to_usize, u64_to_f64};

const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Deterministic 32-bit generator seeded by a single signed integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRandom {
    state: u32,
}

/// An item paired with its relative selection weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Weighted<T> {
    pub item: T,
    pub weight: f64,
}

impl<T> Weighted<T> {
    #[must_use]
    pub const fn new(item: T, weight: f64) -> Self {
        Self { item, weight }
    }
}

impl SeededRandom {
    #[must_use]
    pub const fn new(seed: i32) -> Self {
        Self {
            state: seed.cast_unsigned(),
        }
    }

    /// Advance the state and return the next raw 32-bit output.
    pub const fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Uniform float in `[0, 1)`.
    pub fn next(&mut self) -> f64 {
        f64::from(self.next_u32()) / TWO_POW_32
    }

    /// Inclusive integer in `[min, max]`. Reversed bounds are swapped.
    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        let (lo, hi) = (i64::from(min.min(max)), i64::from(min.max(max)));
        let span = hi - lo + 1;
        let offset = floor_f64_to_i64(self.next() * u64_to_f64(span.unsigned_abs()));
        i32::try_from((lo + offset).clamp(lo, hi)).unwrap_or(min)
    }

    fn index(&mut self, len: usize) -> usize {
        let len_f = u64_to_f64(u64::try_from(len).unwrap_or(u64::MAX));
        floor_f64_to_usize(self.next() * len_f).min(len.saturating_sub(1))
    }

    /// Pick one element uniformly. Returns `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.index(items.len());
        items.get(idx)
    }

    /// In-place Fisher-Yates shuffle; returns the same slice for chaining.
    pub fn shuffle<'a, T>(&mut self, items: &'a mut [T]) -> &'a mut [T] {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
        items
    }

    /// True with `percent` percent probability.
    pub fn chance(&mut self, percent: f64) -> bool {
        self.next() * 100.0 < percent
    }

    /// Cumulative-subtraction weighted selection.
    ///
    /// Returns `None` only for an empty slice; floating-point drift that
    /// leaves a positive remainder falls back to the last option.
    pub fn weighted_pick<'a, T>(&mut self, options: &'a [Weighted<T>]) -> Option<&'a T> {
        let last = options.last()?;
        let total: f64 = options.iter().map(|o| o.weight).sum();
        let mut roll = self.next() * total;
        for option in options {
            roll -= option.weight;
            if roll <= 0.0 {
                return Some(&option.item);
            }
        }
        Some(&last.item)
    }
}

impl RngCore for SeededRandom {
    fn next_u32(&mut self) -> u32 {
        Self::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        let hi = u64::from(Self::next_u32(self));
        let lo = u64::from(Self::next_u32(self));
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = Self::next_u32(self).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

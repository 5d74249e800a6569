#![deny(warnings)]

//! Price formation for the simulated markets.
//!
//! A single quoting function maps (base price, total supply, total
//! demand) to a current price, a scarcity factor and a bounded
//! percentage price change. Resources and products go through the
//! exact same math so the two commodity classes share economic
//! semantics.
//!
//! The curve is deliberately saturating: scarcity feeds through
//! `s / (s + 1)`, so extreme demand/supply ratios approach a fixed
//! multiplier instead of blowing up. Anomalous inputs (NaN, infinity,
//! negatives) are sanitized to zero rather than reported as errors;
//! callers always get a finite, non-negative quote.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Scarcity ratio cap. Zero supply with live demand quotes at this
/// ratio instead of dividing by zero.
pub const SCARCITY_CAP: f64 = 10.0;

/// Price multiplier when demand is zero (glut).
pub const MIN_MULTIPLIER: f64 = 0.5;

/// Asymptotic price multiplier at extreme scarcity.
pub const MAX_MULTIPLIER: f64 = 1.5;

/// Display clamp for the cycle-over-cycle price change, in percent.
pub const MAX_CHANGE_PCT: f64 = 50.0;

/// One computed market quote.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Current market price; always finite, `>= floor`, `>= 0`.
    pub current_price: f64,
    /// Percentage delta versus the previous cycle (or the base price
    /// when no history exists). Display-only; clamped to
    /// `±MAX_CHANGE_PCT` and never fed back into the formula.
    pub price_change_pct: f64,
    /// Demand/supply ratio after capping.
    pub scarcity: f64,
    /// Total supply the quote was computed from.
    pub total_supply: f64,
}

/// Replace non-finite or negative magnitudes with zero.
fn sanitize(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// Capped demand/supply ratio. An empty market (no supply, no demand)
/// is treated as balanced-at-glut rather than scarce.
pub fn scarcity_factor(supply: f64, demand: f64) -> f64 {
    let supply = sanitize(supply);
    let demand = sanitize(demand);
    if supply <= 0.0 {
        if demand <= 0.0 {
            0.0
        } else {
            SCARCITY_CAP
        }
    } else {
        (demand / supply).min(SCARCITY_CAP)
    }
}

/// Saturating multiplier curve. Monotone non-decreasing, `m(0) =
/// MIN_MULTIPLIER`, `m(1) = 1` (a balanced market trades at base) and
/// bounded above by `MAX_MULTIPLIER`.
fn multiplier(scarcity: f64) -> f64 {
    MIN_MULTIPLIER + (MAX_MULTIPLIER - MIN_MULTIPLIER) * (scarcity / (scarcity + 1.0))
}

/// Quote a price from aggregate supply and demand.
///
/// `floor` is the configured minimum price; `prev_price` is last
/// cycle's quote, used only for the displayed percentage change.
pub fn quote(
    base_price: f64,
    floor: f64,
    supply: f64,
    demand: f64,
    prev_price: Option<f64>,
) -> PriceQuote {
    let base = sanitize(base_price);
    let floor = sanitize(floor);
    let supply = sanitize(supply);
    let scarcity = scarcity_factor(supply, demand);

    let raw = base * multiplier(scarcity);
    let current_price = raw.min(base * MAX_MULTIPLIER).max(floor);

    let reference = prev_price.map(sanitize).filter(|p| *p > 0.0).unwrap_or(base);
    let price_change_pct = if reference > 0.0 {
        ((current_price - reference) / reference * 100.0).clamp(-MAX_CHANGE_PCT, MAX_CHANGE_PCT)
    } else {
        0.0
    };

    trace!(base, supply, scarcity, current_price, "quoted");
    PriceQuote {
        current_price,
        price_change_pct,
        scarcity,
        total_supply: supply,
    }
}

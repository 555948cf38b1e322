//! Sigmoid-distributed entry ladders with risk-weighted funding.
//!
//! With no range set, level 0 sits at 0 (deepest discount) and level N-1 at
//! the current price. With `range_above`/`range_below`, levels span
//! `[current - below, current + above]`.
//!
//! Funding follows `weight[i] = (1 - risk) * norm[i] + risk * (1 - norm[i])`:
//! risk 0 favours near-market levels, 0.5 is uniform, 1 favours deep discounts.

use super::overhead::{funded_qty, OverheadModel};
use super::profit::gross_profit;
use super::sigmoid::{clamp01, floor_eps, lerp, risk_weights, sigmoid_norm_n, MIN_STEEPNESS};
use crate::domain::{EntryLevel, HorizonParams, PlanSettings};
use tracing::debug;

pub struct EntryPlanner;

impl EntryPlanner {
    /// Build the entry ladder for a position around `current_price`.
    ///
    /// Break-even uses one overhead computed at `(current_price, quantity)` for
    /// every level: overhead models portfolio-wide friction, not per-level cost.
    pub fn generate(
        current_price: f64,
        quantity: f64,
        p: &HorizonParams,
        settings: &PlanSettings,
    ) -> Vec<EntryLevel> {
        let overhead = OverheadModel::overhead(current_price, quantity, p);
        let n = p.levels();
        let steepness = settings.entry_steepness.max(MIN_STEEPNESS);
        let risk = clamp01(settings.risk_coefficient);

        let norm = sigmoid_norm_n(n, steepness);
        let (price_low, price_high) = price_range(current_price, settings);

        let weights = risk_weights(&norm, risk);
        let weight_sum: f64 = weights.iter().sum();

        let levels: Vec<EntryLevel> = norm
            .iter()
            .zip(&weights)
            .enumerate()
            .map(|(i, (&t, &w))| {
                let entry_price = floor_eps(lerp(price_low, price_high, t));
                let funding_fraction = if weight_sum != 0.0 { w / weight_sum } else { 0.0 };
                let funding = p.portfolio_pump * funding_fraction;
                let funding_qty = funded_qty(entry_price, funding);
                EntryLevel {
                    index: i,
                    entry_price,
                    break_even: OverheadModel::break_even(entry_price, overhead),
                    cost_coverage: (i + 1) as f64,
                    potential_net: gross_profit(entry_price, current_price, funding_qty),
                    funding,
                    funding_fraction,
                    funding_qty,
                }
            })
            .collect();

        debug!(
            current_price,
            levels = levels.len(),
            overhead,
            price_low,
            price_high,
            "Generated entry levels"
        );
        levels
    }
}

fn price_range(current_price: f64, settings: &PlanSettings) -> (f64, f64) {
    if settings.range_above > 0.0 || settings.range_below > 0.0 {
        (
            floor_eps(current_price - settings.range_below),
            current_price + settings.range_above,
        )
    } else {
        (0.0, current_price)
    }
}

//! Sigmoid-distributed partial exits over take-profit levels.
//!
//! ```text
//! TP[i]      = entry * (1 + eo * (i + 1))
//! cum[j]     = norm(sigmoid(steepness * (j / N - risk)))    j = 0..=N
//! sell_qty[i] = quantity * exit_fraction * (cum[i + 1] - cum[i])
//! ```
//!
//! Risk moves the curve's centre: 0 sells most at the shallow levels,
//! 1 holds most for the deep ones.

use super::overhead::OverheadModel;
use super::profit::gross_profit;
use super::sigmoid::{clamp01, sigmoid, EPSILON, MIN_STEEPNESS};
use crate::domain::{ExitLevel, HorizonParams, PendingExit, Trade};
use crate::ids::IdGenerator;
use tracing::debug;

pub struct ExitPlanner;

impl ExitPlanner {
    /// Exit schedule for `trade`.
    ///
    /// Each tranche carries the buy fee in proportion to its share of the
    /// sellable quantity; sell fees start at 0 and are filled in by the caller
    /// at execution time, followed by [`ExitPlanner::apply_fees`].
    pub fn generate(
        trade: &Trade,
        p: &HorizonParams,
        risk_coefficient: f64,
        exit_fraction: f64,
        steepness: f64,
    ) -> Vec<ExitLevel> {
        let entry = trade.price();
        let eo = OverheadModel::trade_effective_overhead(trade, p);
        let exit_fraction = clamp01(exit_fraction);
        let sellable = trade.quantity() * exit_fraction;
        let cum = cumulative_fractions(p.levels(), steepness, risk_coefficient);

        let mut cum_sold = 0.0;
        let mut levels: Vec<ExitLevel> = cum
            .windows(2)
            .enumerate()
            .map(|(i, w)| {
                let share = w[1] - w[0];
                let tp_price = entry * (1.0 + eo * (i + 1) as f64);
                let sell_qty = sellable * share;
                cum_sold += sell_qty;
                ExitLevel {
                    index: i,
                    tp_price,
                    sell_qty,
                    sell_fraction: exit_fraction * share,
                    sell_value: tp_price * sell_qty,
                    gross_profit: gross_profit(entry, tp_price, sell_qty),
                    cum_sold,
                    level_buy_fee: trade.buy_fee() * share,
                    level_sell_fee: 0.0,
                    net_profit: 0.0,
                    cum_net_profit: 0.0,
                }
            })
            .collect();
        Self::apply_fees(&mut levels);

        debug!(
            trade = %trade.id(),
            levels = levels.len(),
            sellable,
            effective_overhead = eo,
            "Generated exit levels"
        );
        levels
    }

    /// Recompute net and cumulative net profit from the per-level fees.
    ///
    /// Must be re-run whenever a level's fees change.
    pub fn apply_fees(levels: &mut [ExitLevel]) {
        let mut cum_net = 0.0;
        for level in levels.iter_mut() {
            level.net_profit = level.gross_profit - level.level_buy_fee - level.level_sell_fee;
            cum_net += level.net_profit;
            level.cum_net_profit = cum_net;
        }
    }

    /// One pending sell order per level with something to sell.
    ///
    /// Order ids are issued (acquired and committed) from `ids`.
    pub fn pending_exits(
        trade: &Trade,
        levels: &[ExitLevel],
        ids: &mut IdGenerator,
    ) -> Vec<PendingExit> {
        levels
            .iter()
            .filter(|level| level.sell_qty > EPSILON)
            .map(|level| PendingExit {
                order_id: ids.issue(),
                symbol: trade.symbol().clone(),
                trade_id: trade.id(),
                level_index: level.index,
                trigger_price: level.tp_price,
                sell_qty: level.sell_qty,
            })
            .collect()
    }
}

/// `n + 1` cumulative sell fractions, exactly 0 first and 1 last.
fn cumulative_fractions(n: usize, steepness: f64, risk_coefficient: f64) -> Vec<f64> {
    let k = steepness.max(MIN_STEEPNESS);
    let centre = clamp01(risk_coefficient);
    let raw: Vec<f64> = (0..=n)
        .map(|j| sigmoid(k * (j as f64 / n as f64 - centre)))
        .collect();
    let (lo, hi) = (raw[0], raw[n]);
    let span = hi - lo;

    let mut cum: Vec<f64> = raw
        .iter()
        .map(|&v| if span > 0.0 { (v - lo) / span } else { 0.0 })
        .collect();
    cum[0] = 0.0;
    cum[n] = 1.0;
    cum
}

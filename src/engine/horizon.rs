//! Take-profit / stop-loss horizon generation.
//!
//! Simple mode scales the position value linearly by the effective overhead:
//!
//! ```text
//! TP[i] = entry * qty * (1 + eo * (i + 1))
//! SL[i] = entry * qty * (1 - eo * (i + 1))
//! ```
//!
//! Risk-warped mode ([`HorizonEngine::level_tp`]) places each level's TP
//! between its own break-even floor and a ceiling fixed by a reference price,
//! sigmoid-distributed over `(i + 1) / (N + 1)` at half steepness. The risk
//! coefficient warps that curve the same way it warps entry funding:
//! 0 = forward (higher levels get higher TP), 0.5 = midpoint for every level,
//! 1 = inverse.

use super::overhead::OverheadModel;
use super::sigmoid::{clamp01, lerp, risk_weights, sigmoid, sigmoid_norm};
use crate::domain::{BuyTrade, HorizonLevel, HorizonParams, Trade};
use tracing::debug;

pub struct HorizonEngine;

impl HorizonEngine {
    /// Simple linear-factor horizons for one trade.
    ///
    /// Stop-losses are only produced for Buy trades when enabled, and start inactive.
    pub fn generate(trade: &Trade, p: &HorizonParams) -> Vec<HorizonLevel> {
        let base = OverheadModel::cost(trade.price(), trade.quantity());
        let eo = OverheadModel::trade_effective_overhead(trade, p);
        let with_stops = p.generate_stop_losses && trade.is_buy();

        let levels: Vec<HorizonLevel> = (0..p.levels())
            .map(|i| {
                let factor = eo * (i + 1) as f64;
                HorizonLevel {
                    index: i,
                    take_profit: base * (1.0 + factor),
                    stop_loss: if with_stops { base * (1.0 - factor) } else { 0.0 },
                    stop_loss_active: false,
                }
            })
            .collect();

        debug!(
            trade = %trade.id(),
            levels = levels.len(),
            effective_overhead = eo,
            "Generated horizon levels"
        );
        levels
    }

    /// Risk-warped horizons for one trade, scaled to absolute position values.
    ///
    /// `reference_price` of 0 falls back to the trade's own entry price.
    pub fn generate_warped(
        trade: &Trade,
        p: &HorizonParams,
        risk_coefficient: f64,
        steepness: f64,
        reference_price: f64,
    ) -> Vec<HorizonLevel> {
        let qty = trade.quantity();
        let entry = trade.price();
        let eo = OverheadModel::trade_effective_overhead(trade, p);
        let n = p.levels();
        let with_stops = p.generate_stop_losses && trade.is_buy();

        (0..n)
            .map(|i| {
                let tp = Self::level_tp(
                    entry,
                    eo,
                    p,
                    steepness,
                    i,
                    n,
                    false,
                    risk_coefficient,
                    reference_price,
                );
                let sl = if with_stops {
                    Self::level_sl(entry, eo * (i + 1) as f64, false) * qty
                } else {
                    0.0
                };
                HorizonLevel {
                    index: i,
                    take_profit: tp * qty,
                    stop_loss: sl,
                    stop_loss_active: false,
                }
            })
            .collect()
    }

    /// Per-unit take-profit for level `level_index` of `total_levels`.
    ///
    /// Returns 0 when `max_risk` is 0 (target disabled). The floor is the
    /// entry's break-even, raised to `entry * (1 + min_risk)` when `min_risk > 0`;
    /// the ceiling is `reference * (1 + max_risk)` and never sits below the floor.
    /// Shorts mirror both bounds below the entry.
    #[allow(clippy::too_many_arguments)]
    pub fn level_tp(
        entry_price: f64,
        effective_overhead: f64,
        p: &HorizonParams,
        steepness: f64,
        level_index: usize,
        total_levels: usize,
        is_short: bool,
        risk_coefficient: f64,
        reference_price: f64,
    ) -> f64 {
        if p.max_risk <= 0.0 {
            return 0.0;
        }
        let reference = if reference_price > 0.0 {
            reference_price
        } else {
            entry_price
        };

        let (floor, ceiling) = if is_short {
            let mut floor = entry_price * (1.0 - effective_overhead);
            if p.min_risk > 0.0 {
                floor = floor.min(entry_price * (1.0 - p.min_risk));
            }
            (floor, (reference * (1.0 - p.max_risk)).min(floor))
        } else {
            let mut floor = entry_price * (1.0 + effective_overhead);
            if p.min_risk > 0.0 {
                floor = floor.max(entry_price * (1.0 + p.min_risk));
            }
            (floor, (reference * (1.0 + p.max_risk)).max(floor))
        };

        let n = total_levels.max(1);
        let t = (level_index + 1) as f64 / (n + 1) as f64;
        let forward = sigmoid_norm(t, 0.5 * steepness);
        let w = risk_weights(&[forward], risk_coefficient)[0];
        lerp(floor, ceiling, w)
    }

    /// Per-unit stop-loss at `eo` below (long) or above (short) the entry.
    pub fn level_sl(entry_price: f64, effective_overhead: f64, is_short: bool) -> f64 {
        if is_short {
            entry_price * (1.0 + effective_overhead)
        } else {
            entry_price * (1.0 - effective_overhead)
        }
    }

    /// Fraction of the position sold at a stop-loss.
    pub fn stop_loss_sell_fraction(p: &HorizonParams) -> f64 {
        clamp01(p.stop_loss_fraction)
    }

    /// TP multiplier that pre-funds `sl_hedge_count` future stop-loss hits.
    ///
    /// Same shape as [`HorizonEngine::calculate_downtrend_buffer`] with both
    /// bounds scaled by the stop-loss sell fraction (a partial stop costs part
    /// of a full one).
    #[allow(clippy::too_many_arguments)]
    pub fn calculate_stop_loss_buffer(
        price: f64,
        quantity: f64,
        portfolio_pump: f64,
        effective_overhead: f64,
        min_risk: f64,
        max_risk: f64,
        sl_fraction: f64,
        sl_hedge_count: u32,
    ) -> f64 {
        let frac = clamp01(sl_fraction);
        let (lower, upper) = buffer_bounds(effective_overhead, min_risk, max_risk);
        let delta = OverheadModel::position_delta(price, quantity, portfolio_pump);
        sigmoid_buffer(delta, lower * frac, upper * frac, sl_hedge_count)
    }

    /// TP multiplier that absorbs `downtrend_count` future down-cycles.
    ///
    /// `1 + n * (lower + s(delta) * (upper - lower))` with `lower = min_risk`,
    /// `upper = max_risk` (or `eo` when `max_risk` is 0). Returns 1 when
    /// `n = 0` or nothing is deployed, saturating toward `1 + n * upper`.
    pub fn calculate_downtrend_buffer(
        price: f64,
        quantity: f64,
        portfolio_pump: f64,
        effective_overhead: f64,
        min_risk: f64,
        max_risk: f64,
        downtrend_count: u32,
    ) -> f64 {
        let (lower, upper) = buffer_bounds(effective_overhead, min_risk, max_risk);
        let delta = OverheadModel::position_delta(price, quantity, portfolio_pump);
        sigmoid_buffer(delta, lower, upper, downtrend_count)
    }

    /// Cap the stop-loss fraction so summed worst-case losses fit the capital.
    ///
    /// Worst-case loss is `sl * eo * sum(fundings)`. Unchanged when stop-losses
    /// are off or `available_capital <= 0`.
    pub fn clamp_stop_loss_fraction(
        sl_fraction: f64,
        effective_overhead: f64,
        fundings: &[f64],
        available_capital: f64,
    ) -> f64 {
        if sl_fraction <= 0.0 || available_capital <= 0.0 {
            return sl_fraction;
        }
        let exposure = effective_overhead * fundings.iter().sum::<f64>();
        if exposure <= 0.0 {
            return sl_fraction;
        }
        if sl_fraction * exposure > available_capital {
            let clamped = available_capital / exposure;
            debug!(
                requested = sl_fraction,
                clamped,
                exposure,
                available_capital,
                "Stop-loss fraction capped by available capital"
            );
            clamped
        } else {
            sl_fraction
        }
    }

    /// Copy the first horizon onto a Buy trade's TP/SL targets.
    ///
    /// The TP keeps its current sell fraction. The stop-loss sells
    /// `stop_loss_fraction` of the position; it stays inactive when that
    /// fraction is 0 or the horizon has no stop.
    pub fn apply_first_horizon(
        trade: &mut BuyTrade,
        levels: &[HorizonLevel],
        stop_loss_fraction: f64,
    ) {
        let Some(first) = levels.first() else {
            return;
        };
        trade.take_profit.price = first.take_profit;
        let fraction = if first.stop_loss > 0.0 {
            clamp01(stop_loss_fraction)
        } else {
            0.0
        };
        trade.set_stop_loss(first.stop_loss, fraction);
    }
}

fn buffer_bounds(effective_overhead: f64, min_risk: f64, max_risk: f64) -> (f64, f64) {
    let lower = min_risk;
    let upper = if max_risk > 0.0 {
        max_risk
    } else {
        effective_overhead
    };
    (lower, upper.max(lower))
}

/// `1 + n * (lower + (2 * sigmoid(delta) - 1) * (upper - lower))`.
fn sigmoid_buffer(delta: f64, lower: f64, upper: f64, n: u32) -> f64 {
    if n == 0 || delta <= 0.0 {
        return 1.0;
    }
    let s = 2.0 * sigmoid(delta) - 1.0;
    1.0 + f64::from(n) * (lower + s * (upper - lower))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CoveredSell, Symbol, TradeId};

    fn scenario_trade() -> Trade {
        BuyTrade::new(TradeId::new(1), Symbol::new("BTC"), 100.0, 2.0).into()
    }

    fn scenario_params(surplus_rate: f64) -> HorizonParams {
        HorizonParams {
            fee_spread: 0.001,
            fee_hedging_coefficient: 1.0,
            delta_time: 1.0,
            symbol_count: 1,
            portfolio_pump: 1000.0,
            coefficient_k: 0.0,
            surplus_rate,
            horizon_count: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_scenario_without_surplus() {
        let levels = HorizonEngine::generate(&scenario_trade(), &scenario_params(0.0));
        assert_eq!(levels.len(), 3);
        assert!((levels[0].take_profit - 200.2).abs() < 1e-4);
        assert!((levels[1].take_profit - 200.4).abs() < 1e-4);
        assert!((levels[2].take_profit - 200.6).abs() < 1e-4);
        assert!(levels.iter().all(|l| l.stop_loss == 0.0 && !l.stop_loss_active));
    }

    #[test]
    fn test_generate_scenario_with_surplus_follows_formula() {
        let p = scenario_params(0.02);
        let eo = OverheadModel::effective_overhead(100.0, 2.0, &p);
        assert!((eo - 0.02100002).abs() < 1e-12);
        let levels = HorizonEngine::generate(&scenario_trade(), &p);
        for (i, level) in levels.iter().enumerate() {
            let expected = 200.0 * (1.0 + eo * (i + 1) as f64);
            assert!((level.take_profit - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_generate_stop_losses_for_buy_only() {
        let p = HorizonParams {
            generate_stop_losses: true,
            ..scenario_params(0.0)
        };
        let levels = HorizonEngine::generate(&scenario_trade(), &p);
        assert!((levels[0].stop_loss - 199.8).abs() < 1e-4);
        for w in levels.windows(2) {
            assert!(w[1].take_profit > w[0].take_profit);
            assert!(w[1].stop_loss < w[0].stop_loss);
        }
        assert!(levels.iter().all(|l| !l.stop_loss_active));

        let sell: Trade =
            CoveredSell::new(TradeId::new(2), Symbol::new("BTC"), TradeId::new(1), 110.0, 1.0)
                .into();
        let levels = HorizonEngine::generate(&sell, &p);
        assert!(levels.iter().all(|l| l.stop_loss == 0.0));
    }

    #[test]
    fn test_generate_zero_horizon_count_yields_one_level() {
        let p = HorizonParams {
            horizon_count: 0,
            ..scenario_params(0.0)
        };
        assert_eq!(HorizonEngine::generate(&scenario_trade(), &p).len(), 1);
    }

    #[test]
    fn test_level_tp_disabled_without_max_risk() {
        let p = scenario_params(0.0);
        assert_eq!(
            HorizonEngine::level_tp(100.0, 0.01, &p, 6.0, 0, 3, false, 0.0, 0.0),
            0.0
        );
    }

    #[test]
    fn test_level_tp_within_floor_and_ceiling() {
        let p = HorizonParams {
            max_risk: 0.2,
            ..Default::default()
        };
        for i in 0..5 {
            let tp = HorizonEngine::level_tp(100.0, 0.01, &p, 6.0, i, 5, false, 0.0, 0.0);
            assert!(tp > 101.0 && tp < 120.0, "level {} tp {}", i, tp);
        }
    }

    #[test]
    fn test_level_tp_min_risk_raises_floor() {
        let p = HorizonParams {
            max_risk: 0.2,
            min_risk: 0.05,
            ..Default::default()
        };
        for i in 0..4 {
            for risk in [0.0, 0.5, 1.0] {
                let tp = HorizonEngine::level_tp(100.0, 0.01, &p, 6.0, i, 4, false, risk, 0.0);
                assert!(tp >= 105.0);
            }
        }
    }

    #[test]
    fn test_level_tp_reference_fixes_ceiling() {
        let p = HorizonParams {
            max_risk: 0.5,
            ..Default::default()
        };
        // Inverse risk on the first level sits near the ceiling, which comes from the reference.
        let low = HorizonEngine::level_tp(10.0, 0.0, &p, 6.0, 0, 3, false, 1.0, 100.0);
        let legacy = HorizonEngine::level_tp(10.0, 0.0, &p, 6.0, 0, 3, false, 1.0, 0.0);
        assert!(low > 100.0);
        assert!(legacy < 15.0);
    }

    #[test]
    fn test_level_tp_short_mirrors_below_entry() {
        let p = HorizonParams {
            max_risk: 0.2,
            ..Default::default()
        };
        let tp = HorizonEngine::level_tp(100.0, 0.01, &p, 6.0, 1, 3, true, 0.0, 0.0);
        assert!(tp < 99.0 && tp > 80.0);
    }

    #[test]
    fn test_level_sl() {
        assert!((HorizonEngine::level_sl(100.0, 0.05, false) - 95.0).abs() < 1e-9);
        assert!((HorizonEngine::level_sl(100.0, 0.05, true) - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_stop_loss_sell_fraction_clamped() {
        for (input, expected) in [(1.7, 1.0), (-0.2, 0.0), (0.25, 0.25)] {
            let p = HorizonParams {
                stop_loss_fraction: input,
                ..Default::default()
            };
            assert_eq!(HorizonEngine::stop_loss_sell_fraction(&p), expected);
        }
    }

    #[test]
    fn test_downtrend_buffer_edges() {
        // disabled
        assert_eq!(
            HorizonEngine::calculate_downtrend_buffer(100.0, 2.0, 1000.0, 0.01, 0.01, 0.1, 0),
            1.0
        );
        // nothing deployed
        assert_eq!(
            HorizonEngine::calculate_downtrend_buffer(100.0, 2.0, 0.0, 0.01, 0.01, 0.1, 2),
            1.0
        );
        // saturates toward 1 + n * upper
        let big = HorizonEngine::calculate_downtrend_buffer(1e6, 1e3, 1.0, 0.01, 0.01, 0.1, 2);
        assert!((big - 1.2).abs() < 1e-9);
        // between bounds for moderate positions
        let mid = HorizonEngine::calculate_downtrend_buffer(100.0, 2.0, 1000.0, 0.01, 0.01, 0.1, 2);
        assert!(mid > 1.02 && mid < 1.2);
    }

    #[test]
    fn test_downtrend_buffer_falls_back_to_eo() {
        let a = HorizonEngine::calculate_downtrend_buffer(1e6, 1e3, 1.0, 0.03, 0.0, 0.0, 1);
        assert!((a - 1.03).abs() < 1e-9);
    }

    #[test]
    fn test_stop_loss_buffer_scales_by_fraction() {
        let full = HorizonEngine::calculate_stop_loss_buffer(1e6, 1e3, 1.0, 0.01, 0.0, 0.1, 1.0, 1);
        let quarter =
            HorizonEngine::calculate_stop_loss_buffer(1e6, 1e3, 1.0, 0.01, 0.0, 0.1, 0.25, 1);
        assert!((full - 1.1).abs() < 1e-9);
        assert!((quarter - 1.025).abs() < 1e-9);
        assert_eq!(
            HorizonEngine::calculate_stop_loss_buffer(1e6, 1e3, 1.0, 0.01, 0.0, 0.1, 1.0, 0),
            1.0
        );
    }

    #[test]
    fn test_clamp_stop_loss_fraction() {
        let fundings = [100.0, 200.0, 700.0];
        // exposure = 0.1 * 1000 = 100; worst = 1.0 * 100 > 50
        let clamped = HorizonEngine::clamp_stop_loss_fraction(1.0, 0.1, &fundings, 50.0);
        assert!((clamped - 0.5).abs() < 1e-12);
        // fits
        assert_eq!(
            HorizonEngine::clamp_stop_loss_fraction(0.4, 0.1, &fundings, 50.0),
            0.4
        );
        // off / no capital
        assert_eq!(HorizonEngine::clamp_stop_loss_fraction(0.0, 0.1, &fundings, 50.0), 0.0);
        assert_eq!(HorizonEngine::clamp_stop_loss_fraction(1.0, 0.1, &fundings, 0.0), 1.0);
        assert_eq!(HorizonEngine::clamp_stop_loss_fraction(1.0, 0.1, &[], 50.0), 1.0);
    }

    #[test]
    fn test_apply_first_horizon() {
        let p = HorizonParams {
            generate_stop_losses: true,
            stop_loss_fraction: 0.4,
            ..scenario_params(0.0)
        };
        let trade = scenario_trade();
        let levels = HorizonEngine::generate(&trade, &p);
        let mut buy = trade.as_buy().cloned().unwrap();
        let fraction = HorizonEngine::stop_loss_sell_fraction(&p);
        HorizonEngine::apply_first_horizon(&mut buy, &levels, fraction);
        assert_eq!(buy.take_profit.price, levels[0].take_profit);
        assert_eq!(buy.stop_loss.price, levels[0].stop_loss);
        assert_eq!(buy.stop_loss.fraction, 0.4);
        assert!(buy.stop_loss.active);

        let before = buy.clone();
        HorizonEngine::apply_first_horizon(&mut buy, &[], 0.0);
        assert_eq!(buy, before);
    }

    #[test]
    fn test_apply_first_horizon_keeps_stop_inactive() {
        let trade = scenario_trade();
        let mut buy = trade.as_buy().cloned().unwrap();

        // stops requested but none generated
        let levels = HorizonEngine::generate(&trade, &scenario_params(0.0));
        HorizonEngine::apply_first_horizon(&mut buy, &levels, 1.0);
        assert!(!buy.stop_loss.active);
        assert_eq!(buy.stop_loss.fraction, 0.0);

        // stops generated but not activated
        let p = HorizonParams {
            generate_stop_losses: true,
            ..scenario_params(0.0)
        };
        let levels = HorizonEngine::generate(&trade, &p);
        HorizonEngine::apply_first_horizon(&mut buy, &levels, 0.0);
        assert!(!buy.stop_loss.active);
        assert!(buy.stop_loss.price > 0.0);
    }

    #[test]
    fn test_generate_warped_scales_by_quantity() {
        let p = HorizonParams {
            max_risk: 0.1,
            ..scenario_params(0.0)
        };
        let trade = scenario_trade();
        let levels = HorizonEngine::generate_warped(&trade, &p, 0.0, 6.0, 0.0);
        let eo = OverheadModel::trade_effective_overhead(&trade, &p);
        for level in &levels {
            let unit = HorizonEngine::level_tp(100.0, eo, &p, 6.0, level.index, 3, false, 0.0, 0.0);
            assert!((level.take_profit - unit * 2.0).abs() < 1e-9);
        }
        for w in levels.windows(2) {
            assert!(w[1].take_profit > w[0].take_profit);
        }
    }
}

//! Fee/portfolio overhead model.
//!
//! ```text
//! fee       = feeSpread * feeHedgingCoefficient * deltaTime
//! overhead  = fee * symbolCount * (1 + futureTradeCount)
//!           / ((price / quantity) * portfolioPump + coefficientK)
//! effective = overhead + surplusRate * feeHedgingCoefficient * deltaTime + fee
//! delta     = (price * quantity) / portfolioPump
//! ```
//!
//! Every zero divisor yields 0 rather than a fault.

use crate::domain::{HorizonParams, Trade};

pub struct OverheadModel;

impl OverheadModel {
    /// Time-scaled, hedged fee spread.
    pub fn fee_component(p: &HorizonParams) -> f64 {
        p.fee_spread * p.fee_hedging_coefficient * p.delta_time
    }

    /// Fraction a position at `price`/`quantity` must gain to cover modeled fees.
    pub fn overhead(price: f64, quantity: f64, p: &HorizonParams) -> f64 {
        let unit_ratio = if quantity != 0.0 { price / quantity } else { 0.0 };
        let denominator = unit_ratio * p.portfolio_pump + p.coefficient_k;
        if denominator == 0.0 {
            return 0.0;
        }
        let amortized_trades = 1.0 + f64::from(p.future_trade_count);
        Self::fee_component(p) * f64::from(p.symbol_count) * amortized_trades / denominator
    }

    /// Overhead plus margin: the gain needed before a position is profitable.
    pub fn effective_overhead(price: f64, quantity: f64, p: &HorizonParams) -> f64 {
        Self::overhead(price, quantity, p)
            + p.surplus_rate * p.fee_hedging_coefficient * p.delta_time
            + Self::fee_component(p)
    }

    pub fn trade_overhead(trade: &Trade, p: &HorizonParams) -> f64 {
        Self::overhead(trade.price(), trade.quantity(), p)
    }

    pub fn trade_effective_overhead(trade: &Trade, p: &HorizonParams) -> f64 {
        Self::effective_overhead(trade.price(), trade.quantity(), p)
    }

    /// Position weight relative to deployable capital.
    pub fn position_delta(price: f64, quantity: f64, portfolio_pump: f64) -> f64 {
        if portfolio_pump == 0.0 {
            return 0.0;
        }
        price * quantity / portfolio_pump
    }

    /// Additional quantity the pump's capital buys at `price`.
    pub fn funded_quantity(price: f64, p: &HorizonParams) -> f64 {
        funded_qty(price, p.portfolio_pump)
    }

    /// Held quantity plus what the pump would add at the trade's price.
    pub fn total_quantity(trade: &Trade, p: &HorizonParams) -> f64 {
        trade.quantity() + Self::funded_quantity(trade.price(), p)
    }

    pub fn break_even(price: f64, overhead: f64) -> f64 {
        price * (1.0 + overhead)
    }

    pub fn cost(price: f64, quantity: f64) -> f64 {
        price * quantity
    }
}

/// Units `funds` buys at `price`; 0 for a non-positive price.
pub(crate) fn funded_qty(price: f64, funds: f64) -> f64 {
    if price > 0.0 {
        funds / price
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BuyTrade, Symbol, TradeId};

    fn scenario_params() -> HorizonParams {
        HorizonParams {
            fee_spread: 0.001,
            fee_hedging_coefficient: 1.0,
            delta_time: 1.0,
            symbol_count: 1,
            portfolio_pump: 1000.0,
            coefficient_k: 0.0,
            surplus_rate: 0.02,
            ..Default::default()
        }
    }

    #[test]
    fn test_overhead_scenario() {
        let oh = OverheadModel::overhead(100.0, 2.0, &scenario_params());
        assert!((oh - 2e-8).abs() < 1e-20);
    }

    #[test]
    fn test_effective_overhead_scenario() {
        let eo = OverheadModel::effective_overhead(100.0, 2.0, &scenario_params());
        assert!((eo - (2e-8 + 0.02 + 0.001)).abs() < 1e-15);
    }

    #[test]
    fn test_overhead_zero_denominator() {
        let p = HorizonParams {
            fee_spread: 0.01,
            ..Default::default()
        };
        // pump 0 and K 0
        assert_eq!(OverheadModel::overhead(100.0, 2.0, &p), 0.0);
        // quantity 0 and K 0
        let p = HorizonParams {
            portfolio_pump: 1000.0,
            ..p
        };
        assert_eq!(OverheadModel::overhead(100.0, 0.0, &p), 0.0);
    }

    #[test]
    fn test_overhead_quantity_zero_uses_k() {
        let p = HorizonParams {
            fee_spread: 0.01,
            portfolio_pump: 1000.0,
            coefficient_k: 2.0,
            ..Default::default()
        };
        assert!((OverheadModel::overhead(100.0, 0.0, &p) - 0.005).abs() < 1e-15);
    }

    #[test]
    fn test_future_trades_scale_overhead() {
        let base = scenario_params();
        let amortized = HorizonParams {
            future_trade_count: 3,
            ..scenario_params()
        };
        let a = OverheadModel::overhead(100.0, 2.0, &base);
        let b = OverheadModel::overhead(100.0, 2.0, &amortized);
        assert!((b - 4.0 * a).abs() < 1e-20);
    }

    #[test]
    fn test_position_delta_and_funded_quantity() {
        assert_eq!(OverheadModel::position_delta(100.0, 2.0, 1000.0), 0.2);
        assert_eq!(OverheadModel::position_delta(100.0, 2.0, 0.0), 0.0);

        let p = scenario_params();
        assert_eq!(OverheadModel::funded_quantity(50.0, &p), 20.0);
        assert_eq!(OverheadModel::funded_quantity(0.0, &p), 0.0);
        assert_eq!(OverheadModel::funded_quantity(-1.0, &p), 0.0);
    }

    #[test]
    fn test_total_quantity() {
        let trade: Trade = BuyTrade::new(TradeId::new(1), Symbol::new("BTC"), 100.0, 2.0).into();
        assert_eq!(OverheadModel::total_quantity(&trade, &scenario_params()), 12.0);
    }

    #[test]
    fn test_break_even() {
        assert!((OverheadModel::break_even(100.0, 0.01) - 101.0).abs() < 1e-12);
    }
}

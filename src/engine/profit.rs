//! Gross/net profit and ROI.

use crate::domain::{BuyTrade, CoveredSell, ProfitResult, Trade};

pub struct ProfitCalculator;

impl ProfitCalculator {
    /// Profit for `quantity` units of `trade` marked at `current_price`.
    ///
    /// Covered sells are scored as shorts (gross sign flips). ROI is a
    /// percentage of `entry * quantity + buy_fees`, 0 when that cost is 0.
    pub fn calculate_for_qty(
        trade: &Trade,
        current_price: f64,
        quantity: f64,
        buy_fees: f64,
        sell_fees: f64,
    ) -> ProfitResult {
        let gross = trade.side().sign() * gross_profit(trade.price(), current_price, quantity);
        let cost = trade.price() * quantity + buy_fees;
        result(gross, buy_fees + sell_fees, cost)
    }

    /// Full position with the trade's own stored fees.
    pub fn calculate(trade: &Trade, current_price: f64) -> ProfitResult {
        Self::calculate_for_qty(
            trade,
            current_price,
            trade.quantity(),
            trade.buy_fee(),
            trade.sell_fee(),
        )
    }

    /// Full position with caller-supplied fees.
    pub fn calculate_with_fees(
        trade: &Trade,
        current_price: f64,
        buy_fees: f64,
        sell_fees: f64,
    ) -> ProfitResult {
        Self::calculate_for_qty(trade, current_price, trade.quantity(), buy_fees, sell_fees)
    }

    /// Realized profit of a covered sell against its parent's entry price.
    pub fn child_profit(sell: &CoveredSell, parent_entry_price: f64) -> ProfitResult {
        let gross = gross_profit(parent_entry_price, sell.price, sell.quantity);
        let cost = parent_entry_price * sell.quantity + sell.buy_fee;
        result(gross, sell.buy_fee + sell.sell_fee, cost)
    }

    /// Unrealized profit on the unsold part of a buy.
    ///
    /// The buy fee is pro-rated to `remaining`; no sell fee is assumed.
    pub fn unrealized(buy: &BuyTrade, current_price: f64, remaining: f64) -> ProfitResult {
        let buy_fee = prorated_buy_fee(buy, remaining);
        let gross = gross_profit(buy.entry_price, current_price, remaining);
        result(gross, buy_fee, buy.entry_price * remaining + buy_fee)
    }
}

/// `(exit - entry) * quantity`.
#[inline]
pub fn gross_profit(entry_price: f64, exit_price: f64, quantity: f64) -> f64 {
    (exit_price - entry_price) * quantity
}

/// Share of a buy's fee attributable to `remaining` units.
pub fn prorated_buy_fee(buy: &BuyTrade, remaining: f64) -> f64 {
    if buy.quantity > 0.0 {
        buy.buy_fee * remaining / buy.quantity
    } else {
        0.0
    }
}

fn result(gross: f64, fees: f64, cost: f64) -> ProfitResult {
    let net = gross - fees;
    ProfitResult {
        gross_profit: gross,
        net_profit: net,
        roi: if cost != 0.0 { net / cost * 100.0 } else { 0.0 },
    }
}

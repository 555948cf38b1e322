//! Market-price checks against stored targets.
//!
//! A take-profit is hit when the price reaches the per-unit TP, a stop-loss is
//! breached when the price falls to the per-unit SL. Only active targets fire.

use serde::{Deserialize, Serialize};

use crate::domain::{
    BuyTrade, EntryPoint, HorizonLevel, PendingExit, ProfitResult, Symbol, TradeId,
};
use crate::engine::ProfitCalculator;
use crate::ledger::PositionLedger;
use crate::prices::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    TakeProfit,
    StopLoss,
}

/// A sell the caller should execute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub kind: TriggerKind,
    pub trade_id: TradeId,
    pub symbol: Symbol,
    pub market_price: f64,
    pub sell_qty: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopStatus {
    /// No stop-loss at this level.
    None,
    /// Stop-loss set but inactive.
    Off,
    Ok,
    Breached,
}

/// One stored horizon level checked against the market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonCheck {
    pub index: usize,
    pub take_profit: f64,
    pub tp_hit: bool,
    /// `take_profit - market` while not hit, else 0.
    pub tp_distance: f64,
    pub stop_loss: f64,
    pub sl_status: StopStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeCheck {
    pub trade_id: TradeId,
    pub symbol: Symbol,
    pub entry_price: f64,
    pub remaining: f64,
    pub market_price: f64,
    pub profit: ProfitResult,
    pub tp_price: f64,
    pub tp_hit: bool,
    pub sl_price: f64,
    pub sl_hit: bool,
    pub horizons: Vec<HorizonCheck>,
    pub triggers: Vec<Trigger>,
}

/// Result of checking a whole ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceCheck {
    pub trades: Vec<TradeCheck>,
    pub exits: Vec<PendingExit>,
    /// Stored entry points the market has reached.
    pub entries: Vec<EntryPoint>,
}

impl PriceCheck {
    pub fn triggers(&self) -> impl Iterator<Item = &Trigger> {
        self.trades.iter().flat_map(|t| t.triggers.iter())
    }
}

pub struct TriggerEvaluator;

impl TriggerEvaluator {
    /// Check one Buy at `market_price`.
    ///
    /// `None` when nothing remains or the price is not positive. Profit is on
    /// the remaining quantity with a pro-rated buy fee and no sell fee.
    pub fn check_trade(
        buy: &BuyTrade,
        remaining: f64,
        market_price: f64,
        horizons: &[HorizonLevel],
    ) -> Option<TradeCheck> {
        if remaining <= 0.0 || market_price <= 0.0 {
            return None;
        }

        let tp = &buy.take_profit;
        let sl = &buy.stop_loss;
        let tp_price = if tp.active { tp.per_unit(buy.quantity) } else { 0.0 };
        let sl_price = if sl.active { sl.per_unit(buy.quantity) } else { 0.0 };
        let tp_hit = tp_price > 0.0 && market_price >= tp_price;
        let sl_hit = sl_price > 0.0 && market_price <= sl_price;

        let mut triggers = Vec::new();
        if tp_hit && tp.fraction > 0.0 {
            triggers.push(Trigger {
                kind: TriggerKind::TakeProfit,
                trade_id: buy.id,
                symbol: buy.symbol.clone(),
                market_price,
                sell_qty: remaining * tp.fraction,
            });
        }
        if sl_hit && sl.fraction > 0.0 {
            triggers.push(Trigger {
                kind: TriggerKind::StopLoss,
                trade_id: buy.id,
                symbol: buy.symbol.clone(),
                market_price,
                sell_qty: remaining * sl.fraction,
            });
        }

        Some(TradeCheck {
            trade_id: buy.id,
            symbol: buy.symbol.clone(),
            entry_price: buy.entry_price,
            remaining,
            market_price,
            profit: ProfitCalculator::unrealized(buy, market_price, remaining),
            tp_price,
            tp_hit,
            sl_price,
            sl_hit,
            horizons: horizons
                .iter()
                .map(|level| check_horizon(level, buy.quantity, market_price))
                .collect(),
            triggers,
        })
    }

    /// Pending exits whose trigger price has been reached.
    pub fn triggered_exits<'a, F>(
        pending: &'a [PendingExit],
        price_for: F,
    ) -> Vec<&'a PendingExit>
    where
        F: Fn(&Symbol) -> Option<f64>,
    {
        pending
            .iter()
            .filter(|exit| {
                price_for(&exit.symbol)
                    .map(|price| price > 0.0 && price >= exit.trigger_price)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Untraded entry points the market has reached: at or below the entry
    /// for longs, at or above it for shorts.
    pub fn triggered_entries(points: &[EntryPoint], market_price: f64) -> Vec<&EntryPoint> {
        points
            .iter()
            .filter(|ep| entry_reached(ep, market_price))
            .collect()
    }

    /// Check every open Buy and pending exit against the latest prices.
    pub fn scan(ledger: &PositionLedger, prices: &PriceSeries) -> PriceCheck {
        let trades = ledger
            .buys()
            .filter_map(|buy| {
                let price = prices.latest(&buy.symbol)?;
                let remaining = ledger.remaining_quantity(buy.id).ok()?;
                Self::check_trade(buy, remaining, price, ledger.horizons(buy.id))
            })
            .collect();
        let exits = Self::triggered_exits(ledger.pending_exits(), |sym| prices.latest(sym))
            .into_iter()
            .cloned()
            .collect();
        let entries = ledger
            .entry_points()
            .filter(|ep| {
                prices
                    .latest(&ep.symbol)
                    .is_some_and(|price| entry_reached(ep, price))
            })
            .cloned()
            .collect();

        let check = PriceCheck {
            trades,
            exits,
            entries,
        };
        tracing::debug!(
            trades = check.trades.len(),
            triggers = check.triggers().count(),
            exits = check.exits.len(),
            entries = check.entries.len(),
            "Price check complete"
        );
        check
    }
}

fn entry_reached(point: &EntryPoint, market_price: f64) -> bool {
    if point.traded || market_price <= 0.0 {
        return false;
    }
    if point.is_short {
        market_price >= point.level.entry_price
    } else {
        market_price <= point.level.entry_price
    }
}

fn check_horizon(level: &HorizonLevel, quantity: f64, market_price: f64) -> HorizonCheck {
    let per_unit = |total: f64| if quantity > 0.0 { total / quantity } else { 0.0 };
    let take_profit = per_unit(level.take_profit);
    let stop_loss = if level.stop_loss > 0.0 { per_unit(level.stop_loss) } else { 0.0 };
    let tp_hit = take_profit > 0.0 && market_price >= take_profit;

    let sl_status = if stop_loss <= 0.0 {
        StopStatus::None
    } else if !level.stop_loss_active {
        StopStatus::Off
    } else if market_price <= stop_loss {
        StopStatus::Breached
    } else {
        StopStatus::Ok
    };

    HorizonCheck {
        index: level.index,
        take_profit,
        tp_hit,
        tp_distance: if tp_hit || take_profit <= 0.0 { 0.0 } else { take_profit - market_price },
        stop_loss,
        sl_status,
    }
}

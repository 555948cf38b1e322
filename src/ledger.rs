//! In-memory trade book with a wallet.
//!
//! Enforces the covered-sell invariants: a covered sell references an
//! existing Buy of the same symbol, and the quantity sold against a Buy
//! never exceeds the Buy's own quantity. Trade ids, pending-exit order ids
//! and entry-point ids come from three independent [`IdGenerator`]s, so
//! deleted ids are reissued.
//!
//! Executing an entry point debits the wallet; filling a pending exit credits
//! it with the sale proceeds and records the realized profit.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{
    BuyTrade, CoveredSell, EntryPoint, ExitLevel, HorizonLevel, HorizonParams, PendingExit,
    ProfitResult, Symbol, Timestamp, Trade, TradeId,
};
use crate::engine::sigmoid::EPSILON;
use crate::engine::{prorated_buy_fee, ExitPlanner, HorizonEngine, ProfitCalculator};
use crate::error::EngineError;
use crate::ids::IdGenerator;

/// Over-sell tolerance for float noise in summed child quantities.
const OVERSELL_TOLERANCE: f64 = 1e-9;

/// Execution details for a new trade; the ledger assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeInput {
    pub symbol: Symbol,
    pub price: f64,
    pub quantity: f64,
    #[serde(default)]
    pub buy_fee: f64,
    #[serde(default)]
    pub sell_fee: f64,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}

impl TradeInput {
    pub fn new(symbol: impl AsRef<str>, price: f64, quantity: f64) -> Self {
        Self {
            symbol: Symbol::new(symbol),
            price,
            quantity,
            buy_fee: 0.0,
            sell_fee: 0.0,
            timestamp: None,
        }
    }

    pub fn with_fees(mut self, buy_fee: f64, sell_fee: f64) -> Self {
        self.buy_fee = buy_fee;
        self.sell_fee = sell_fee;
        self
    }

    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Realized and unrealized profit of one Buy and its covered sells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub trade_id: TradeId,
    pub symbol: Symbol,
    pub quantity: f64,
    pub sold: f64,
    pub remaining: f64,
    pub realized: ProfitResult,
    pub unrealized: ProfitResult,
    pub combined_net: f64,
}

/// Realized profit of one filled exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlRecord {
    pub sell_id: TradeId,
    pub parent_id: TradeId,
    pub symbol: Symbol,
    pub entry_price: f64,
    pub sell_price: f64,
    pub quantity: f64,
    pub gross_profit: f64,
    pub net_profit: f64,
    /// Running total of net profit up to and including this record.
    pub cum_profit: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PositionLedger {
    trades: BTreeMap<TradeId, Trade>,
    horizons: HashMap<TradeId, Vec<HorizonLevel>>,
    exit_plans: HashMap<TradeId, Vec<ExitLevel>>,
    pending: Vec<PendingExit>,
    entries: BTreeMap<u64, EntryPoint>,
    released: HashMap<TradeId, f64>,
    pnl: Vec<PnlRecord>,
    wallet: f64,
    trade_ids: IdGenerator,
    order_ids: IdGenerator,
    entry_ids: IdGenerator,
}

/// Quantities must be finite and strictly positive.
fn check_quantity(quantity: f64) -> Result<f64, EngineError> {
    if quantity.is_finite() && quantity > 0.0 {
        Ok(quantity)
    } else {
        Err(EngineError::NonPositiveQuantity(quantity))
    }
}

fn check_amount(amount: f64) -> Result<f64, EngineError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(EngineError::NonPositiveAmount(amount))
    }
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted trades, seeding the id allocator.
    ///
    /// Ids must be unique. Covered sells are validated against the loaded
    /// Buys and stored with their clamped quantity.
    pub fn from_trades<I>(trades: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = Trade>,
    {
        let mut ledger = Self::new();
        let (buys, sells): (Vec<Trade>, Vec<Trade>) =
            trades.into_iter().partition(|t| t.is_buy());
        for trade in buys {
            ledger.insert_loaded(trade)?;
        }
        for mut trade in sells {
            if ledger.trades.contains_key(&trade.id()) {
                return Err(EngineError::DuplicateTradeId(trade.id()));
            }
            if let Trade::CoveredSell(sell) = &mut trade {
                sell.quantity =
                    ledger.check_covered_sell(sell.parent_id, &sell.symbol, sell.quantity)?;
            }
            ledger.insert_loaded(trade)?;
        }
        info!(trades = ledger.trades.len(), "Loaded ledger");
        Ok(ledger)
    }

    fn insert_loaded(&mut self, trade: Trade) -> Result<(), EngineError> {
        let id = trade.id();
        if self.trades.contains_key(&id) {
            return Err(EngineError::DuplicateTradeId(id));
        }
        self.trade_ids.seed_single(id.as_u64());
        self.trades.insert(id, trade);
        Ok(())
    }

    /// Reserve ids that exist outside this ledger so they are never issued.
    pub fn reserve_trade_ids<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = u64>,
    {
        for id in ids {
            self.trade_ids.seed_single(id);
        }
    }

    pub fn record_buy(&mut self, input: TradeInput) -> Result<TradeId, EngineError> {
        check_quantity(input.quantity)?;
        let id = self.trade_ids.acquire();
        let trade_id = TradeId::new(id);
        let mut buy = BuyTrade::new(trade_id, input.symbol, input.price, input.quantity)
            .with_fees(input.buy_fee, input.sell_fee);
        buy.timestamp = input.timestamp;
        self.trade_ids.commit(id);

        info!(
            trade = %trade_id,
            symbol = %buy.symbol,
            price = buy.entry_price,
            quantity = buy.quantity,
            "Recorded buy"
        );
        self.trades.insert(trade_id, buy.into());
        Ok(trade_id)
    }

    /// Sell part of a Buy. A quantity within tolerance above the remaining
    /// quantity is clamped to it.
    pub fn record_covered_sell(
        &mut self,
        parent_id: TradeId,
        input: TradeInput,
    ) -> Result<TradeId, EngineError> {
        let quantity = self.check_covered_sell(parent_id, &input.symbol, input.quantity)?;

        let id = self.trade_ids.acquire();
        let trade_id = TradeId::new(id);
        let mut sell = CoveredSell::new(trade_id, input.symbol, parent_id, input.price, quantity)
            .with_fees(input.buy_fee, input.sell_fee);
        sell.timestamp = input.timestamp;
        self.trade_ids.commit(id);

        info!(
            trade = %trade_id,
            parent = %parent_id,
            symbol = %sell.symbol,
            price = sell.price,
            quantity,
            "Recorded covered sell"
        );
        self.trades.insert(trade_id, sell.into());
        Ok(trade_id)
    }

    /// Validate a covered sell and return its (possibly clamped) quantity.
    fn check_covered_sell(
        &self,
        parent_id: TradeId,
        symbol: &Symbol,
        quantity: f64,
    ) -> Result<f64, EngineError> {
        check_quantity(quantity)?;
        let parent = self.buy(parent_id)?;
        if &parent.symbol != symbol {
            return Err(EngineError::SymbolMismatch {
                parent: parent_id,
                expected: parent.symbol.clone(),
                actual: symbol.clone(),
            });
        }
        let remaining = parent.quantity - self.sold_quantity_for_parent(parent_id);
        if quantity > remaining + OVERSELL_TOLERANCE {
            return Err(EngineError::Oversold {
                parent: parent_id,
                requested: quantity,
                remaining,
            });
        }
        Ok(quantity.min(remaining))
    }

    /// Delete a trade and, for a Buy, its covered sells. Freed ids are
    /// reissued by later recordings. Returns every removed id.
    ///
    /// Entry points linked to a removed trade keep their traded flag but lose
    /// the link.
    pub fn delete_trade(&mut self, id: TradeId) -> Result<Vec<TradeId>, EngineError> {
        let trade = self.trades.remove(&id).ok_or(EngineError::TradeNotFound(id))?;
        let mut removed = vec![id];
        if trade.is_buy() {
            let children: Vec<TradeId> = self.children(id).map(|c| c.id).collect();
            for child in children {
                self.trades.remove(&child);
                removed.push(child);
            }
        }

        let removed_set: BTreeSet<TradeId> = removed.iter().copied().collect();
        for trade_id in &removed {
            self.trade_ids.release(trade_id.as_u64());
            self.horizons.remove(trade_id);
            self.exit_plans.remove(trade_id);
            self.released.remove(trade_id);
        }
        let order_ids = &mut self.order_ids;
        self.pending.retain(|exit| {
            let keep = !removed_set.contains(&exit.trade_id);
            if !keep {
                order_ids.release(exit.order_id);
            }
            keep
        });
        for entry in self.entries.values_mut() {
            if entry.linked_trade_id.is_some_and(|t| removed_set.contains(&t)) {
                entry.linked_trade_id = None;
            }
        }

        info!(trade = %id, removed = removed.len(), "Deleted trade");
        Ok(removed)
    }

    pub fn trade(&self, id: TradeId) -> Option<&Trade> {
        self.trades.get(&id)
    }

    pub fn trades(&self) -> impl Iterator<Item = &Trade> {
        self.trades.values()
    }

    pub fn buys(&self) -> impl Iterator<Item = &BuyTrade> {
        self.trades.values().filter_map(Trade::as_buy)
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn trade_ids(&self) -> &IdGenerator {
        &self.trade_ids
    }

    pub fn entry_ids(&self) -> &IdGenerator {
        &self.entry_ids
    }

    /// The Buy with `id`.
    pub fn buy(&self, id: TradeId) -> Result<&BuyTrade, EngineError> {
        self.trades
            .get(&id)
            .ok_or(EngineError::TradeNotFound(id))?
            .as_buy()
            .ok_or(EngineError::ParentNotBuy(id))
    }

    fn buy_mut(&mut self, id: TradeId) -> Result<&mut BuyTrade, EngineError> {
        self.trades
            .get_mut(&id)
            .ok_or(EngineError::TradeNotFound(id))?
            .as_buy_mut()
            .ok_or(EngineError::ParentNotBuy(id))
    }

    /// Covered sells of `parent_id`, in id order.
    pub fn children(&self, parent_id: TradeId) -> impl Iterator<Item = &CoveredSell> {
        self.trades
            .values()
            .filter_map(Trade::as_covered_sell)
            .filter(move |sell| sell.parent_id == parent_id)
    }

    pub fn sold_quantity_for_parent(&self, parent_id: TradeId) -> f64 {
        self.children(parent_id).map(|sell| sell.quantity).sum()
    }

    /// Unsold quantity of a Buy, never negative.
    pub fn remaining_quantity(&self, id: TradeId) -> Result<f64, EngineError> {
        let buy = self.buy(id)?;
        Ok((buy.quantity - self.sold_quantity_for_parent(id)).max(0.0))
    }

    /// Net units held for `symbol` across all Buys.
    pub fn holdings_for_symbol(&self, symbol: &Symbol) -> f64 {
        self.buys()
            .filter(|buy| &buy.symbol == symbol)
            .map(|buy| (buy.quantity - self.sold_quantity_for_parent(buy.id)).max(0.0))
            .sum()
    }

    /// Capital tied up in unsold, unreleased quantity, including the
    /// pro-rated buy fees.
    pub fn deployed_capital(&self) -> f64 {
        self.buys()
            .map(|buy| {
                let remaining = buy.quantity
                    - self.sold_quantity_for_parent(buy.id)
                    - self.released_quantity(buy.id);
                if remaining <= 0.0 {
                    return 0.0;
                }
                buy.entry_price * remaining + prorated_buy_fee(buy, remaining)
            })
            .sum()
    }

    /// Quantity of a Buy released from deployed capital.
    pub fn released_quantity(&self, id: TradeId) -> f64 {
        self.released.get(&id).copied().unwrap_or(0.0)
    }

    /// Stop counting `quantity` units of a Buy as deployed capital.
    ///
    /// At most the unsold, unreleased quantity can be released; an amount
    /// within tolerance above it is clamped. Returns the released quantity.
    pub fn release_from_trade(&mut self, id: TradeId, quantity: f64) -> Result<f64, EngineError> {
        check_quantity(quantity)?;
        let buy = self.buy(id)?;
        let allocated =
            buy.quantity - self.sold_quantity_for_parent(id) - self.released_quantity(id);
        if quantity > allocated + OVERSELL_TOLERANCE {
            return Err(EngineError::Oversold {
                parent: id,
                requested: quantity,
                remaining: allocated,
            });
        }
        let quantity = quantity.min(allocated);
        *self.released.entry(id).or_insert(0.0) += quantity;
        info!(trade = %id, quantity, "Released holdings");
        Ok(quantity)
    }

    /// Distinct symbols with at least one trade.
    pub fn symbols(&self) -> Vec<Symbol> {
        let set: BTreeSet<&Symbol> = self.trades.values().map(Trade::symbol).collect();
        set.into_iter().cloned().collect()
    }

    pub fn set_take_profit(
        &mut self,
        id: TradeId,
        price: f64,
        fraction: f64,
    ) -> Result<(), EngineError> {
        self.trades
            .get_mut(&id)
            .ok_or(EngineError::TradeNotFound(id))?
            .set_take_profit(price, fraction)
    }

    pub fn set_stop_loss(
        &mut self,
        id: TradeId,
        price: f64,
        fraction: f64,
    ) -> Result<(), EngineError> {
        self.trades
            .get_mut(&id)
            .ok_or(EngineError::TradeNotFound(id))?
            .set_stop_loss(price, fraction)
    }

    /// Generate and store horizons for a Buy, copying the first level onto
    /// its TP/SL targets. An activated stop sells the configured stop-loss
    /// fraction.
    pub fn plan_horizons(
        &mut self,
        id: TradeId,
        p: &HorizonParams,
        activate_stop_loss: bool,
    ) -> Result<Vec<HorizonLevel>, EngineError> {
        let trade = self
            .trades
            .get(&id)
            .ok_or(EngineError::TradeNotFound(id))?;
        if !trade.is_buy() {
            return Err(EngineError::InvalidOperation(format!(
                "horizons are only applied to buy trades, {} is a covered sell",
                id
            )));
        }
        let levels = HorizonEngine::generate(trade, p);
        let stop_fraction = if activate_stop_loss {
            HorizonEngine::stop_loss_sell_fraction(p)
        } else {
            0.0
        };
        HorizonEngine::apply_first_horizon(self.buy_mut(id)?, &levels, stop_fraction);
        self.horizons.insert(id, levels.clone());
        Ok(levels)
    }

    /// Stored horizons for a trade; empty if none were planned.
    pub fn horizons(&self, id: TradeId) -> &[HorizonLevel] {
        self.horizons.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Queue one pending sell order per exit level of a Buy and keep the
    /// levels as the trade's exit plan.
    ///
    /// Rejected with `Oversold` when the trade's pending sells plus the new
    /// levels would exceed its remaining quantity.
    pub fn queue_exits(
        &mut self,
        id: TradeId,
        levels: &[ExitLevel],
    ) -> Result<Vec<PendingExit>, EngineError> {
        let remaining = self.remaining_quantity(id)?;
        let already: f64 = self
            .pending
            .iter()
            .filter(|exit| exit.trade_id == id)
            .map(|exit| exit.sell_qty)
            .sum();
        let requested: f64 = levels
            .iter()
            .map(|level| level.sell_qty)
            .filter(|&qty| qty > EPSILON)
            .sum();
        if already + requested > remaining + OVERSELL_TOLERANCE {
            return Err(EngineError::Oversold {
                parent: id,
                requested: already + requested,
                remaining,
            });
        }

        let trade = self
            .trades
            .get(&id)
            .ok_or(EngineError::TradeNotFound(id))?;
        let queued = ExitPlanner::pending_exits(trade, levels, &mut self.order_ids);
        info!(trade = %id, orders = queued.len(), "Queued pending exits");
        self.pending.extend(queued.iter().cloned());
        self.exit_plans.insert(id, levels.to_vec());
        Ok(queued)
    }

    pub fn pending_exits(&self) -> &[PendingExit] {
        &self.pending
    }

    /// Exit plan of a trade with the fees of filled levels applied.
    pub fn exit_plan(&self, id: TradeId) -> &[ExitLevel] {
        self.exit_plans.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Drop a pending order. Returns false if the order id is unknown.
    pub fn cancel_exit(&mut self, order_id: u64) -> bool {
        let before = self.pending.len();
        self.pending.retain(|exit| exit.order_id != order_id);
        let removed = self.pending.len() != before;
        if removed {
            self.order_ids.release(order_id);
        }
        removed
    }

    /// Execute a pending exit at `price` as a covered sell of its parent.
    ///
    /// The wallet is credited with the proceeds net of `sell_fee`, the order
    /// is removed, the fee is written onto the exit plan's level before
    /// re-aggregating it, and the realized profit is recorded.
    pub fn fill_exit(
        &mut self,
        order_id: u64,
        price: f64,
        sell_fee: f64,
    ) -> Result<TradeId, EngineError> {
        if !(price.is_finite() && price > 0.0) {
            return Err(EngineError::InvalidOperation(format!(
                "fill price must be positive, got {}",
                price
            )));
        }
        let index = self
            .pending
            .iter()
            .position(|exit| exit.order_id == order_id)
            .ok_or(EngineError::OrderNotFound(order_id))?;
        let order = self.pending[index].clone();
        let entry_price = self.buy(order.trade_id)?.entry_price;

        let sell_id = self.record_covered_sell(
            order.trade_id,
            TradeInput::new(&order.symbol, price, order.sell_qty).with_fees(0.0, sell_fee),
        )?;
        let sell = self
            .trades
            .get(&sell_id)
            .and_then(Trade::as_covered_sell)
            .cloned()
            .ok_or(EngineError::TradeNotFound(sell_id))?;

        self.pending.remove(index);
        self.order_ids.release(order_id);
        self.wallet += sell.proceeds();

        if let Some(plan) = self.exit_plans.get_mut(&order.trade_id) {
            if let Some(level) = plan.iter_mut().find(|l| l.index == order.level_index) {
                level.level_sell_fee = sell_fee;
            }
            ExitPlanner::apply_fees(plan);
        }

        let profit = ProfitCalculator::child_profit(&sell, entry_price);
        let cum_profit = self.realized_pnl() + profit.net_profit;
        self.pnl.push(PnlRecord {
            sell_id,
            parent_id: order.trade_id,
            symbol: sell.symbol.clone(),
            entry_price,
            sell_price: price,
            quantity: sell.quantity,
            gross_profit: profit.gross_profit,
            net_profit: profit.net_profit,
            cum_profit,
        });

        info!(
            order = order_id,
            trade = %sell_id,
            parent = %order.trade_id,
            net_profit = profit.net_profit,
            wallet = self.wallet,
            "Filled pending exit"
        );
        Ok(sell_id)
    }

    /// Realized profit history of filled exits, oldest first.
    pub fn pnl_history(&self) -> &[PnlRecord] {
        &self.pnl
    }

    /// Cumulative net realized profit.
    pub fn realized_pnl(&self) -> f64 {
        self.pnl.last().map(|r| r.cum_profit).unwrap_or(0.0)
    }

    pub fn wallet_balance(&self) -> f64 {
        self.wallet
    }

    /// Add funds; returns the new balance.
    pub fn deposit(&mut self, amount: f64) -> Result<f64, EngineError> {
        self.wallet += check_amount(amount)?;
        info!(amount, balance = self.wallet, "Deposited");
        Ok(self.wallet)
    }

    /// Remove funds; the balance never goes negative.
    pub fn withdraw(&mut self, amount: f64) -> Result<f64, EngineError> {
        check_amount(amount)?;
        if amount > self.wallet {
            return Err(EngineError::InsufficientFunds {
                required: amount,
                available: self.wallet,
            });
        }
        self.wallet -= amount;
        info!(amount, balance = self.wallet, "Withdrew");
        Ok(self.wallet)
    }

    /// Store planned entry points for `symbol`, assigning each an entry id.
    pub fn store_entry_points(
        &mut self,
        symbol: impl AsRef<str>,
        points: &[EntryPoint],
    ) -> Vec<EntryPoint> {
        let symbol = Symbol::new(symbol);
        let mut stored = Vec::with_capacity(points.len());
        for point in points {
            let mut entry = point.clone();
            entry.entry_id = self.entry_ids.issue();
            entry.symbol = symbol.clone();
            self.entries.insert(entry.entry_id, entry.clone());
            stored.push(entry);
        }
        info!(symbol = %symbol, entries = stored.len(), "Stored entry points");
        stored
    }

    pub fn entry_point(&self, entry_id: u64) -> Option<&EntryPoint> {
        self.entries.get(&entry_id)
    }

    /// Stored entry points in id order.
    pub fn entry_points(&self) -> impl Iterator<Item = &EntryPoint> {
        self.entries.values()
    }

    /// Remove an entry point, freeing its id for reuse.
    pub fn delete_entry_point(&mut self, entry_id: u64) -> Result<EntryPoint, EngineError> {
        let entry = self
            .entries
            .remove(&entry_id)
            .ok_or(EngineError::EntryNotFound(entry_id))?;
        self.entry_ids.release(entry_id);
        Ok(entry)
    }

    /// Buy an entry point's funded quantity at its entry price.
    ///
    /// The wallet must cover `entry_price * funding_qty + buy_fee`. The new
    /// Buy takes the entry's exit TP (scaled to the position, sell fraction 1
    /// when set) and its exit SL as an inactive stop. The entry is marked
    /// traded and linked to the new trade.
    pub fn execute_entry(&mut self, entry_id: u64, buy_fee: f64) -> Result<TradeId, EngineError> {
        let entry = self
            .entries
            .get(&entry_id)
            .ok_or(EngineError::EntryNotFound(entry_id))?;
        if entry.traded {
            return Err(EngineError::EntryAlreadyTraded(entry_id));
        }
        let quantity = check_quantity(entry.level.funding_qty)?;
        let price = entry.level.entry_price;
        let cost = price * quantity + buy_fee;
        if cost > self.wallet {
            return Err(EngineError::InsufficientFunds {
                required: cost,
                available: self.wallet,
            });
        }
        let symbol = entry.symbol.clone();
        let (exit_tp, exit_sl) = (entry.exit_take_profit, entry.exit_stop_loss);

        let trade_id =
            self.record_buy(TradeInput::new(&symbol, price, quantity).with_fees(buy_fee, 0.0))?;
        let buy = self.buy_mut(trade_id)?;
        buy.set_take_profit(exit_tp * quantity, if exit_tp > 0.0 { 1.0 } else { 0.0 });
        buy.set_stop_loss(exit_sl * quantity, 0.0);
        self.wallet -= cost;

        if let Some(entry) = self.entries.get_mut(&entry_id) {
            entry.traded = true;
            entry.linked_trade_id = Some(trade_id);
        }
        info!(
            entry = entry_id,
            trade = %trade_id,
            symbol = %symbol,
            cost,
            wallet = self.wallet,
            "Executed entry point"
        );
        Ok(trade_id)
    }

    /// Realized profit of the covered sells plus unrealized profit of the
    /// remaining quantity at `current_price`.
    pub fn position_report(
        &self,
        parent_id: TradeId,
        current_price: f64,
    ) -> Result<PositionReport, EngineError> {
        let buy = self.buy(parent_id)?;
        let sold = self.sold_quantity_for_parent(parent_id);
        let remaining = (buy.quantity - sold).max(0.0);

        let mut gross = 0.0;
        let mut net = 0.0;
        let mut cost = 0.0;
        for sell in self.children(parent_id) {
            let profit = ProfitCalculator::child_profit(sell, buy.entry_price);
            gross += profit.gross_profit;
            net += profit.net_profit;
            cost += buy.entry_price * sell.quantity + sell.buy_fee;
        }
        let realized = ProfitResult {
            gross_profit: gross,
            net_profit: net,
            roi: if cost != 0.0 { net / cost * 100.0 } else { 0.0 },
        };
        let unrealized = ProfitCalculator::unrealized(buy, current_price, remaining);

        Ok(PositionReport {
            trade_id: parent_id,
            symbol: buy.symbol.clone(),
            quantity: buy.quantity,
            sold,
            remaining,
            realized,
            unrealized,
            combined_net: realized.net_profit + unrealized.net_profit,
        })
    }
}

//! Output records produced by the engine: horizon, entry and exit levels, profit.
//!
//! All records are flat numeric/boolean values so collaborators can persist or
//! render them without further transformation.

use crate::domain::{Symbol, TradeId};
use serde::{Deserialize, Serialize};

/// One take-profit/stop-loss horizon of a position (absolute position values).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HorizonLevel {
    pub index: usize,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub stop_loss_active: bool,
}

/// One rung of a staggered entry ladder.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EntryLevel {
    pub index: usize,
    /// Suggested entry price per unit.
    pub entry_price: f64,
    /// Price needed to break even after modeled costs.
    pub break_even: f64,
    /// Layers of overhead covered (index + 1).
    pub cost_coverage: f64,
    /// Net profit if price returns to the current price.
    pub potential_net: f64,
    pub funding: f64,
    /// Share of total funds (0-1).
    pub funding_fraction: f64,
    /// Units the funding buys at `entry_price`.
    pub funding_qty: f64,
}

/// An entry level with its exit targets attached.
///
/// `entry_id` and `symbol` are assigned when the point is stored in a ledger;
/// a freshly planned point has id 0 and an empty symbol.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntryPoint {
    #[serde(default)]
    pub entry_id: u64,
    #[serde(default)]
    pub symbol: Symbol,
    #[serde(flatten)]
    pub level: EntryLevel,
    pub effective_overhead: f64,
    /// Per-unit take-profit price (0 = no target).
    pub exit_take_profit: f64,
    /// Per-unit stop-loss price (0 = no stop).
    pub exit_stop_loss: f64,
    pub stop_loss_fraction: f64,
    pub stop_loss_active: bool,
    pub is_short: bool,
    pub traded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_trade_id: Option<TradeId>,
}

/// One tranche of a partial-exit schedule.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExitLevel {
    pub index: usize,
    /// Take-profit price per unit.
    pub tp_price: f64,
    pub sell_qty: f64,
    /// Share of the whole position sold at this level.
    pub sell_fraction: f64,
    pub sell_value: f64,
    pub gross_profit: f64,
    pub cum_sold: f64,
    /// Buy fee amortized onto this tranche at generation time.
    pub level_buy_fee: f64,
    /// Actual sell fee, filled in at execution time.
    pub level_sell_fee: f64,
    pub net_profit: f64,
    pub cum_net_profit: f64,
}

/// A sell order waiting for the market to reach its trigger price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingExit {
    pub order_id: u64,
    pub symbol: Symbol,
    /// Parent Buy trade.
    pub trade_id: TradeId,
    pub level_index: usize,
    pub trigger_price: f64,
    pub sell_qty: f64,
}

/// Gross/net profit and ROI of a position or quantity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfitResult {
    pub gross_profit: f64,
    pub net_profit: f64,
    /// Return on investment in percent.
    pub roi: f64,
}

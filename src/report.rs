//! One-shot planning report: every calculation for a single position.

use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;
use crate::domain::{
    EntryPoint, ExitLevel, HorizonLevel, PendingExit, ProfitResult, Symbol, TradeId,
};
use crate::engine::{
    EntryExitPlanner, ExitPlanner, HorizonEngine, OverheadModel, ProfitCalculator,
};
use crate::error::{EngineError, ReportError};
use crate::ledger::{PositionLedger, TradeInput};

/// A position to plan. `current_price` defaults to the entry price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub symbol: Symbol,
    pub entry_price: f64,
    pub quantity: f64,
    #[serde(default)]
    pub buy_fee: f64,
    #[serde(default)]
    pub sell_fee: f64,
    #[serde(default)]
    pub current_price: Option<f64>,
}

impl PlanRequest {
    pub fn market_price(&self) -> f64 {
        self.current_price.unwrap_or(self.entry_price)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    pub trade_id: TradeId,
    pub symbol: Symbol,
    pub current_price: f64,
    pub overhead: f64,
    pub effective_overhead: f64,
    pub position_delta: f64,
    pub break_even: f64,
    pub horizons: Vec<HorizonLevel>,
    pub warped_horizons: Vec<HorizonLevel>,
    pub entry_points: Vec<EntryPoint>,
    pub exit_levels: Vec<ExitLevel>,
    pub pending_exits: Vec<PendingExit>,
    pub profit: ProfitResult,
}

/// Flat CSV row for an entry point.
#[derive(Serialize)]
struct EntryPointRow {
    entry_id: u64,
    index: usize,
    entry_price: f64,
    break_even: f64,
    cost_coverage: f64,
    potential_net: f64,
    funding: f64,
    funding_fraction: f64,
    funding_qty: f64,
    effective_overhead: f64,
    exit_take_profit: f64,
    exit_stop_loss: f64,
    stop_loss_fraction: f64,
}

impl From<&EntryPoint> for EntryPointRow {
    fn from(ep: &EntryPoint) -> Self {
        Self {
            entry_id: ep.entry_id,
            index: ep.level.index,
            entry_price: ep.level.entry_price,
            break_even: ep.level.break_even,
            cost_coverage: ep.level.cost_coverage,
            potential_net: ep.level.potential_net,
            funding: ep.level.funding,
            funding_fraction: ep.level.funding_fraction,
            funding_qty: ep.level.funding_qty,
            effective_overhead: ep.effective_overhead,
            exit_take_profit: ep.exit_take_profit,
            exit_stop_loss: ep.exit_stop_loss,
            stop_loss_fraction: ep.stop_loss_fraction,
        }
    }
}

impl PlanReport {
    /// Record the request as a Buy in `ledger` and plan around it.
    ///
    /// Horizons are stored on the trade (first level copied onto its TP/SL),
    /// entry points are stored with fresh entry ids, and the exit schedule is
    /// queued as pending orders.
    pub fn build(
        request: &PlanRequest,
        config: &Config,
        ledger: &mut PositionLedger,
    ) -> Result<Self, EngineError> {
        let p = &config.horizon;
        let plan = &config.plan;
        let current_price = request.market_price();

        let trade_id = ledger.record_buy(
            TradeInput::new(&request.symbol, request.entry_price, request.quantity)
                .with_fees(request.buy_fee, request.sell_fee),
        )?;
        let horizons = ledger.plan_horizons(trade_id, p, p.generate_stop_losses)?;
        let trade = ledger
            .trade(trade_id)
            .cloned()
            .ok_or(EngineError::TradeNotFound(trade_id))?;

        let overhead = OverheadModel::trade_overhead(&trade, p);
        let warped_horizons = HorizonEngine::generate_warped(
            &trade,
            p,
            plan.risk_coefficient,
            plan.entry_steepness,
            0.0,
        );
        let planned = EntryExitPlanner::plan(current_price, request.quantity, p, plan);
        let entry_points = ledger.store_entry_points(&request.symbol, &planned);
        let exit_levels = ExitPlanner::generate(
            &trade,
            p,
            plan.risk_coefficient,
            plan.exit_fraction,
            plan.exit_steepness,
        );
        let pending_exits = ledger.queue_exits(trade_id, &exit_levels)?;

        let report = PlanReport {
            trade_id,
            symbol: trade.symbol().clone(),
            current_price,
            overhead,
            effective_overhead: OverheadModel::trade_effective_overhead(&trade, p),
            position_delta: OverheadModel::position_delta(
                trade.price(),
                trade.quantity(),
                p.portfolio_pump,
            ),
            break_even: OverheadModel::break_even(trade.price(), overhead),
            horizons,
            warped_horizons,
            entry_points,
            exit_levels,
            pending_exits,
            profit: ProfitCalculator::calculate(&trade, current_price),
        };

        info!(
            trade = %report.trade_id,
            symbol = %report.symbol,
            horizons = report.horizons.len(),
            entries = report.entry_points.len(),
            exits = report.exit_levels.len(),
            "Built plan report"
        );
        Ok(report)
    }

    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<(), ReportError> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        Ok(())
    }

    /// A summary table followed by one table per level kind, each preceded
    /// by a `# name` line.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> Result<(), ReportError> {
        write_table(
            &mut writer,
            "summary",
            [Summary {
                trade_id: self.trade_id,
                symbol: &self.symbol,
                current_price: self.current_price,
                overhead: self.overhead,
                effective_overhead: self.effective_overhead,
                position_delta: self.position_delta,
                break_even: self.break_even,
                gross_profit: self.profit.gross_profit,
                net_profit: self.profit.net_profit,
                roi: self.profit.roi,
            }],
        )?;
        write_table(&mut writer, "horizons", &self.horizons)?;
        write_table(&mut writer, "warped_horizons", &self.warped_horizons)?;
        write_table(
            &mut writer,
            "entry_points",
            self.entry_points.iter().map(EntryPointRow::from),
        )?;
        write_table(&mut writer, "exit_levels", &self.exit_levels)?;
        write_table(&mut writer, "pending_exits", &self.pending_exits)?;
        Ok(())
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    trade_id: TradeId,
    symbol: &'a Symbol,
    current_price: f64,
    overhead: f64,
    effective_overhead: f64,
    position_delta: f64,
    break_even: f64,
    gross_profit: f64,
    net_profit: f64,
    roi: f64,
}

fn write_table<W, I, R>(writer: &mut W, name: &str, rows: I) -> Result<(), ReportError>
where
    W: Write,
    I: IntoIterator<Item = R>,
    R: Serialize,
{
    writeln!(writer, "# {}", name)?;
    let mut csv_writer = csv::Writer::from_writer(&mut *writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    drop(csv_writer);
    writeln!(writer)?;
    Ok(())
}

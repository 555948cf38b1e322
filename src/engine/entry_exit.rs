//! Entry ladders with exit targets attached to every entry.

use super::entry::EntryPlanner;
use super::horizon::HorizonEngine;
use super::overhead::OverheadModel;
use crate::domain::{EntryLevel, EntryPoint, HorizonParams, PlanSettings, Symbol};
use tracing::debug;

pub struct EntryExitPlanner;

impl EntryExitPlanner {
    /// Entry ladder with per-entry exit take-profit and stop-loss prices.
    ///
    /// The TP ceiling is anchored at the highest entry price so it stays fixed
    /// across the set; each TP is inflated by the downtrend and stop-loss hedge
    /// buffers of that entry's funded position. The stop-loss sell fraction is
    /// capped so worst-case losses over all levels fit `available_capital`.
    pub fn plan(
        current_price: f64,
        quantity: f64,
        p: &HorizonParams,
        settings: &PlanSettings,
    ) -> Vec<EntryPoint> {
        let levels = EntryPlanner::generate(current_price, quantity, p, settings);
        let eo = OverheadModel::effective_overhead(current_price, quantity, p);
        let reference = levels
            .iter()
            .map(|l| l.entry_price)
            .fold(0.0_f64, f64::max);

        let sl_fraction = if p.generate_stop_losses {
            let fundings: Vec<f64> = levels.iter().map(|l| l.funding).collect();
            HorizonEngine::clamp_stop_loss_fraction(
                HorizonEngine::stop_loss_sell_fraction(p),
                eo,
                &fundings,
                settings.available_capital,
            )
        } else {
            0.0
        };

        let n = levels.len();
        let points: Vec<EntryPoint> = levels
            .into_iter()
            .map(|level| EntryPoint {
                entry_id: 0,
                symbol: Symbol::default(),
                effective_overhead: eo,
                exit_take_profit: exit_take_profit(
                    &level,
                    n,
                    eo,
                    reference,
                    sl_fraction,
                    p,
                    settings,
                ),
                exit_stop_loss: if p.generate_stop_losses {
                    HorizonEngine::level_sl(level.entry_price, eo, false)
                } else {
                    0.0
                },
                stop_loss_fraction: sl_fraction,
                stop_loss_active: false,
                is_short: false,
                traded: false,
                linked_trade_id: None,
                level,
            })
            .collect();

        debug!(
            current_price,
            entries = points.len(),
            effective_overhead = eo,
            reference,
            stop_loss_fraction = sl_fraction,
            "Planned entry points"
        );
        points
    }
}

fn exit_take_profit(
    level: &EntryLevel,
    total_levels: usize,
    eo: f64,
    reference: f64,
    sl_fraction: f64,
    p: &HorizonParams,
    settings: &PlanSettings,
) -> f64 {
    let tp = HorizonEngine::level_tp(
        level.entry_price,
        eo,
        p,
        settings.entry_steepness,
        level.index,
        total_levels,
        false,
        settings.risk_coefficient,
        reference,
    );
    if tp <= 0.0 {
        return 0.0;
    }
    let downtrend = HorizonEngine::calculate_downtrend_buffer(
        level.entry_price,
        level.funding_qty,
        p.portfolio_pump,
        eo,
        p.min_risk,
        p.max_risk,
        settings.downtrend_count,
    );
    let hedge = HorizonEngine::calculate_stop_loss_buffer(
        level.entry_price,
        level.funding_qty,
        p.portfolio_pump,
        eo,
        p.min_risk,
        p.max_risk,
        sl_fraction,
        p.stop_loss_hedge_count,
    );
    tp * downtrend * hedge
}

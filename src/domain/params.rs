//! Calculation parameters: portfolio-wide horizon parameters and per-plan scalars.

use serde::{Deserialize, Serialize};

/// Parameters shared by every overhead/horizon/entry/exit calculation.
///
/// Immutable per calculation; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizonParams {
    /// Safety multiplier on the fee spread.
    pub fee_hedging_coefficient: f64,
    /// Deployable capital ("portfolio pump") for the period.
    pub portfolio_pump: f64,
    pub symbol_count: u32,
    /// Additive offset in the overhead denominator.
    pub coefficient_k: f64,
    /// Fee spread / slippage rate.
    pub fee_spread: f64,
    pub delta_time: f64,
    /// Profit margin above break-even (0.02 = 2%).
    pub surplus_rate: f64,
    pub horizon_count: usize,
    pub generate_stop_losses: bool,
    pub allow_short_trades: bool,
    /// Max TP fraction above entry (0 disables risk-warped TP).
    pub max_risk: f64,
    /// Min TP fraction above entry.
    pub min_risk: f64,
    /// Future trades whose fees this TP must cover (0 = self only).
    pub future_trade_count: u32,
    /// Fraction of the position sold at a stop-loss (1 = full exit).
    pub stop_loss_fraction: f64,
    /// Future stop-loss hits to pre-fund via TP inflation (0 = disabled).
    pub stop_loss_hedge_count: u32,
}

impl Default for HorizonParams {
    fn default() -> Self {
        Self {
            fee_hedging_coefficient: 1.0,
            portfolio_pump: 0.0,
            symbol_count: 1,
            coefficient_k: 0.0,
            fee_spread: 0.0,
            delta_time: 1.0,
            surplus_rate: 0.0,
            horizon_count: 1,
            generate_stop_losses: false,
            allow_short_trades: false,
            max_risk: 0.0,
            min_risk: 0.0,
            future_trade_count: 0,
            stop_loss_fraction: 1.0,
            stop_loss_hedge_count: 0,
        }
    }
}

impl HorizonParams {
    /// Horizon count with the one-level floor applied.
    pub fn levels(&self) -> usize {
        self.horizon_count.max(1)
    }
}

/// Per-plan scalars supplied alongside [`HorizonParams`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanSettings {
    /// 0 = conservative, 0.5 = uniform, 1 = aggressive.
    pub risk_coefficient: f64,
    /// Fraction of a held position to schedule for exit.
    pub exit_fraction: f64,
    pub entry_steepness: f64,
    pub exit_steepness: f64,
    pub range_above: f64,
    pub range_below: f64,
    /// Down-cycles a TP should absorb (0 = no downtrend buffer).
    pub downtrend_count: u32,
    /// Capital available to absorb stop-loss hits (0 = uncapped).
    pub available_capital: f64,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            risk_coefficient: 0.0,
            exit_fraction: 1.0,
            entry_steepness: 6.0,
            exit_steepness: 4.0,
            range_above: 0.0,
            range_below: 0.0,
            downtrend_count: 0,
            available_capital: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizon_params_defaults() {
        let p = HorizonParams::default();
        assert_eq!(p.fee_hedging_coefficient, 1.0);
        assert_eq!(p.symbol_count, 1);
        assert_eq!(p.delta_time, 1.0);
        assert_eq!(p.horizon_count, 1);
        assert_eq!(p.stop_loss_fraction, 1.0);
        assert!(!p.generate_stop_losses);
        assert!(!p.allow_short_trades);
    }

    #[test]
    fn test_levels_floor() {
        let p = HorizonParams {
            horizon_count: 0,
            ..Default::default()
        };
        assert_eq!(p.levels(), 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let p: HorizonParams =
            serde_json::from_str(r#"{"horizon_count": 3, "fee_spread": 0.001}"#).unwrap();
        assert_eq!(p.horizon_count, 3);
        assert_eq!(p.fee_spread, 0.001);
        assert_eq!(p.fee_hedging_coefficient, 1.0);

        let s: PlanSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(s, PlanSettings::default());
    }
}

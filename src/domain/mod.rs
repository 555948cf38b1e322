//! Domain types for the position-sizing and exit-planning engine.
//!
//! This module provides:
//! - Domain primitives: Timestamp, Symbol, TradeId, Side
//! - Trade records as a Buy / CoveredSell sum type
//! - Horizon parameters and per-plan settings
//! - Flat output records for horizon, entry and exit levels

pub mod levels;
pub mod params;
pub mod primitives;
pub mod trade;

pub use levels::{EntryLevel, EntryPoint, ExitLevel, HorizonLevel, PendingExit, ProfitResult};
pub use params::{HorizonParams, PlanSettings};
pub use primitives::{Side, Symbol, Timestamp, TradeId};
pub use trade::{BuyTrade, CoveredSell, ExitTarget, Trade};

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ids;
pub mod ledger;
pub mod prices;
pub mod registry;
pub mod report;
pub mod triggers;

pub use config::{Config, OutputFormat};
pub use domain::{
    BuyTrade, CoveredSell, EntryLevel, EntryPoint, ExitLevel, ExitTarget, HorizonLevel,
    HorizonParams, PendingExit, PlanSettings, ProfitResult, Side, Symbol, Timestamp, Trade,
    TradeId,
};
pub use engine::{
    EntryExitPlanner, EntryPlanner, ExitPlanner, HorizonEngine, OverheadModel, ProfitCalculator,
};
pub use error::{EngineError, ReportError};
pub use ids::IdGenerator;
pub use ledger::{PnlRecord, PositionLedger, PositionReport, TradeInput};
pub use prices::{PricePoint, PriceSeries};
pub use registry::{SymbolInfo, SymbolRegistry};
pub use report::{PlanReport, PlanRequest};
pub use triggers::{PriceCheck, Trigger, TriggerEvaluator, TriggerKind};

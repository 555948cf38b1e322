use crate::domain::{Symbol, TradeId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Trade not found: {0}")]
    TradeNotFound(TradeId),
    #[error("Trade {0} is not a Buy and cannot back a covered sell")]
    ParentNotBuy(TradeId),
    #[error("Symbol mismatch: parent {parent} is {expected}, sell is {actual}")]
    SymbolMismatch {
        parent: TradeId,
        expected: Symbol,
        actual: Symbol,
    },
    #[error("Sell of {requested} exceeds remaining {remaining} on parent {parent}")]
    Oversold {
        parent: TradeId,
        requested: f64,
        remaining: f64,
    },
    #[error("Quantity must be positive, got {0}")]
    NonPositiveQuantity(f64),
    #[error("Duplicate trade id: {0}")]
    DuplicateTradeId(TradeId),
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(f64),
    #[error("Insufficient funds: need {required}, have {available}")]
    InsufficientFunds { required: f64, available: f64 },
    #[error("Entry point not found: {0}")]
    EntryNotFound(u64),
    #[error("Entry point {0} was already traded")]
    EntryAlreadyTraded(u64),
    #[error("Pending exit not found: {0}")]
    OrderNotFound(u64),
}

/// Failure while rendering a plan report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

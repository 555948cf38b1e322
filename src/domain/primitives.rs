//! Domain primitives: Timestamp, Symbol, TradeId, Side.

use serde::{Deserialize, Serialize};

/// Time in seconds since Unix epoch, as recorded on trades and price points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Create a Timestamp from a raw timestamp.
    pub fn new(ts: i64) -> Self {
        Timestamp(ts)
    }

    /// Get the underlying timestamp value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// Absolute distance between two timestamps.
    pub fn distance(&self, other: Timestamp) -> i64 {
        (self.0 - other.0).abs()
    }
}

/// Asset symbol (e.g., "BTC", "ETH"), always stored uppercase.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Create a Symbol, normalizing it to uppercase.
    pub fn new(name: impl AsRef<str>) -> Self {
        Symbol(name.as_ref().trim().to_uppercase())
    }

    /// Get the symbol as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Symbol::new(value)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Symbol::new(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique trade identifier, issued by an `IdGenerator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(pub u64);

impl TradeId {
    pub fn new(id: u64) -> Self {
        TradeId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TradeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Trade side: a Buy, or a sell backed by a prior Buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Opening buy (long).
    Buy,
    /// Sell covered by a parent Buy; uncovered shorts are not modeled.
    CoveredSell,
}

impl Side {
    /// Get the signed multiplier for profit on this side (+1 for Buy, -1 for CoveredSell).
    pub fn sign(&self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::CoveredSell => -1.0,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::CoveredSell => write!(f, "covered_sell"),
        }
    }
}

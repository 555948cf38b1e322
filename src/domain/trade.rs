//! Trade records: a Buy position, or a covered sell linked to its parent Buy.
//!
//! Take-profit and stop-loss targets only exist on [`BuyTrade`]. Callers that
//! hold an untyped [`Trade`] go through [`Trade::set_take_profit`] /
//! [`Trade::set_stop_loss`], which reject covered sells.

use crate::domain::{Side, Symbol, Timestamp, TradeId};
use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// A take-profit or stop-loss target on a Buy position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExitTarget {
    /// Absolute position value (price * quantity) at which the target fires.
    pub price: f64,
    /// Fraction of the position sold when the target fires (0 = off).
    pub fraction: f64,
    pub active: bool,
}

impl ExitTarget {
    /// Build a target; `active` follows `fraction > 0`.
    pub fn new(price: f64, fraction: f64) -> Self {
        Self {
            price,
            fraction,
            active: fraction > 0.0,
        }
    }

    /// Per-unit trigger price for a position of `quantity`, or 0 when unset.
    pub fn per_unit(&self, quantity: f64) -> f64 {
        if quantity > 0.0 && self.price > 0.0 {
            self.price / quantity
        } else {
            0.0
        }
    }
}

/// An opening Buy position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyTrade {
    pub id: TradeId,
    pub symbol: Symbol,
    /// Entry price per unit.
    pub entry_price: f64,
    pub quantity: f64,
    pub buy_fee: f64,
    pub sell_fee: f64,
    #[serde(default)]
    pub take_profit: ExitTarget,
    #[serde(default)]
    pub stop_loss: ExitTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

impl BuyTrade {
    pub fn new(id: TradeId, symbol: Symbol, entry_price: f64, quantity: f64) -> Self {
        Self {
            id,
            symbol,
            entry_price,
            quantity,
            buy_fee: 0.0,
            sell_fee: 0.0,
            take_profit: ExitTarget::default(),
            stop_loss: ExitTarget::default(),
            timestamp: None,
        }
    }

    pub fn with_fees(mut self, buy_fee: f64, sell_fee: f64) -> Self {
        self.buy_fee = buy_fee;
        self.sell_fee = sell_fee;
        self
    }

    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the take-profit target; a zero fraction leaves it inactive.
    pub fn set_take_profit(&mut self, price: f64, fraction: f64) {
        self.take_profit = ExitTarget::new(price, fraction);
    }

    /// Set the stop-loss target; a zero fraction leaves it inactive.
    pub fn set_stop_loss(&mut self, price: f64, fraction: f64) {
        self.stop_loss = ExitTarget::new(price, fraction);
    }

    /// Cost basis without fees.
    pub fn cost(&self) -> f64 {
        self.entry_price * self.quantity
    }
}

/// A sell backed by a parent Buy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoveredSell {
    pub id: TradeId,
    pub symbol: Symbol,
    pub parent_id: TradeId,
    /// Sell price per unit.
    pub price: f64,
    pub quantity: f64,
    pub buy_fee: f64,
    pub sell_fee: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

impl CoveredSell {
    pub fn new(id: TradeId, symbol: Symbol, parent_id: TradeId, price: f64, quantity: f64) -> Self {
        Self {
            id,
            symbol,
            parent_id,
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

    /// Proceeds credited for this sell after its sell fee.
    pub fn proceeds(&self) -> f64 {
        self.price * self.quantity - self.sell_fee
    }
}

/// A trade record, tagged by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "side", rename_all = "snake_case")]
pub enum Trade {
    Buy(BuyTrade),
    CoveredSell(CoveredSell),
}

impl Trade {
    pub fn id(&self) -> TradeId {
        match self {
            Trade::Buy(t) => t.id,
            Trade::CoveredSell(t) => t.id,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        match self {
            Trade::Buy(t) => &t.symbol,
            Trade::CoveredSell(t) => &t.symbol,
        }
    }

    pub fn side(&self) -> Side {
        match self {
            Trade::Buy(_) => Side::Buy,
            Trade::CoveredSell(_) => Side::CoveredSell,
        }
    }

    /// Price per unit: entry price for a Buy, sell price for a covered sell.
    pub fn price(&self) -> f64 {
        match self {
            Trade::Buy(t) => t.entry_price,
            Trade::CoveredSell(t) => t.price,
        }
    }

    pub fn quantity(&self) -> f64 {
        match self {
            Trade::Buy(t) => t.quantity,
            Trade::CoveredSell(t) => t.quantity,
        }
    }

    pub fn buy_fee(&self) -> f64 {
        match self {
            Trade::Buy(t) => t.buy_fee,
            Trade::CoveredSell(t) => t.buy_fee,
        }
    }

    pub fn sell_fee(&self) -> f64 {
        match self {
            Trade::Buy(t) => t.sell_fee,
            Trade::CoveredSell(t) => t.sell_fee,
        }
    }

    pub fn timestamp(&self) -> Option<Timestamp> {
        match self {
            Trade::Buy(t) => t.timestamp,
            Trade::CoveredSell(t) => t.timestamp,
        }
    }

    /// Parent Buy id for a covered sell.
    pub fn parent_id(&self) -> Option<TradeId> {
        match self {
            Trade::Buy(_) => None,
            Trade::CoveredSell(t) => Some(t.parent_id),
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Trade::Buy(_))
    }

    pub fn as_buy(&self) -> Option<&BuyTrade> {
        match self {
            Trade::Buy(t) => Some(t),
            Trade::CoveredSell(_) => None,
        }
    }

    pub fn as_buy_mut(&mut self) -> Option<&mut BuyTrade> {
        match self {
            Trade::Buy(t) => Some(t),
            Trade::CoveredSell(_) => None,
        }
    }

    pub fn as_covered_sell(&self) -> Option<&CoveredSell> {
        match self {
            Trade::CoveredSell(t) => Some(t),
            Trade::Buy(_) => None,
        }
    }

    /// Set a take-profit target on an untyped trade.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidOperation` for a covered sell.
    pub fn set_take_profit(&mut self, price: f64, fraction: f64) -> Result<(), EngineError> {
        let id = self.id();
        let buy = self.as_buy_mut().ok_or_else(|| {
            EngineError::InvalidOperation(format!(
                "take-profit is only supported for Buy trades (trade {})",
                id
            ))
        })?;
        buy.set_take_profit(price, fraction);
        Ok(())
    }

    /// Set a stop-loss target on an untyped trade.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidOperation` for a covered sell.
    pub fn set_stop_loss(&mut self, price: f64, fraction: f64) -> Result<(), EngineError> {
        let id = self.id();
        let buy = self.as_buy_mut().ok_or_else(|| {
            EngineError::InvalidOperation(format!(
                "stop-loss is only supported for Buy trades (trade {})",
                id
            ))
        })?;
        buy.set_stop_loss(price, fraction);
        Ok(())
    }
}

impl From<BuyTrade> for Trade {
    fn from(value: BuyTrade) -> Self {
        Trade::Buy(value)
    }
}

impl From<CoveredSell> for Trade {
    fn from(value: CoveredSell) -> Self {
        Trade::CoveredSell(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buy() -> BuyTrade {
        BuyTrade::new(TradeId::new(1), Symbol::new("btc"), 100.0, 2.0).with_fees(0.5, 0.25)
    }

    fn sell() -> CoveredSell {
        CoveredSell::new(TradeId::new(2), Symbol::new("btc"), TradeId::new(1), 110.0, 1.0)
    }

    #[test]
    fn test_exit_target_active_follows_fraction() {
        assert!(ExitTarget::new(210.0, 0.5).active);
        assert!(!ExitTarget::new(210.0, 0.0).active);
        assert!(!ExitTarget::default().active);
    }

    #[test]
    fn test_exit_target_per_unit() {
        let target = ExitTarget::new(210.0, 1.0);
        assert_eq!(target.per_unit(2.0), 105.0);
        assert_eq!(target.per_unit(0.0), 0.0);
        assert_eq!(ExitTarget::default().per_unit(2.0), 0.0);
    }

    #[test]
    fn test_buy_trade_set_targets() {
        let mut trade = buy();
        trade.set_take_profit(220.0, 0.5);
        trade.set_stop_loss(180.0, 0.0);
        assert_eq!(trade.take_profit.price, 220.0);
        assert!(trade.take_profit.active);
        assert_eq!(trade.stop_loss.price, 180.0);
        assert!(!trade.stop_loss.active);
        assert_eq!(trade.cost(), 200.0);
    }

    #[test]
    fn test_trade_accessors() {
        let t: Trade = buy().into();
        assert_eq!(t.id(), TradeId::new(1));
        assert_eq!(t.symbol().as_str(), "BTC");
        assert_eq!(t.side(), Side::Buy);
        assert_eq!(t.price(), 100.0);
        assert_eq!(t.buy_fee(), 0.5);
        assert_eq!(t.sell_fee(), 0.25);
        assert_eq!(t.parent_id(), None);

        let s: Trade = sell().into();
        assert_eq!(s.side(), Side::CoveredSell);
        assert_eq!(s.parent_id(), Some(TradeId::new(1)));
        assert!(s.as_buy().is_none());
    }

    #[test]
    fn test_targets_rejected_on_covered_sell() {
        let mut s: Trade = sell().into();
        let err = s.set_take_profit(120.0, 1.0).unwrap_err();
        assert!(matches!(err, EngineError::InvalidOperation(_)));
        let err = s.set_stop_loss(90.0, 1.0).unwrap_err();
        assert!(matches!(err, EngineError::InvalidOperation(_)));
    }

    #[test]
    fn test_targets_accepted_on_buy() {
        let mut t: Trade = buy().into();
        t.set_take_profit(220.0, 1.0).unwrap();
        t.set_stop_loss(190.0, 0.5).unwrap();
        let b = t.as_buy().unwrap();
        assert!(b.take_profit.active);
        assert_eq!(b.stop_loss.fraction, 0.5);
    }

    #[test]
    fn test_covered_sell_proceeds() {
        let s = sell().with_fees(0.0, 1.0);
        assert_eq!(s.proceeds(), 109.0);
    }

    #[test]
    fn test_trade_serialization_is_tagged() {
        let t: Trade = buy().into();
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["side"], "buy");
        assert_eq!(json["symbol"], "BTC");
        assert!(json.get("timestamp").is_none());

        let back: Trade = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }
}

//! Per-symbol price history with nearest-neighbour lookup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Symbol, Timestamp, Trade};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: Timestamp,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: Timestamp, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Points are kept sorted by timestamp, one per timestamp.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    data: BTreeMap<Symbol, Vec<PricePoint>>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Price history implied by the timestamped trades of a ledger.
    pub fn from_trades<'a, I>(trades: I) -> Self
    where
        I: IntoIterator<Item = &'a Trade>,
    {
        let mut series = Self::new();
        for trade in trades {
            if let Some(ts) = trade.timestamp() {
                series.set(trade.symbol().clone(), ts, trade.price());
            }
        }
        series
    }

    /// Insert a point, overwriting any point at the same timestamp.
    pub fn set(&mut self, symbol: Symbol, timestamp: Timestamp, price: f64) {
        let points = self.data.entry(symbol).or_default();
        match points.binary_search_by_key(&timestamp, |p| p.timestamp) {
            Ok(i) => points[i].price = price,
            Err(i) => points.insert(i, PricePoint::new(timestamp, price)),
        }
    }

    /// Replace a symbol's history.
    pub fn set_series(&mut self, symbol: Symbol, mut points: Vec<PricePoint>) {
        points.sort_by_key(|p| p.timestamp);
        points.dedup_by_key(|p| p.timestamp);
        self.data.insert(symbol, points);
    }

    /// Price nearest to `timestamp`; equidistant neighbours resolve to the earlier one.
    pub fn at(&self, symbol: &Symbol, timestamp: Timestamp) -> Option<f64> {
        let points = self.points(symbol)?;
        let idx = points.partition_point(|p| p.timestamp < timestamp);
        if idx == points.len() {
            return points.last().map(|p| p.price);
        }
        if idx == 0 {
            return Some(points[0].price);
        }
        let (prev, next) = (&points[idx - 1], &points[idx]);
        if next.timestamp.distance(timestamp) < prev.timestamp.distance(timestamp) {
            Some(next.price)
        } else {
            Some(prev.price)
        }
    }

    pub fn latest(&self, symbol: &Symbol) -> Option<f64> {
        self.points(symbol)?.last().map(|p| p.price)
    }

    /// Earliest timestamp across all symbols.
    pub fn earliest(&self) -> Option<Timestamp> {
        self.data.values().filter_map(|pts| pts.first()).map(|p| p.timestamp).min()
    }

    /// Latest timestamp across all symbols.
    pub fn latest_time(&self) -> Option<Timestamp> {
        self.data.values().filter_map(|pts| pts.last()).map(|p| p.timestamp).max()
    }

    /// Points with `from <= timestamp <= to`.
    pub fn range(&self, symbol: &Symbol, from: Timestamp, to: Timestamp) -> Vec<PricePoint> {
        self.points(symbol)
            .map(|pts| {
                pts.iter()
                    .filter(|p| p.timestamp >= from && p.timestamp <= to)
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.data
            .iter()
            .filter(|(_, pts)| !pts.is_empty())
            .map(|(sym, _)| sym.clone())
            .collect()
    }

    pub fn has_symbol(&self, symbol: &Symbol) -> bool {
        self.points(symbol).is_some()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    fn points(&self, symbol: &Symbol) -> Option<&[PricePoint]> {
        self.data
            .get(symbol)
            .filter(|pts| !pts.is_empty())
            .map(Vec::as_slice)
    }
}

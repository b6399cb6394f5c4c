//! Long-format market data panels.
//!
//! A price panel holds one close per (date, ticker); a fundamentals panel
//! holds one quarterly snapshot per (asof, ticker). Both are immutable once
//! built and are only ever read by the engines.

use crate::domain::error::ScreenerError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub ticker: String,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalSnapshot {
    pub asof: NaiveDate,
    pub ticker: String,
    /// Price/earnings proxy. May be zero or missing.
    pub pe: Option<f64>,
    pub op_margin: f64,
    pub net_debt: f64,
}

/// Inclusive calendar window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Rejects `start > end`; a single-day range is allowed.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ScreenerError> {
        if start > end {
            return Err(ScreenerError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricePanel {
    points: Vec<PricePoint>,
}

impl PricePanel {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, ScreenerError> {
        let mut seen = HashSet::with_capacity(points.len());
        for p in &points {
            if !seen.insert((p.date, p.ticker.as_str())) {
                return Err(ScreenerError::DuplicateObservation {
                    panel: "price",
                    ticker: p.ticker.clone(),
                    date: p.date,
                });
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points whose date falls inside `range`, in panel order.
    pub fn in_range(&self, range: DateRange) -> impl Iterator<Item = &PricePoint> {
        self.points.iter().filter(move |p| range.contains(p.date))
    }

    /// (first, last, count) over all dates in the panel.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate, usize)> {
        let min = self.points.iter().map(|p| p.date).min()?;
        let max = self.points.iter().map(|p| p.date).max()?;
        Some((min, max, self.points.len()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FundamentalsPanel {
    snapshots: Vec<FundamentalSnapshot>,
}

impl FundamentalsPanel {
    pub fn new(snapshots: Vec<FundamentalSnapshot>) -> Result<Self, ScreenerError> {
        let mut seen = HashSet::with_capacity(snapshots.len());
        for s in &snapshots {
            if !seen.insert((s.asof, s.ticker.as_str())) {
                return Err(ScreenerError::DuplicateObservation {
                    panel: "fundamentals",
                    ticker: s.ticker.clone(),
                    date: s.asof,
                });
            }
        }
        Ok(Self { snapshots })
    }

    pub fn snapshots(&self) -> &[FundamentalSnapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// The two source panels supplied by the market data port.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketData {
    pub prices: PricePanel,
    pub fundamentals: FundamentalsPanel,
}

#![allow(dead_code)]

use chrono::NaiveDate;
use factorscreen::domain::error::ScreenerError;
use factorscreen::domain::panel::{
    FundamentalSnapshot, FundamentalsPanel, MarketData, PricePanel, PricePoint,
};
use factorscreen::ports::data_port::MarketDataPort;
use std::cell::Cell;
use std::sync::Arc;

pub struct MockDataPort {
    pub data: Arc<MarketData>,
    pub error: Option<String>,
    pub loads: Cell<usize>,
}

impl MockDataPort {
    pub fn new(data: MarketData) -> Self {
        Self {
            data: Arc::new(data),
            error: None,
            loads: Cell::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            data: Arc::new(MarketData::default()),
            error: Some(reason.to_string()),
            loads: Cell::new(0),
        }
    }
}

impl MarketDataPort for MockDataPort {
    fn load(&self) -> Result<Arc<MarketData>, ScreenerError> {
        self.loads.set(self.loads.get() + 1);
        if let Some(reason) = &self.error {
            return Err(ScreenerError::Data {
                reason: reason.clone(),
            });
        }
        Ok(Arc::clone(&self.data))
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_price(ticker: &str, date: &str, close: f64) -> PricePoint {
    PricePoint {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        ticker: ticker.to_string(),
        close,
    }
}

pub fn make_snapshot(
    ticker: &str,
    asof: &str,
    pe: Option<f64>,
    op_margin: f64,
    net_debt: f64,
) -> FundamentalSnapshot {
    FundamentalSnapshot {
        asof: NaiveDate::parse_from_str(asof, "%Y-%m-%d").unwrap(),
        ticker: ticker.to_string(),
        pe,
        op_margin,
        net_debt,
    }
}

pub fn market(prices: Vec<PricePoint>, snapshots: Vec<FundamentalSnapshot>) -> MarketData {
    MarketData {
        prices: PricePanel::new(prices).unwrap(),
        fundamentals: FundamentalsPanel::new(snapshots).unwrap(),
    }
}

/// Five business days from Monday 2024-01-01: A climbs 1 a day, B drops 1 a
/// day, C is flat, all starting at 100.
pub fn abc_prices() -> Vec<PricePoint> {
    let days = ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05"];
    let mut prices = Vec::new();
    for (ticker, step) in [("A", 1.0), ("B", -1.0), ("C", 0.0)] {
        for (i, day) in days.iter().enumerate() {
            prices.push(make_price(ticker, day, 100.0 + step * i as f64));
        }
    }
    prices
}

pub fn exit_code_eq(a: std::process::ExitCode, b: std::process::ExitCode) -> bool {
    format!("{a:?}") == format!("{b:?}")
}

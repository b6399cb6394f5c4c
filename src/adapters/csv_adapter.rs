//! CSV file data adapter.
//!
//! A data directory holds two long-format files:
//! `prices.csv` (`date,ticker,close`) and
//! `fundamentals.csv` (`asof,ticker,pe,op_margin,net_debt`, `pe` may be empty).

use crate::domain::error::ScreenerError;
use crate::domain::panel::{FundamentalSnapshot, FundamentalsPanel, MarketData, PricePanel, PricePoint};
use crate::ports::data_port::MarketDataPort;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub const PRICES_FILE: &str = "prices.csv";
pub const FUNDAMENTALS_FILE: &str = "fundamentals.csv";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn prices_path(&self) -> PathBuf {
        self.base_path.join(PRICES_FILE)
    }

    fn fundamentals_path(&self) -> PathBuf {
        self.base_path.join(FUNDAMENTALS_FILE)
    }
}

impl MarketDataPort for CsvAdapter {
    fn load(&self) -> Result<Arc<MarketData>, ScreenerError> {
        let prices: Vec<PricePoint> = read_rows(&self.prices_path())?;
        let (prices, dropped): (Vec<PricePoint>, Vec<PricePoint>) = prices
            .into_iter()
            .partition(|p| p.close.is_finite() && p.close > 0.0);
        if !dropped.is_empty() {
            warn!(rows = dropped.len(), "skipping prices with non-positive close");
        }

        let fundamentals: Vec<FundamentalSnapshot> = read_rows(&self.fundamentals_path())?;

        info!(
            dir = %self.base_path.display(),
            prices = prices.len(),
            fundamentals = fundamentals.len(),
            "loaded csv panels"
        );

        Ok(Arc::new(MarketData {
            prices: PricePanel::new(prices)?,
            fundamentals: FundamentalsPanel::new(fundamentals)?,
        }))
    }

    fn describe(&self) -> String {
        format!("csv ({})", self.base_path.display())
    }
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ScreenerError> {
    let content = fs::read_to_string(path).map_err(|e| ScreenerError::Data {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    rdr.deserialize::<T>()
        .enumerate()
        .map(|(i, row)| {
            row.map_err(|e| ScreenerError::Data {
                reason: format!("{} row {}: {}", path.display(), i + 1, e),
            })
        })
        .collect()
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), ScreenerError> {
    let data_error = |e: csv::Error| ScreenerError::Data {
        reason: format!("failed to write {}: {}", path.display(), e),
    };
    let mut wtr = csv::Writer::from_path(path).map_err(data_error)?;
    for row in rows {
        wtr.serialize(row).map_err(data_error)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write both panels into `dir` in the layout `CsvAdapter` reads.
pub fn write_market_data(dir: &Path, data: &MarketData) -> Result<(), ScreenerError> {
    fs::create_dir_all(dir)?;
    write_rows(&dir.join(PRICES_FILE), data.prices.points())?;
    write_rows(&dir.join(FUNDAMENTALS_FILE), data.fundamentals.snapshots())?;
    Ok(())
}

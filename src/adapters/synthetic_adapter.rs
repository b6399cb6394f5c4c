//! Deterministic synthetic market data.
//!
//! Daily closes follow a per-ticker geometric random walk over business
//! days; fundamentals are drawn once per calendar quarter-end. A seeded
//! `StdRng` makes identical parameters produce identical panels, and
//! [`PanelCache`] memoizes generated panels by the full parameter tuple.

use crate::domain::error::ScreenerError;
use crate::domain::panel::{FundamentalSnapshot, FundamentalsPanel, MarketData, PricePanel, PricePoint};
use crate::ports::data_port::MarketDataPort;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal, Normal, StandardNormal, Uniform};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

pub const DEFAULT_SEED: u64 = 7;
pub const DEFAULT_TICKERS: usize = 200;
pub const DEFAULT_DAYS: usize = 756;
const START_PRICE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenerationParams {
    pub seed: u64,
    pub n_tickers: usize,
    pub n_days: usize,
    /// Last calendar day of the price history; weekends roll back to Friday.
    pub end_date: NaiveDate,
}

impl GenerationParams {
    pub fn with_defaults(end_date: NaiveDate) -> Self {
        Self {
            seed: DEFAULT_SEED,
            n_tickers: DEFAULT_TICKERS,
            n_days: DEFAULT_DAYS,
            end_date,
        }
    }
}

/// Memoized panels keyed by generation parameters. An identical key returns
/// the same shared panels without regenerating; `clear` drops every entry.
#[derive(Debug, Default)]
pub struct PanelCache {
    entries: Mutex<HashMap<GenerationParams, Arc<MarketData>>>,
    generated: AtomicUsize,
}

impl PanelCache {
    pub fn get_or_generate(&self, params: &GenerationParams) -> Result<Arc<MarketData>, ScreenerError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = entries.get(params) {
            debug!(seed = params.seed, "synthetic panels served from cache");
            return Ok(Arc::clone(hit));
        }

        let data = Arc::new(generate(params)?);
        self.generated.fetch_add(1, Ordering::Relaxed);
        info!(
            seed = params.seed,
            tickers = params.n_tickers,
            days = params.n_days,
            prices = data.prices.len(),
            fundamentals = data.fundamentals.len(),
            "generated synthetic panels"
        );
        entries.insert(params.clone(), Arc::clone(&data));
        Ok(data)
    }

    /// Number of cache misses so far.
    pub fn generated(&self) -> usize {
        self.generated.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

pub struct SyntheticAdapter {
    params: GenerationParams,
    cache: Arc<PanelCache>,
}

impl SyntheticAdapter {
    pub fn new(params: GenerationParams) -> Self {
        Self::with_cache(params, Arc::new(PanelCache::default()))
    }

    pub fn with_cache(params: GenerationParams, cache: Arc<PanelCache>) -> Self {
        Self { params, cache }
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }
}

impl MarketDataPort for SyntheticAdapter {
    fn load(&self) -> Result<Arc<MarketData>, ScreenerError> {
        self.cache.get_or_generate(&self.params)
    }

    fn describe(&self) -> String {
        format!(
            "synthetic (seed {}, {} tickers, {} days to {})",
            self.params.seed, self.params.n_tickers, self.params.n_days, self.params.end_date
        )
    }
}

fn distribution_error(e: impl std::fmt::Display) -> ScreenerError {
    ScreenerError::Data {
        reason: format!("invalid distribution parameters: {e}"),
    }
}

/// Generate both panels for `params`.
pub fn generate(params: &GenerationParams) -> Result<MarketData, ScreenerError> {
    let mut rng = StdRng::seed_from_u64(params.seed);

    let tickers: Vec<String> = (0..params.n_tickers).map(|i| format!("T{i:04}")).collect();
    let dates = business_days_ending(params.end_date, params.n_days);

    let drift = Normal::new(0.0002, 0.00005).map_err(distribution_error)?;
    let mu: Vec<f64> = (0..tickers.len()).map(|_| drift.sample(&mut rng)).collect();
    let vol = Uniform::new(0.01, 0.03);
    let sigma: Vec<f64> = (0..tickers.len()).map(|_| vol.sample(&mut rng)).collect();

    // Row-major draw order: one row of returns per date.
    let mut log_price = vec![0.0_f64; tickers.len()];
    let mut closes: Vec<Vec<f64>> = vec![Vec::with_capacity(dates.len()); tickers.len()];
    for _ in &dates {
        for (t, lp) in log_price.iter_mut().enumerate() {
            let z: f64 = rng.sample(StandardNormal);
            *lp += mu[t] + sigma[t] * z;
            closes[t].push(START_PRICE * lp.exp());
        }
    }

    let mut points = Vec::with_capacity(tickers.len() * dates.len());
    for (ticker, series) in tickers.iter().zip(&closes) {
        for (date, close) in dates.iter().zip(series) {
            points.push(PricePoint {
                date: *date,
                ticker: ticker.clone(),
                close: *close,
            });
        }
    }

    let pe_dist = LogNormal::new(3.2, 0.4).map_err(distribution_error)?;
    let margin_dist = Normal::new(0.15, 0.05).map_err(distribution_error)?;
    let debt_dist = LogNormal::new(4.0, 0.3).map_err(distribution_error)?;

    let mut snapshots = Vec::new();
    if let (Some(&first), Some(&last)) = (dates.first(), dates.last()) {
        for asof in quarter_ends_between(first, last) {
            let pe: Vec<f64> = (0..tickers.len()).map(|_| pe_dist.sample(&mut rng)).collect();
            let margin: Vec<f64> = (0..tickers.len()).map(|_| margin_dist.sample(&mut rng)).collect();
            let debt: Vec<f64> = (0..tickers.len()).map(|_| debt_dist.sample(&mut rng)).collect();
            for (i, ticker) in tickers.iter().enumerate() {
                snapshots.push(FundamentalSnapshot {
                    asof,
                    ticker: ticker.clone(),
                    pe: Some(pe[i]),
                    op_margin: margin[i],
                    net_debt: debt[i],
                });
            }
        }
    }

    Ok(MarketData {
        prices: PricePanel::new(points)?,
        fundamentals: FundamentalsPanel::new(snapshots)?,
    })
}

fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The last `count` weekdays on or before `end`, ascending.
pub fn business_days_ending(end: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut cursor = end;
    while days.len() < count {
        if is_business_day(cursor) {
            days.push(cursor);
        }
        match cursor.pred_opt() {
            Some(prev) => cursor = prev,
            None => break,
        }
    }
    days.reverse();
    days
}

/// Calendar quarter-ends (Mar 31, Jun 30, Sep 30, Dec 31) within `[first, last]`.
pub fn quarter_ends_between(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    (first.year()..=last.year())
        .flat_map(|year| {
            [(3, 31), (6, 30), (9, 30), (12, 31)]
                .into_iter()
                .filter_map(move |(m, d)| NaiveDate::from_ymd_opt(year, m, d))
        })
        .filter(|q| first <= *q && *q <= last)
        .collect()
}

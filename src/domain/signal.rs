//! Cross-sectional factor screen.
//!
//! Turns a price panel and a fundamentals panel into one ranked row per
//! ticker as of the last in-range price date:
//!
//! - momentum: `close_last / close_first - 1` over the in-range prices
//! - value: `1 / pe`, undefined when `pe` is missing or zero
//! - quality: operating margin
//!
//! Each factor is z-scored across tickers, then combined with raw (not
//! normalized) weights into the composite `signal`.

use crate::domain::panel::{DateRange, FundamentalSnapshot, FundamentalsPanel, PricePanel, PricePoint};
use crate::domain::stats::zscore;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorWeights {
    pub value: f64,
    pub momentum: f64,
    pub quality: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            value: 0.35,
            momentum: 0.45,
            quality: 0.20,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalRow {
    pub ticker: String,
    /// Date of the last in-range price.
    pub asof: NaiveDate,
    pub close: f64,
    pub mom: f64,
    pub pe: Option<f64>,
    pub op_margin: Option<f64>,
    pub net_debt: Option<f64>,
    pub value: Option<f64>,
    pub quality: Option<f64>,
    pub z_mom: Option<f64>,
    pub z_value: Option<f64>,
    pub z_quality: Option<f64>,
    pub signal: Option<f64>,
}

/// Per-ticker endpoints of the in-range price history.
struct PriceSnapshot<'a> {
    ticker: &'a str,
    asof: NaiveDate,
    close: f64,
    close_start: f64,
}

/// Compute the ranked signal table.
///
/// `lookback_days` is accepted and logged but does not narrow the momentum
/// window: momentum always spans the whole of `range`.
pub fn compute_signals(
    prices: &PricePanel,
    fundamentals: &FundamentalsPanel,
    range: &DateRange,
    lookback_days: u32,
    weights: &FactorWeights,
) -> Vec<SignalRow> {
    let snapshots = price_snapshots(prices, range);
    debug!(
        tickers = snapshots.len(),
        lookback_days,
        start = %range.start(),
        end = %range.end(),
        "computing signals"
    );

    let latest = latest_fundamentals(fundamentals, range.end());

    let mut rows: Vec<SignalRow> = snapshots
        .iter()
        .map(|s| {
            let f = latest.get(s.ticker);
            let pe = f.and_then(|f| f.pe);
            SignalRow {
                ticker: s.ticker.to_string(),
                asof: s.asof,
                close: s.close,
                mom: s.close / s.close_start - 1.0,
                pe,
                op_margin: f.map(|f| f.op_margin),
                net_debt: f.map(|f| f.net_debt),
                value: value_factor(pe),
                quality: f.map(|f| f.op_margin).filter(|m| m.is_finite()),
                z_mom: None,
                z_value: None,
                z_quality: None,
                signal: None,
            }
        })
        .collect();

    let z_mom = zscore(&rows.iter().map(|r| Some(r.mom)).collect::<Vec<_>>());
    let z_value = zscore(&rows.iter().map(|r| r.value).collect::<Vec<_>>());
    let z_quality = zscore(&rows.iter().map(|r| r.quality).collect::<Vec<_>>());

    for (i, row) in rows.iter_mut().enumerate() {
        row.z_mom = z_mom[i];
        row.z_value = z_value[i];
        row.z_quality = z_quality[i];
        row.signal = composite(weights, row.z_mom, row.z_value, row.z_quality);
    }

    // Stable: equal signals keep ticker order, undefined signals go last.
    rows.sort_by(|a, b| rank_order(a.signal, b.signal));
    rows
}

/// First `n` tickers of a ranked table.
pub fn top_n(rows: &[SignalRow], n: usize) -> Vec<String> {
    rows.iter().take(n).map(|r| r.ticker.clone()).collect()
}

/// Group in-range prices by ticker after a (ticker, date) sort and keep the
/// first and last row of each group.
fn price_snapshots<'a>(prices: &'a PricePanel, range: &DateRange) -> Vec<PriceSnapshot<'a>> {
    let mut px: Vec<&PricePoint> = prices.in_range(*range).collect();
    px.sort_by(|a, b| a.ticker.cmp(&b.ticker).then(a.date.cmp(&b.date)));

    let mut out: Vec<PriceSnapshot<'a>> = Vec::new();
    for p in px {
        match out.last_mut() {
            Some(last) if last.ticker == p.ticker => {
                last.asof = p.date;
                last.close = p.close;
            }
            _ => out.push(PriceSnapshot {
                ticker: &p.ticker,
                asof: p.date,
                close: p.close,
                close_start: p.close,
            }),
        }
    }
    out
}

/// Most recent snapshot per ticker with `asof <= end`.
fn latest_fundamentals(
    fundamentals: &FundamentalsPanel,
    end: NaiveDate,
) -> HashMap<&str, &FundamentalSnapshot> {
    let mut latest: HashMap<&str, &FundamentalSnapshot> = HashMap::new();
    for s in fundamentals.snapshots().iter().filter(|s| s.asof <= end) {
        latest
            .entry(s.ticker.as_str())
            .and_modify(|cur| {
                if s.asof > cur.asof {
                    *cur = s;
                }
            })
            .or_insert(s);
    }
    latest
}

fn value_factor(pe: Option<f64>) -> Option<f64> {
    pe.filter(|pe| *pe != 0.0 && pe.is_finite())
        .map(|pe| 1.0 / pe)
}

/// Weighted sum of the z-scores. A zero-weighted factor is left out, so
/// its missing value cannot void the score; any other missing factor does.
fn composite(
    weights: &FactorWeights,
    z_mom: Option<f64>,
    z_value: Option<f64>,
    z_quality: Option<f64>,
) -> Option<f64> {
    let terms = [
        (weights.momentum, z_mom),
        (weights.value, z_value),
        (weights.quality, z_quality),
    ];
    let mut total = 0.0;
    for (w, z) in terms {
        if w == 0.0 {
            continue;
        }
        total += w * z?;
    }
    Some(total).filter(|s| !s.is_nan())
}

fn rank_order(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

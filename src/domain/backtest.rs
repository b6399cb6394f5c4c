//! Equal-weight buy-and-hold backtest over a set of picks.
//!
//! Prices are reshaped into a date × ticker matrix, each column is divided
//! by its value on the first row, and the curve is the per-date mean of
//! whatever normalized values are present. No fills, no costs.

use crate::domain::panel::{DateRange, PricePanel};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Date-indexed, ticker-columned close matrix. Missing cells are absent.
struct CloseMatrix<'a> {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<&'a str, HashMap<NaiveDate, f64>>,
}

impl<'a> CloseMatrix<'a> {
    fn build(prices: &'a PricePanel, picks: &HashSet<&str>, range: DateRange) -> Self {
        let mut dates = BTreeSet::new();
        let mut columns: BTreeMap<&'a str, HashMap<NaiveDate, f64>> = BTreeMap::new();
        for p in prices
            .in_range(range)
            .filter(|p| picks.contains(p.ticker.as_str()))
        {
            dates.insert(p.date);
            columns
                .entry(p.ticker.as_str())
                .or_default()
                .insert(p.date, p.close);
        }
        Self {
            dates: dates.into_iter().collect(),
            columns,
        }
    }
}

/// Run the equal-weight backtest for `picks` over `range`.
///
/// Empty picks, unknown tickers or a range without prices all give an
/// empty curve. A pick with no close on the first row of the matrix has
/// no base to normalize against and is left out.
pub fn simple_backtest(prices: &PricePanel, picks: &[String], range: &DateRange) -> Vec<EquityPoint> {
    let picks: HashSet<&str> = picks.iter().map(String::as_str).collect();
    let matrix = CloseMatrix::build(prices, &picks, *range);

    let Some(&first) = matrix.dates.first() else {
        debug!(picks = picks.len(), "no prices for picks in range");
        return Vec::new();
    };

    let based: Vec<(&HashMap<NaiveDate, f64>, f64)> = matrix
        .columns
        .values()
        .filter_map(|closes| closes.get(&first).map(|&base| (closes, base)))
        .collect();

    debug!(
        dates = matrix.dates.len(),
        tickers = matrix.columns.len(),
        based = based.len(),
        "running backtest"
    );

    matrix
        .dates
        .iter()
        .filter_map(|date| {
            let (sum, n) = based
                .iter()
                .filter_map(|(closes, base)| closes.get(date).map(|c| c / base))
                .fold((0.0_f64, 0usize), |(s, n), v| (s + v, n + 1));
            (n > 0).then(|| EquityPoint {
                date: *date,
                equity: sum / n as f64,
            })
        })
        .collect()
}

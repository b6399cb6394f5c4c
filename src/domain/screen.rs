//! One screening run: rank, take the top names, backtest them.

use crate::domain::backtest::{EquityPoint, simple_backtest};
use crate::domain::metrics::CurveMetrics;
use crate::domain::panel::{DateRange, MarketData};
use crate::domain::signal::{FactorWeights, SignalRow, compute_signals, top_n};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenParams {
    /// Display label only; never used to filter tickers.
    pub universe: String,
    pub max_names: usize,
    pub lookback_days: u32,
    pub range: DateRange,
    pub weights: FactorWeights,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenResult {
    /// Full ranked table, best first.
    pub ranked: Vec<SignalRow>,
    pub picks: Vec<String>,
    pub equity: Vec<EquityPoint>,
    pub metrics: CurveMetrics,
}

impl ScreenResult {
    /// Ranked rows that made the cut.
    pub fn top(&self) -> &[SignalRow] {
        &self.ranked[..self.picks.len()]
    }
}

pub fn run_screen(data: &MarketData, params: &ScreenParams) -> ScreenResult {
    let ranked = compute_signals(
        &data.prices,
        &data.fundamentals,
        &params.range,
        params.lookback_days,
        &params.weights,
    );
    let picks = top_n(&ranked, params.max_names);
    let equity = simple_backtest(&data.prices, &picks, &params.range);
    let metrics = CurveMetrics::compute(&equity);

    info!(
        universe = %params.universe,
        ranked = ranked.len(),
        picks = picks.len(),
        days = equity.len(),
        "screen complete"
    );

    ScreenResult {
        ranked,
        picks,
        equity,
        metrics,
    }
}

//! Markdown tables for screen reports.

use crate::domain::metrics::CurveMetrics;
use crate::domain::screen::ScreenParams;
use crate::domain::signal::SignalRow;

const UNDEFINED: &str = "-";

pub fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", decimals, v),
        _ => UNDEFINED.to_string(),
    }
}

pub fn render_summary(params: &ScreenParams, ranked: usize, picks: usize) -> String {
    let mut output = String::new();
    output.push_str("| Property | Value |\n| --- | --- |\n");
    output.push_str(&format!("| Universe | {} |\n", params.universe));
    output.push_str(&format!("| Start Date | {} |\n", params.range.start()));
    output.push_str(&format!("| End Date | {} |\n", params.range.end()));
    output.push_str(&format!("| Lookback Days | {} |\n", params.lookback_days));
    output.push_str(&format!("| Max Names | {} |\n", params.max_names));
    output.push_str(&format!(
        "| Weights (value / momentum / quality) | {:.2} / {:.2} / {:.2} |\n",
        params.weights.value, params.weights.momentum, params.weights.quality
    ));
    output.push_str(&format!("| Tickers Ranked | {} |\n", ranked));
    output.push_str(&format!("| Tickers Picked | {} |\n", picks));
    output.push('\n');
    output
}

pub fn render_metrics_table(metrics: &CurveMetrics) -> String {
    if metrics.trading_days == 0 {
        return "_No equity data._\n\n".to_string();
    }

    let mut output = String::new();
    output.push_str("| Metric | Value |\n| --- | --- |\n");
    output.push_str(&format!(
        "| Total Return | {:.2}% |\n",
        metrics.total_return * 100.0
    ));
    output.push_str(&format!(
        "| Annualized Return | {:.2}% |\n",
        metrics.annualized_return * 100.0
    ));
    output.push_str(&format!(
        "| Max Drawdown | {:.2}% |\n",
        metrics.max_drawdown * 100.0
    ));
    output.push_str(&format!(
        "| Max Drawdown Duration | {} days |\n",
        metrics.max_drawdown_duration
    ));
    output.push_str(&format!("| Trading Days | {} |\n", metrics.trading_days));
    output.push('\n');
    output
}

pub fn render_ranked_table(rows: &[SignalRow]) -> String {
    if rows.is_empty() {
        return "_No tickers had prices in the window._\n\n".to_string();
    }

    let mut output = String::new();
    output.push_str(
        "| # | Ticker | As Of | Close | Momentum | P/E | Op Margin | Net Debt | z Mom | z Value | z Quality | Signal |\n",
    );
    output.push_str("| --- | --- | --- | --- | --- | --- | --- | --- | --- | --- | --- | --- |\n");

    for (i, row) in rows.iter().enumerate() {
        output.push_str(&format!(
            "| {} | {} | {} | {:.2} | {:.2}% | {} | {} | {} | {} | {} | {} | {} |\n",
            i + 1,
            row.ticker,
            row.asof,
            row.close,
            row.mom * 100.0,
            fmt_opt(row.pe, 1),
            fmt_opt(row.op_margin.map(|m| m * 100.0), 1),
            fmt_opt(row.net_debt, 1),
            fmt_opt(row.z_mom, 2),
            fmt_opt(row.z_value, 2),
            fmt_opt(row.z_quality, 2),
            fmt_opt(row.signal, 3),
        ));
    }

    output.push('\n');
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::panel::DateRange;
    use crate::domain::signal::FactorWeights;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(ticker: &str, signal: Option<f64>) -> SignalRow {
        SignalRow {
            ticker: ticker.to_string(),
            asof: date(2024, 6, 28),
            close: 101.5,
            mom: 0.015,
            pe: Some(20.0),
            op_margin: Some(0.125),
            net_debt: None,
            value: Some(0.05),
            quality: None,
            z_mom: Some(0.5),
            z_value: Some(-0.25),
            z_quality: None,
            signal,
        }
    }

    #[test]
    fn fmt_opt_dashes_undefined() {
        assert_eq!(fmt_opt(Some(1.23456), 2), "1.23");
        assert_eq!(fmt_opt(None, 2), "-");
        assert_eq!(fmt_opt(Some(f64::NAN), 2), "-");
    }

    #[test]
    fn summary_lists_parameters() {
        let params = ScreenParams {
            universe: "US Small Cap (Synthetic)".into(),
            max_names: 25,
            lookback_days: 126,
            range: DateRange::new(date(2023, 1, 1), date(2024, 12, 31)).unwrap(),
            weights: FactorWeights::default(),
        };
        let out = render_summary(&params, 200, 25);
        assert!(out.contains("| Universe | US Small Cap (Synthetic) |"));
        assert!(out.contains("| Start Date | 2023-01-01 |"));
        assert!(out.contains("0.35 / 0.45 / 0.20"));
        assert!(out.contains("| Tickers Picked | 25 |"));
    }

    #[test]
    fn metrics_table_formats_percentages() {
        let metrics = CurveMetrics {
            total_return: 0.125,
            annualized_return: 0.05,
            max_drawdown: 0.1,
            max_drawdown_duration: 12,
            trading_days: 300,
        };
        let out = render_metrics_table(&metrics);
        assert!(out.contains("| Total Return | 12.50% |"));
        assert!(out.contains("| Max Drawdown Duration | 12 days |"));
    }

    #[test]
    fn metrics_table_without_data() {
        assert!(render_metrics_table(&CurveMetrics::default()).contains("No equity data"));
    }

    #[test]
    fn ranked_table_rows() {
        let out = render_ranked_table(&[row("AAA", Some(1.2341)), row("BBB", None)]);
        assert!(out.ends_with("|\n\n"));
        let lines: Vec<&str> = out.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[2],
            "| 1 | AAA | 2024-06-28 | 101.50 | 1.50% | 20.0 | 12.5 | - | 0.50 | -0.25 | - | 1.234 |"
        );
        assert!(lines[3].starts_with("| 2 | BBB |"));
        assert!(lines[3].ends_with("| - |"));
    }

    #[test]
    fn ranked_table_empty() {
        assert!(render_ranked_table(&[]).contains("No tickers"));
    }
}

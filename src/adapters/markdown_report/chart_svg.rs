//! Standalone SVG rendering of the equity curve.

use crate::domain::backtest::EquityPoint;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 240.0;
const PADDING: f64 = 40.0;

/// Render the curve as an SVG document. Returns an empty string when there is
/// nothing to plot.
pub fn generate_equity_svg(equity_curve: &[EquityPoint]) -> String {
    let (Some(first), Some(last)) = (equity_curve.first(), equity_curve.last()) else {
        return String::new();
    };

    let min_equity = equity_curve
        .iter()
        .map(|p| p.equity)
        .fold(f64::INFINITY, f64::min);
    let max_equity = equity_curve
        .iter()
        .map(|p| p.equity)
        .fold(f64::NEG_INFINITY, f64::max);

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;

    let range = max_equity - min_equity;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let scale_x = if equity_curve.len() > 1 {
        plot_width / (equity_curve.len() - 1) as f64
    } else {
        0.0
    };

    let points: Vec<String> = equity_curve
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let x = PADDING + i as f64 * scale_x;
            let y = HEIGHT - PADDING - (point.equity - min_equity) * scale_y;
            format!("{:.1},{:.1}", x, y)
        })
        .collect();

    // Baseline at 1.0 when it falls inside the plotted range.
    let baseline = if (min_equity..=max_equity).contains(&1.0) && range > 0.0 {
        let y = HEIGHT - PADDING - (1.0 - min_equity) * scale_y;
        format!(
            "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#999999\" stroke-dasharray=\"4 4\"/>\n",
            PADDING,
            y,
            WIDTH - PADDING,
            y
        )
    } else {
        String::new()
    };

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">
  <rect width="{w:.0}" height="{h:.0}" fill="white"/>
  <line x1="{p:.0}" y1="{p:.0}" x2="{p:.0}" y2="{bottom:.0}" stroke="black"/>
  <line x1="{p:.0}" y1="{bottom:.0}" x2="{right:.0}" y2="{bottom:.0}" stroke="black"/>
{baseline}  <polyline fill="none" stroke="#1f77b4" stroke-width="1.5" points="{points}"/>
  <text x="{p:.0}" y="{label_y:.0}" font-size="11">{start}</text>
  <text x="{right:.0}" y="{label_y:.0}" font-size="11" text-anchor="end">{end}</text>
  <text x="4" y="{p:.0}" font-size="11">{max:.3}</text>
  <text x="4" y="{bottom:.0}" font-size="11">{min:.3}</text>
</svg>
"##,
        w = WIDTH,
        h = HEIGHT,
        p = PADDING,
        bottom = HEIGHT - PADDING,
        right = WIDTH - PADDING,
        label_y = HEIGHT - PADDING / 3.0,
        baseline = baseline,
        points = points.join(" "),
        start = first.date,
        end = last.date,
        max = max_equity,
        min = min_equity,
    )
}

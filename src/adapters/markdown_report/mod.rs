//! Markdown screen reports.
//!
//! The report links an equity-curve SVG written next to it with the same
//! file stem, so `out/screen.md` is accompanied by `out/screen.svg`.

pub mod chart_svg;
pub mod tables;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::error::ScreenerError;
use crate::domain::screen::{ScreenParams, ScreenResult};
use crate::ports::report_port::ReportPort;

#[derive(Debug, Default)]
pub struct MarkdownReportAdapter;

impl MarkdownReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// Path of the chart that accompanies a report at `output_path`.
pub fn chart_path(output_path: &Path) -> PathBuf {
    output_path.with_extension("svg")
}

/// Build the Markdown body. `chart` is the file name to link, if a chart was
/// written.
pub fn render(result: &ScreenResult, params: &ScreenParams, chart: Option<&str>) -> String {
    let mut output = String::new();
    output.push_str(&format!("# Factor Screen: {}\n\n", params.universe));

    output.push_str("## Summary\n\n");
    output.push_str(&tables::render_summary(
        params,
        result.ranked.len(),
        result.picks.len(),
    ));

    output.push_str("## Equity Curve\n\n");
    match chart {
        Some(file) => output.push_str(&format!("![Equity curve]({file})\n\n")),
        None => output.push_str("_No equity data._\n\n"),
    }
    output.push_str(&tables::render_metrics_table(&result.metrics));

    output.push_str(&format!("## Top {} Names\n\n", result.picks.len()));
    output.push_str(&tables::render_ranked_table(result.top()));

    output
}

impl ReportPort for MarkdownReportAdapter {
    fn write(
        &self,
        result: &ScreenResult,
        params: &ScreenParams,
        output_path: &Path,
    ) -> Result<(), ScreenerError> {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let svg = chart_svg::generate_equity_svg(&result.equity);
        let svg_path = chart_path(output_path);
        let chart = if svg.is_empty() {
            None
        } else {
            fs::write(&svg_path, svg)?;
            svg_path.file_name().map(|n| n.to_string_lossy().into_owned())
        };

        fs::write(output_path, render(result, params, chart.as_deref()))?;
        info!(report = %output_path.display(), chart = chart.is_some(), "report written");
        Ok(())
    }
}

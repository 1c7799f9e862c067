//! Plain-text report adapter implementing ReportPort.
//!
//! Writes `report.txt`: the metrics summary, input issues, and a trade log
//! covering every labeled event.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::engine::LabelingResult;
use crate::domain::error::TribarError;
use crate::domain::trade::ClosedTrade;
use crate::ports::report_port::ReportPort;

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Default)]
pub struct TextReportAdapter {
    /// Cap on trade log rows; `None` writes all of them.
    pub max_trade_rows: Option<usize>,
}

impl TextReportAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self, result: &LabelingResult) -> String {
        let mut out = String::new();
        out.push_str(&format!("Symbol:           {}\n", result.symbol));
        out.push_str(&format!(
            "Window:           {} to {} ({} warmup rows dropped)\n",
            result.first_ts.format(TS_FORMAT),
            result.last_ts.format(TS_FORMAT),
            result.warmup_rows
        ));
        out.push('\n');
        out.push_str(&self.render_summary(result));

        let issue_count = result.signal_issues.len() + result.event_issues.len();
        if issue_count > 0 {
            out.push_str(&format!("\n=== Issues ({issue_count}) ===\n"));
            for issue in &result.signal_issues {
                out.push_str(&format!("  {issue}\n"));
            }
            for issue in &result.event_issues {
                out.push_str(&format!("  {issue}\n"));
            }
        }

        out.push_str("\n=== Trade Log ===\n");
        out.push_str(&trade_log(&result.trades, self.max_trade_rows));
        out
    }
}

fn trade_log(trades: &[ClosedTrade], limit: Option<usize>) -> String {
    let mut out = format!(
        "{:<19}  {:<19}  {:<5}  {:<11}  {:>10}  {:>10}  {:>9}  {:>6}\n",
        "entry", "close", "side", "reason", "entry_px", "close_px", "return", "active"
    );
    let shown = limit.unwrap_or(trades.len()).min(trades.len());
    for t in &trades[..shown] {
        out.push_str(&format!(
            "{:<19}  {:<19}  {:<5}  {:<11}  {:>10.4}  {:>10.4}  {:>8.3}%  {:>6}\n",
            t.entry_ts.format(TS_FORMAT),
            t.close_ts.format(TS_FORMAT),
            t.side,
            t.close_reason,
            t.entry_price,
            t.close_price,
            t.raw_return * 100.0,
            if t.active { "yes" } else { "no" }
        ));
    }
    if shown < trades.len() {
        out.push_str(&format!("... {} more\n", trades.len() - shown));
    }
    out
}

impl ReportPort for TextReportAdapter {
    fn write(&self, result: &LabelingResult, output_dir: &Path) -> Result<Vec<PathBuf>, TribarError> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join("report.txt");
        fs::write(&path, self.render(result))?;
        Ok(vec![path])
    }
}

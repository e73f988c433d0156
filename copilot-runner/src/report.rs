//! Plain-text backtest report and JSON export.

use crate::backtest::BacktestResult;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

const RULE_WIDTH: usize = 70;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct TextReportGenerator;

impl TextReportGenerator {
    pub fn generate(&self, result: &BacktestResult, suggestions: &[String]) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut report = format!(
            "{rule}\n\
SIGNAL BACKTEST REPORT\n\
{rule}\n\
\n\
OVERALL PERFORMANCE:\n\
  Total Signals: {}\n\
  Evaluated: {} (skipped {})\n\
  Lookforward: {} candles\n\
  Overall Accuracy: {:.1}%\n\
\n",
            result.total_signals,
            result.evaluated_signals(),
            result.skipped_signals,
            result.lookforward_candles,
            result.overall_accuracy,
        );

        report.push_str(&format!(
            "BUY SIGNALS:\n\
  Total: {}\n\
  Profitable: {} ({:.1}%)\n\
  Losing: {}\n\
\n\
SELL SIGNALS:\n\
  Total: {}\n\
  Profitable: {} ({:.1}%)\n\
  Losing: {}\n\
\n",
            result.buy_signals,
            result.profitable_buys,
            result.buy_accuracy,
            result.losing_buys,
            result.sell_signals,
            result.profitable_sells,
            result.sell_accuracy,
            result.losing_sells,
        ));

        report.push_str(&format!("{rule}\nIMPROVEMENT SUGGESTIONS:\n{rule}\n"));
        for line in suggestions {
            report.push_str(line);
            report.push('\n');
        }
        report.push('\n');
        report.push_str(&rule);
        report.push('\n');
        report
    }
}

/// Pretty-printed JSON for any report payload.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write `value` as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ReportError> {
    let io_err = |source| ReportError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    std::fs::write(path, to_json(value)?).map_err(io_err)
}

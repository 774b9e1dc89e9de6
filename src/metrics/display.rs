use super::{MetricsSnapshot, ReturnSummary};

/// Shown in place of an undefined metric.
pub const PLACEHOLDER: &str = "—";

/// Default ceiling for the cumulative-return tile.
pub const DEFAULT_CUMULATIVE_CAP: f64 = 400.0;

/// Formatted metric tiles. Presentation only: the cumulative cap applies to
/// the string shown here and never to the numbers in `MetricsSnapshot`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MetricsDisplay {
    pub cumulative_return: String,
    pub annualized_return: String,
    pub max_drawdown: String,
    pub sharpe_ratio: String,
    pub standard_deviation: String,
    pub alpha: String,
    pub beta: String,
}

impl MetricsDisplay {
    pub fn new(metrics: &MetricsSnapshot, cumulative_cap: f64) -> Self {
        Self {
            cumulative_return: percent(metrics.cumulative_return.map(|v| v.min(cumulative_cap))),
            annualized_return: percent(metrics.annualized_return),
            max_drawdown: percent(metrics.max_drawdown),
            sharpe_ratio: ratio(metrics.sharpe_ratio),
            standard_deviation: percent(metrics.standard_deviation),
            alpha: ratio(metrics.alpha),
            beta: ratio(metrics.beta),
        }
    }
}

fn percent(v: Option<f64>) -> String {
    match v {
        Some(v) if v.is_finite() => format!("{v:.1}%"),
        _ => PLACEHOLDER.to_string(),
    }
}

fn ratio(v: Option<f64>) -> String {
    match v {
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Start/end panel strings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SummaryDisplay {
    pub start_value: String,
    pub end_value: String,
    pub change: String,
}

impl SummaryDisplay {
    pub fn new(summary: &ReturnSummary) -> Self {
        let sign = if summary.is_positive { "+" } else { "" };
        Self {
            start_value: currency(summary.start_value),
            end_value: currency(summary.end_value),
            change: format!("{sign}{} ({sign}{:.1}%)", currency(summary.change), summary.change_percent),
        }
    }
}

/// "$1,234.50"
pub fn currency(amount: f64) -> String {
    if !amount.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{sign}${}.{:02}",
        crate::pricing::investment::group_thousands(cents / 100),
        cents % 100
    )
}

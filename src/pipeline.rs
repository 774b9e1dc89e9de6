use crate::metrics::display::{MetricsDisplay, SummaryDisplay};
use crate::metrics::{self, MetricsSnapshot, ReturnSummary};
use crate::series::synth::SeriesSynthesizer;
use crate::series::window::{window_pair, Period, WindowedPair};
use crate::series::TimePoint;
use crate::strategies::StrategyInfo;
use chrono::{DateTime, Utc};

/// Everything the performance chart and its metric tiles render.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DisplayData {
    pub strategy: &'static str,
    pub strategy_title: &'static str,
    pub period: Period,
    pub amount: f64,
    pub status: DisplayStatus,
    /// The requested window was empty and the full series is shown instead.
    pub fallback: bool,
    pub benchmark_series: Vec<TimePoint>,
    pub strategy_series: Vec<TimePoint>,
    pub metrics: MetricsSnapshot,
    pub display: MetricsDisplay,
    pub summary: Option<ReturnSummary>,
    pub summary_display: Option<SummaryDisplay>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    Ready,
    NoData,
}

/// Benchmark -> synthesize -> window -> metrics. Pure: every trigger
/// (fetch, period, strategy, amount) calls this from scratch.
pub fn compute_display(
    benchmark: &[TimePoint],
    period: Period,
    strategy: &'static StrategyInfo,
    amount: f64,
    now: DateTime<Utc>,
    cumulative_cap: f64,
) -> DisplayData {
    let synth = strategy.synthesizer();
    tracing::trace!(strategy = strategy.id, synthesizer = synth.name(), points = benchmark.len(), "synthesizing");
    let synthesized = synth.synthesize(benchmark);

    let mut fallback = false;
    let mut pair = window_pair(benchmark, &synthesized, period, now, amount);
    if pair.is_empty() && !benchmark.is_empty() {
        tracing::debug!(period = %period, "window empty, falling back to full series");
        pair = window_pair(benchmark, &synthesized, Period::FiveYears, now, amount);
        fallback = true;
    }

    let WindowedPair { benchmark: benchmark_series, strategy: strategy_series } = pair;
    let metrics = metrics::compute_metrics(&strategy_series, &benchmark_series);
    let status = if strategy_series.is_empty() {
        DisplayStatus::NoData
    } else {
        DisplayStatus::Ready
    };

    let summary = metrics::summarize(&strategy_series, amount);

    DisplayData {
        strategy: strategy.id,
        strategy_title: strategy.full_title,
        period,
        amount,
        status,
        fallback,
        display: MetricsDisplay::new(&metrics, cumulative_cap),
        summary_display: summary.as_ref().map(SummaryDisplay::new),
        summary,
        benchmark_series,
        strategy_series,
        metrics,
    }
}

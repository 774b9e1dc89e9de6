pub mod display;

use crate::series::TimePoint;
use statrs::statistics::Statistics;

/// Weekly bars: 52 periodic returns per year.
pub const PERIODS_PER_YEAR: f64 = 52.0;

/// Below this a standard deviation is treated as zero.
const MIN_STD: f64 = 1e-12;

/// Performance statistics over one windowed (strategy, benchmark) pair.
/// Percent-valued except `sharpe_ratio` and `beta`. `None` means undefined
/// and is rendered as a placeholder; NaN/inf never leave this module.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub cumulative_return: Option<f64>,
    pub annualized_return: Option<f64>,
    pub standard_deviation: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub beta: Option<f64>,
    /// Annualized Jensen alpha vs the benchmark, in percent.
    pub alpha: Option<f64>,
}

/// Start/end panel: what the entered amount grew into over the window.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ReturnSummary {
    pub start_value: f64,
    pub end_value: f64,
    pub change: f64,
    pub change_percent: f64,
    pub is_positive: bool,
}

#[inline]
fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}

/// r[i] = (v[i] - v[i-1]) / v[i-1], for i = 1..n-1.
pub fn periodic_returns(series: &[TimePoint]) -> Vec<f64> {
    series
        .windows(2)
        .map(|w| (w[1].value - w[0].value) / w[0].value)
        .collect()
}

/// Most negative decline from the running peak, in percent. Always <= 0.
pub fn max_drawdown(series: &[TimePoint]) -> Option<f64> {
    let first = series.first()?;
    if series.iter().any(|p| !(p.value.is_finite() && p.value > 0.0)) {
        return None;
    }

    let mut peak = first.value;
    let mut worst: f64 = 0.0;
    for p in series {
        if p.value > peak {
            peak = p.value;
        }
        let dd = (p.value - peak) / peak * 100.0;
        if dd < worst {
            worst = dd;
        }
    }
    Some(worst)
}

/// Compute the full snapshot. Pure function, recomputed from scratch on
/// every call; both series must share timestamps index-for-index.
pub fn compute_metrics(strategy: &[TimePoint], benchmark: &[TimePoint]) -> MetricsSnapshot {
    let n = strategy.len();
    if n < 2 {
        return MetricsSnapshot::default();
    }

    let first = strategy[0].value;
    let last = strategy[n - 1].value;
    let cumulative_return = if first > 0.0 {
        finite((last / first - 1.0) * 100.0)
    } else {
        None
    };

    let years = (n - 1) as f64 / PERIODS_PER_YEAR;
    let annualized_return = cumulative_return.and_then(|c| {
        if years <= 0.0 {
            return None;
        }
        finite(((1.0 + c / 100.0).powf(1.0 / years) - 1.0) * 100.0)
    });

    let s_ret = periodic_returns(strategy);
    let s_ok = s_ret.iter().all(|r| r.is_finite());
    let s_mean = if s_ok { finite(s_ret.iter().mean()) } else { None };
    let s_std = if s_ok { finite(s_ret.iter().population_std_dev()) } else { None };

    let sharpe_ratio = match (s_mean, s_std) {
        (Some(mean), Some(std)) if std >= MIN_STD => finite(mean * PERIODS_PER_YEAR / std),
        _ => None,
    };

    let (beta, alpha) = match s_mean {
        Some(s_mean) => beta_alpha(&s_ret, s_mean, strategy, benchmark),
        None => (None, None),
    };

    MetricsSnapshot {
        cumulative_return,
        annualized_return,
        standard_deviation: s_std.map(|s| s * 100.0),
        max_drawdown: max_drawdown(strategy),
        sharpe_ratio,
        beta,
        alpha,
    }
}

/// beta = cov(s, b) / var(b); alpha = (mean_s - beta * mean_b) * 52 * 100.
fn beta_alpha(
    s_ret: &[f64],
    s_mean: f64,
    strategy: &[TimePoint],
    benchmark: &[TimePoint],
) -> (Option<f64>, Option<f64>) {
    let aligned = strategy.len() == benchmark.len()
        && strategy.iter().zip(benchmark).all(|(s, b)| s.time == b.time);
    if !aligned {
        tracing::debug!(
            strategy_len = strategy.len(),
            benchmark_len = benchmark.len(),
            "series not aligned, beta undefined"
        );
        return (None, None);
    }

    let b_ret = periodic_returns(benchmark);
    if !b_ret.iter().all(|r| r.is_finite()) {
        return (None, None);
    }

    let b_var = b_ret.iter().population_variance();
    if !b_var.is_finite() || b_var < MIN_STD * MIN_STD {
        return (None, None);
    }

    let cov = s_ret.iter().population_covariance(b_ret.iter());
    let beta = finite(cov / b_var);
    let alpha = beta.and_then(|beta| {
        let b_mean = b_ret.iter().mean();
        finite((s_mean - beta * b_mean) * PERIODS_PER_YEAR * 100.0)
    });
    (beta, alpha)
}

/// Growth of `amount` over the window: starts at `amount` and follows the
/// series' own last/first ratio. `None` for an empty window.
pub fn summarize(series: &[TimePoint], amount: f64) -> Option<ReturnSummary> {
    let first = series.first()?.value;
    let last = series.last()?.value;
    let growth = if first > 0.0 { finite(last / first).unwrap_or(1.0) } else { 1.0 };
    let end = amount * growth;
    let change = end - amount;
    let change_percent = (growth - 1.0) * 100.0;
    Some(ReturnSummary {
        start_value: amount,
        end_value: end,
        change,
        change_percent,
        is_positive: change >= 0.0,
    })
}

use super::{round_cents, Series, TimePoint};
use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};

/// Display look-back window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Period {
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "YTD")]
    YearToDate,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "3Y")]
    ThreeYears,
    #[serde(rename = "5Y")]
    #[default]
    FiveYears,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::OneMonth,
        Period::SixMonths,
        Period::YearToDate,
        Period::OneYear,
        Period::ThreeYears,
        Period::FiveYears,
    ];

    /// Case-insensitive; accepts the labels shown on the period tabs.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|p| p.label().eq_ignore_ascii_case(s))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OneMonth => "1M",
            Self::SixMonths => "6M",
            Self::YearToDate => "YTD",
            Self::OneYear => "1Y",
            Self::ThreeYears => "3Y",
            Self::FiveYears => "5Y",
        }
    }

    fn months_back(&self) -> Option<u32> {
        match self {
            Self::OneMonth => Some(1),
            Self::SixMonths => Some(6),
            Self::OneYear => Some(12),
            Self::ThreeYears => Some(36),
            Self::YearToDate | Self::FiveYears => None,
        }
    }

    /// First calendar day inside the window, or `None` for "whole series".
    /// Month subtraction clamps to the end of shorter months (Mar 31 - 1M = Feb 28/29).
    pub fn start_date(&self, now: DateTime<Utc>) -> Option<NaiveDate> {
        let today = now.date_naive();
        match self {
            Self::YearToDate => NaiveDate::from_ymd_opt(today.year(), 1, 1),
            Self::FiveYears => None,
            _ => today.checked_sub_months(Months::new(self.months_back()?)),
        }
    }

    /// `start_date` at midnight UTC, in unix seconds.
    pub fn start_timestamp(&self, now: DateTime<Utc>) -> Option<i64> {
        self.start_date(now)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp())
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Benchmark and strategy windows rescaled with one shared factor.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct WindowedPair {
    pub benchmark: Series,
    pub strategy: Series,
}

impl WindowedPair {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.benchmark.is_empty()
    }
}

/// Points with `time >= start` of the period. Relies on ascending order.
fn select(series: &[TimePoint], start: Option<i64>) -> &[TimePoint] {
    match start {
        None => series,
        Some(start) => {
            let idx = series.partition_point(|p| p.time < start);
            &series[idx..]
        }
    }
}

fn rescale(points: &[TimePoint], factor: f64) -> Series {
    points
        .iter()
        .map(|p| TimePoint::new(p.time, round_cents(p.value * factor)))
        .collect()
}

/// factor = target / first value; `None` when that would not be finite.
fn start_factor(first: &TimePoint, target: f64) -> Option<f64> {
    let factor = target / first.value;
    (factor.is_finite() && factor > 0.0).then_some(factor)
}

/// Slice one series to `period` and rescale it so its first point equals
/// `target`. An empty selection yields an empty series; callers decide the
/// fallback.
pub fn window(series: &[TimePoint], period: Period, now: DateTime<Utc>, target: f64) -> Series {
    let selected = select(series, period.start_timestamp(now));
    let Some(factor) = selected.first().and_then(|first| start_factor(first, target)) else {
        return Vec::new();
    };
    rescale(selected, factor)
}

/// Slice both series to `period` and rescale both by the factor that maps the
/// benchmark's first selected point onto `target`, so their relative shapes
/// stay comparable.
pub fn window_pair(
    benchmark: &[TimePoint],
    strategy: &[TimePoint],
    period: Period,
    now: DateTime<Utc>,
    target: f64,
) -> WindowedPair {
    let start = period.start_timestamp(now);
    let Some(factor) = select(benchmark, start)
        .first()
        .and_then(|first| start_factor(first, target))
    else {
        return WindowedPair::default();
    };

    WindowedPair {
        benchmark: window(benchmark, period, now, target),
        strategy: rescale(select(strategy, start), factor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::fixtures::{five_years, weekly};
    use crate::series::synth::{ScaleSynthesizer, SeriesSynthesizer};
    use chrono::TimeZone;

    fn end_of_2024() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 31, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(Period::parse("1y"), Some(Period::OneYear));
        assert_eq!(Period::parse(" YTD "), Some(Period::YearToDate));
        assert_eq!(Period::parse("10Y"), None);
    }

    #[test]
    fn test_start_dates() {
        let now = end_of_2024();
        assert_eq!(Period::OneMonth.start_date(now), NaiveDate::from_ymd_opt(2024, 11, 30));
        assert_eq!(Period::OneYear.start_date(now), NaiveDate::from_ymd_opt(2023, 12, 31));
        assert_eq!(Period::YearToDate.start_date(now), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(Period::ThreeYears.start_date(now), NaiveDate::from_ymd_opt(2021, 12, 31));
        assert_eq!(Period::FiveYears.start_date(now), None);
    }

    #[test]
    fn test_month_subtraction_clamps() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();
        assert_eq!(Period::OneMonth.start_date(now), NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn test_one_year_window_starts_at_target() {
        let series = five_years();
        let out = window(&series, Period::OneYear, end_of_2024(), 1000.0);
        assert!(out.len() == 52 || out.len() == 53, "len={}", out.len());
        assert!((out[0].value - 1000.0).abs() <= 0.01);
        assert_eq!(out.last().map(|p| p.time), series.last().map(|p| p.time));
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let series = weekly(start, 3, |i| 100.0 + i as f64);
        let out = window(&series, Period::OneYear, end_of_2024(), 50.0);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].time, series[0].time);
    }

    #[test]
    fn test_full_period_keeps_every_point() {
        let series = five_years();
        let out = window(&series, Period::FiveYears, end_of_2024(), 1000.0);
        assert_eq!(out.len(), series.len());
        assert_eq!(out[0].value, 1000.0);
    }

    #[test]
    fn test_empty_selection_is_empty() {
        let series = five_years();
        let far_future = Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap();
        assert!(window(&series, Period::OneMonth, far_future, 1000.0).is_empty());
        assert!(window(&[], Period::FiveYears, end_of_2024(), 1000.0).is_empty());
    }

    #[test]
    fn test_period_lengths_are_monotonic() {
        let series = five_years();
        let now = end_of_2024();
        let ordered = [
            Period::OneMonth,
            Period::SixMonths,
            Period::OneYear,
            Period::ThreeYears,
            Period::FiveYears,
        ];
        let lens: Vec<usize> = ordered
            .iter()
            .map(|p| window(&series, *p, now, 1000.0).len())
            .collect();
        assert!(lens.windows(2).all(|w| w[0] <= w[1]), "lens={lens:?}");
    }

    #[test]
    fn test_pair_shares_benchmark_factor() {
        let bench = five_years();
        let strat = ScaleSynthesizer::new(1.2).synthesize(&bench);
        let pair = window_pair(&bench, &strat, Period::OneYear, end_of_2024(), 1000.0);

        assert_eq!(pair.benchmark.len(), pair.strategy.len());
        assert_eq!(pair.benchmark[0].value, 1000.0);
        assert!((pair.strategy[0].value - 1200.0).abs() <= 0.01);
        for (b, s) in pair.benchmark.iter().zip(pair.strategy.iter()) {
            assert_eq!(b.time, s.time);
        }
    }

    #[test]
    fn test_inputs_untouched() {
        let bench = five_years();
        let copy = bench.clone();
        let _ = window(&bench, Period::SixMonths, end_of_2024(), 5000.0);
        assert_eq!(bench, copy);
    }
}

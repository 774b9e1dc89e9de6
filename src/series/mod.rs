pub mod synth;
pub mod window;

/// One weekly observation: unix seconds and a positive currency amount.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimePoint {
    pub time: i64,
    pub value: f64,
}

impl TimePoint {
    #[inline]
    pub fn new(time: i64, value: f64) -> Self {
        Self { time, value }
    }
}

/// Ascending by `time`, no duplicate timestamps. Transforms always build a new one.
pub type Series = Vec<TimePoint>;

/// Round a currency amount to cents.
#[inline]
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Restore the series invariants on untrusted input: drop non-positive or
/// non-finite values, sort ascending, keep the first point per timestamp.
pub fn normalize(mut points: Series) -> Series {
    let before = points.len();
    points.retain(|p| p.value.is_finite() && p.value > 0.0);
    if points.len() != before {
        tracing::warn!(dropped = before - points.len(), "dropped invalid points");
    }
    points.sort_by_key(|p| p.time);
    points.dedup_by_key(|p| p.time);
    points
}

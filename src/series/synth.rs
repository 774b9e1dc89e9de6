use super::{Series, TimePoint};

/// Derives a strategy series from the benchmark series.
/// Implementations must be pure: same input, bit-identical output, and the
/// output keeps the input's length and timestamps.
pub trait SeriesSynthesizer: Send + Sync {
    fn name(&self) -> &'static str;

    fn synthesize(&self, benchmark: &[TimePoint]) -> Series;
}

/// Multiplies every benchmark value by a constant.
///
/// strategy[i] = benchmark[i] * multiplier
///
/// Periodic returns are therefore identical to the benchmark's; only the
/// level differs. Values are left unrounded so return statistics are exact.
#[derive(Debug, Clone, Copy)]
pub struct ScaleSynthesizer {
    multiplier: f64,
}

impl ScaleSynthesizer {
    pub fn new(multiplier: f64) -> Self {
        Self { multiplier }
    }
}

impl SeriesSynthesizer for ScaleSynthesizer {
    #[inline]
    fn name(&self) -> &'static str {
        "fixed-multiplier"
    }

    fn synthesize(&self, benchmark: &[TimePoint]) -> Series {
        benchmark
            .iter()
            .map(|p| TimePoint::new(p.time, p.value * self.multiplier))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bench() -> Series {
        vec![
            TimePoint::new(1_577_836_800, 321.86),
            TimePoint::new(1_578_441_600, 325.71),
            TimePoint::new(1_579_046_400, 331.95),
        ]
    }

    #[test]
    fn test_deterministic() {
        let s = ScaleSynthesizer::new(1.2);
        let a = s.synthesize(&bench());
        let b = s.synthesize(&bench());
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.time, y.time);
            assert_eq!(x.value.to_bits(), y.value.to_bits());
        }
    }

    #[test]
    fn test_keeps_timestamps_and_scales() {
        let s = ScaleSynthesizer::new(1.2);
        let out = s.synthesize(&bench());
        for (o, b) in out.iter().zip(bench().iter()) {
            assert_eq!(o.time, b.time);
            assert!((o.value - b.value * 1.2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_in_empty_out() {
        let s = ScaleSynthesizer::new(1.2);
        assert!(s.synthesize(&[]).is_empty());
    }
}

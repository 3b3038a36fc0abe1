use rand::Rng;
use std::ops::RangeInclusive;

/// Source of every random choice an action makes (gas limits, percentages,
/// validator pick, repeat interval).
pub trait Jitter: Send + Sync {
    /// Uniform integer in `range`.
    fn range_u64(&self, range: RangeInclusive<u64>) -> u64;

    /// Uniform float in `[low, high)`.
    fn range_f64(&self, low: f64, high: f64) -> f64;

    /// Index into a slice of `len` items. `len` must be non-zero.
    fn pick(&self, len: usize) -> usize;
}

/// Thread-local `rand` generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadJitter;

impl Jitter for ThreadJitter {
    fn range_u64(&self, range: RangeInclusive<u64>) -> u64 {
        rand::thread_rng().gen_range(range)
    }

    fn range_f64(&self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        rand::thread_rng().gen_range(low..high)
    }

    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len.max(1))
    }
}

/// Deterministic jitter: always the lower bound, or a fixed index.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedJitter {
    pub index: usize,
}

impl FixedJitter {
    pub fn with_index(index: usize) -> Self {
        Self { index }
    }
}

impl Jitter for FixedJitter {
    fn range_u64(&self, range: RangeInclusive<u64>) -> u64 {
        *range.start()
    }

    fn range_f64(&self, low: f64, _high: f64) -> f64 {
        low
    }

    fn pick(&self, len: usize) -> usize {
        self.index.min(len.saturating_sub(1))
    }
}

/// Round to two decimals, as used for percentages and BERA amounts.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_jitter_stays_in_range() {
        let j = ThreadJitter;
        for _ in 0..200 {
            let v = j.range_u64(150_000..=250_000);
            assert!((150_000..=250_000).contains(&v));
            let f = j.range_f64(40.0, 45.0);
            assert!((40.0..45.0).contains(&f));
            assert!(j.pick(6) < 6);
        }
    }

    #[test]
    fn test_fixed_jitter() {
        let j = FixedJitter::with_index(9);
        assert_eq!(j.range_u64(100_000..=180_000), 100_000);
        assert_eq!(j.range_f64(0.15, 0.30), 0.15);
        assert_eq!(j.pick(6), 5);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(42.3456), 42.35);
        assert_eq!(round2(0.004), 0.0);
    }
}

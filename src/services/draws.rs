//! Random draw service
//!
//! One seeded stream supplies every distribution used by the generators.
//! The service is an explicit value passed by `&mut` into each generation
//! call, never a global, so concurrent runs and tests stay independent.
//!
//! The order in which draws are taken is part of the output contract:
//! reordering two calls changes every record after them, even under the
//! same seed.

use crate::error::{GenError, GenResult};
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;
use serde::Deserialize;
use uuid::Uuid;

/// Golden-ratio multiplier used to spread sub-stream seeds
const STREAM_SPREAD: u64 = 0x9e37_79b9_7f4a_7c15;

/// Parameters of a bounded positive duration, all in minutes
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DurationSpec {
    pub mean: f64,
    pub spread: f64,
    pub min: i64,
    pub max: i64,
}

impl DurationSpec {
    pub const fn new(mean: f64, spread: f64, min: i64, max: i64) -> Self {
        Self { mean, spread, min, max }
    }

    /// Gaps may be zero; `min` must not be negative and must not exceed `max`
    pub fn validate(&self, name: &str) -> GenResult<()> {
        if !self.mean.is_finite() || !self.spread.is_finite() || self.spread < 0.0 {
            return Err(GenError::config(format!(
                "{}: mean/spread must be finite with spread >= 0",
                name
            )));
        }
        if self.min < 0 || self.min > self.max {
            return Err(GenError::config(format!(
                "{}: bounds [{}, {}] must satisfy 0 <= min <= max",
                name, self.min, self.max
            )));
        }
        Ok(())
    }

    /// Timed work stages must never resolve to zero minutes
    pub fn validate_positive(&self, name: &str) -> GenResult<()> {
        self.validate(name)?;
        if self.min < 1 {
            return Err(GenError::config(format!("{}: stage minimum must be >= 1 minute", name)));
        }
        Ok(())
    }
}

/// Seeded source of all randomness for one generation run
pub struct DrawService {
    rng: ChaCha8Rng,
    seed: u64,
    draws: u64,
}

impl DrawService {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), seed, draws: 0 }
    }

    /// Independent sub-stream for a parallel unit (e.g. one day).
    ///
    /// Seed derivation: `seed ^ (unit * 0x9e3779b97f4a7c15)`. Output from
    /// forked streams is deterministic per unit but does not reproduce the
    /// single-stream draw order.
    pub fn fork(&self, unit: u64) -> Self {
        Self::new(self.seed ^ unit.wrapping_mul(STREAM_SPREAD))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws consumed so far
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Uniform in [0, 1)
    pub fn uniform(&mut self) -> f64 {
        self.draws += 1;
        self.rng.gen::<f64>()
    }

    /// Uniform in [lo, hi)
    pub fn uniform_range(&mut self, lo: f64, hi: f64) -> f64 {
        self.draws += 1;
        if lo >= hi {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    /// Bernoulli trial: true with probability `p`
    pub fn chance(&mut self, p: f64) -> bool {
        self.uniform() < p
    }

    /// Integer in [lo, hi); returns `lo` for an empty range
    pub fn int_range(&mut self, lo: i64, hi: i64) -> i64 {
        self.draws += 1;
        if lo >= hi {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    /// Normal draw; a negative or non-finite spread is an error, never sampled
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> GenResult<f64> {
        if !mean.is_finite() || !std_dev.is_finite() || std_dev < 0.0 {
            return Err(GenError::Distribution(format!(
                "normal(mean={}, sd={}): mean and sd must be finite, sd >= 0",
                mean, std_dev
            )));
        }
        let dist = Normal::new(mean, std_dev).map_err(|e| {
            GenError::Distribution(format!("normal(mean={}, sd={}): {}", mean, std_dev, e))
        })?;
        self.draws += 1;
        Ok(dist.sample(&mut self.rng))
    }

    /// Index into `weights`, drawn proportionally
    pub fn weighted_index(&mut self, weights: &[f64]) -> GenResult<usize> {
        let dist = WeightedIndex::new(weights)
            .map_err(|e| GenError::Distribution(format!("weights {:?}: {}", weights, e)))?;
        self.draws += 1;
        Ok(dist.sample(&mut self.rng))
    }

    /// Uniformly chosen element, `None` for an empty slice
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.int_range(0, items.len() as i64) as usize;
        items.get(idx)
    }

    /// `amount` distinct indices out of `len`, in draw order
    pub fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        let amount = amount.min(len);
        self.draws += 1;
        rand::seq::index::sample(&mut self.rng, len, amount).into_vec()
    }

    /// Short opaque token: first 12 hex chars of a random (v4) UUID
    pub fn token(&mut self) -> String {
        let mut bytes = [0u8; 16];
        self.rng.fill_bytes(&mut bytes);
        self.draws += 1;
        let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
        let mut buf = Uuid::encode_buffer();
        uuid.simple().encode_lower(&mut buf)[..12].to_string()
    }

    /// Bounded positive duration in whole minutes.
    ///
    /// Samples N(mean, spread), reflects the negative tail, scales by
    /// `multiplier`, rounds, then clamps into `[min, max]`. This is the only
    /// place stage and gap durations are drawn.
    pub fn bounded_minutes(&mut self, spec: &DurationSpec, multiplier: f64) -> GenResult<i64> {
        let raw = self.normal(spec.mean, spec.spread)?.abs() * multiplier;
        let minutes = clamp_round(raw, spec.min, spec.max);
        if minutes < 0 || minutes < spec.min || minutes > spec.max {
            return Err(GenError::invariant(
                "duration draw",
                format!("{} outside [{}, {}]", minutes, spec.min, spec.max),
            ));
        }
        Ok(minutes)
    }

    /// Bounded positive count (shipment quantities); same clamp as durations
    pub fn bounded_units(&mut self, spec: &DurationSpec) -> GenResult<u32> {
        let units = self.bounded_minutes(spec, 1.0)?;
        u32::try_from(units).map_err(|_| GenError::invariant("unit draw", format!("{} overflows", units)))
    }

    /// Signed noise in whole minutes (or units), truncated toward zero and
    /// clamped to `[-bound, bound]`
    pub fn bounded_jitter(&mut self, mean: f64, spread: f64, bound: i64) -> GenResult<i64> {
        let raw = self.normal(mean, spread)?;
        let bound = bound.abs() as f64;
        Ok(raw.clamp(-bound, bound).trunc() as i64)
    }
}

/// Round to nearest and clamp into `[lo, hi]`. Non-finite input lands on `lo`.
#[inline]
pub fn clamp_round(x: f64, lo: i64, hi: i64) -> i64 {
    if !x.is_finite() {
        return lo;
    }
    (x.round() as i64).clamp(lo, hi.max(lo))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = DrawService::new(42);
        let mut b = DrawService::new(42);
        for _ in 0..100 {
            assert_eq!(a.uniform().to_bits(), b.uniform().to_bits());
        }
        assert_eq!(a.token(), b.token());
        assert_eq!(a.draws(), b.draws());
    }

    #[test]
    fn test_different_seed_different_stream() {
        let mut a = DrawService::new(1);
        let mut b = DrawService::new(2);
        let xs: Vec<u64> = (0..8).map(|_| a.uniform().to_bits()).collect();
        let ys: Vec<u64> = (0..8).map(|_| b.uniform().to_bits()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_fork_is_deterministic_and_distinct() {
        let root = DrawService::new(7);
        let mut day1 = root.fork(1);
        let mut day1_again = root.fork(1);
        let mut day2 = root.fork(2);
        let a = day1.uniform();
        assert_eq!(a.to_bits(), day1_again.uniform().to_bits());
        assert_ne!(a.to_bits(), day2.uniform().to_bits());
    }

    #[test]
    fn test_bounded_minutes_respects_bounds() {
        let mut draws = DrawService::new(3);
        let spec = DurationSpec::new(45.0, 200.0, 10, 240);
        for _ in 0..5_000 {
            let m = draws.bounded_minutes(&spec, 1.7).unwrap();
            assert!((10..=240).contains(&m), "{} out of bounds", m);
        }
    }

    #[test]
    fn test_bounded_minutes_zero_width_window() {
        let mut draws = DrawService::new(3);
        let spec = DurationSpec::new(500.0, 100.0, 60, 60);
        assert_eq!(draws.bounded_minutes(&spec, 1.0).unwrap(), 60);
    }

    #[test]
    fn test_bounded_minutes_reflects_negative_tail() {
        // Mean far below zero: the reflected draw is large and positive
        let mut draws = DrawService::new(9);
        let spec = DurationSpec::new(-1000.0, 1.0, 0, 5000);
        let m = draws.bounded_minutes(&spec, 1.0).unwrap();
        assert!(m > 900);
    }

    #[test]
    fn test_bounded_jitter_is_symmetric_bound() {
        let mut draws = DrawService::new(11);
        for _ in 0..2_000 {
            let j = draws.bounded_jitter(0.0, 500.0, 90).unwrap();
            assert!((-90..=90).contains(&j));
        }
    }

    #[test]
    fn test_duration_spec_validation() {
        assert!(DurationSpec::new(20.0, 15.0, 0, 120).validate("handoff").is_ok());
        assert!(DurationSpec::new(20.0, 15.0, 0, 120).validate_positive("pick").is_err());
        assert!(DurationSpec::new(20.0, 15.0, -5, 120).validate("gap").is_err());
        assert!(DurationSpec::new(20.0, 15.0, 50, 10).validate("gap").is_err());
        assert!(DurationSpec::new(20.0, -1.0, 0, 10).validate("gap").is_err());
        assert!(DurationSpec::new(f64::NAN, 1.0, 0, 10).validate("gap").is_err());
    }

    #[test]
    fn test_normal_rejects_bad_sd() {
        let mut draws = DrawService::new(1);
        assert!(matches!(draws.normal(0.0, -1.0), Err(GenError::Distribution(_))));
        assert!(matches!(draws.normal(f64::NAN, 1.0), Err(GenError::Distribution(_))));
        assert!(matches!(draws.normal(0.0, f64::INFINITY), Err(GenError::Distribution(_))));
        // Rejected draws do not advance the stream
        assert_eq!(draws.draws(), 0);
        assert!(draws.normal(5.0, 0.0).is_ok());
        assert_eq!(draws.draws(), 1);
    }

    #[test]
    fn test_weighted_index_distribution() {
        let mut draws = DrawService::new(5);
        let mut counts = [0usize; 2];
        for _ in 0..10_000 {
            counts[draws.weighted_index(&[0.38, 0.62]).unwrap()] += 1;
        }
        let frac = counts[0] as f64 / 10_000.0;
        assert!((frac - 0.38).abs() < 0.03, "F2W fraction {}", frac);
    }

    #[test]
    fn test_sample_indices_distinct() {
        let mut draws = DrawService::new(5);
        let mut idx = draws.sample_indices(27, 5);
        assert_eq!(idx.len(), 5);
        idx.sort_unstable();
        idx.dedup();
        assert_eq!(idx.len(), 5);
        assert_eq!(draws.sample_indices(3, 10).len(), 3);
    }

    #[test]
    fn test_token_shape() {
        let mut draws = DrawService::new(5);
        let token = draws.token();
        assert_eq!(token.len(), 12);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_pick_empty() {
        let mut draws = DrawService::new(5);
        let empty: [u8; 0] = [];
        assert!(draws.pick(&empty).is_none());
        assert_eq!(draws.pick(&[7]), Some(&7));
    }

    #[test]
    fn test_clamp_round() {
        assert_eq!(clamp_round(12.5, 0, 100), 13);
        assert_eq!(clamp_round(-3.0, 0, 100), 0);
        assert_eq!(clamp_round(1e9, 0, 100), 100);
        assert_eq!(clamp_round(f64::NAN, 5, 100), 5);
    }
}

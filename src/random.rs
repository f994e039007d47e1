//! Uniform random sources.
//!
//! Stochastic algorithms take a [`RandomSource`] rather than a concrete
//! generator. [`fastrand::Rng`] implements it directly; [`SequenceRandom`]
//! replays fixed values for reproducible runs.

/// A source of uniform floats in `[0, 1)`.
pub trait RandomSource {
    /// Draw the next value.
    fn next_f64(&mut self) -> f64;
}

impl RandomSource for fastrand::Rng {
    #[inline]
    fn next_f64(&mut self) -> f64 {
        self.f64()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    #[inline]
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// Replays a fixed sequence of values, cycling when it runs out.
///
/// ```
/// use tessera::random::{RandomSource, SequenceRandom};
///
/// let mut rng = SequenceRandom::new(vec![0.25, 0.75]);
/// assert_eq!(rng.next_f64(), 0.25);
/// assert_eq!(rng.next_f64(), 0.75);
/// assert_eq!(rng.next_f64(), 0.25);
/// assert_eq!(rng.draws(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    position: usize,
    draws: usize,
}

impl SequenceRandom {
    /// Cycle through `values`. An empty sequence always yields 0.
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            position: 0,
            draws: 0,
        }
    }

    /// Yield the same value forever.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&mut self) -> f64 {
        self.draws += 1;
        let Some(&value) = self.values.get(self.position) else {
            return 0.0;
        };
        self.position = (self.position + 1) % self.values.len();
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fastrand_in_unit_interval() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..1000 {
            let r = rng.next_f64();
            assert!((0.0..1.0).contains(&r));
        }
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let mut a = fastrand::Rng::with_seed(42);
        let mut b = fastrand::Rng::with_seed(42);
        for _ in 0..10 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
    }

    #[test]
    fn test_empty_sequence() {
        let mut rng = SequenceRandom::new(Vec::new());
        assert_eq!(rng.next_f64(), 0.0);
        assert_eq!(rng.draws(), 1);
    }

    #[test]
    fn test_through_mutable_reference() {
        fn draw(mut source: impl RandomSource) -> f64 {
            source.next_f64()
        }

        let mut rng = SequenceRandom::constant(0.5);
        assert_eq!(draw(&mut rng), 0.5);
        assert_eq!(draw(&mut rng), 0.5);
        assert_eq!(rng.draws(), 2);
    }
}

pub const LCG_MULTIPLIER: u32 = 1_664_525;
pub const LCG_INCREMENT: u32 = 1_013_904_223;
const LCG_MODULUS: f64 = 4_294_967_296.0;

/// Source of uniform floats in `[0, 1)`.
///
/// Seeded puzzles use [`SeededRng`]; free placement in the editors can use
/// any platform randomness that implements this.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;

    /// Uniform integer in `[min, max]`, inclusive on both ends.
    fn next_int(&mut self, min: i64, max: i64) -> i64 {
        let span = (max - min + 1) as f64;
        (self.next_unit() * span).floor() as i64 + min
    }

    /// Uniform index in `[0, len)`. `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize {
        let idx = (self.next_unit() * len as f64).floor() as usize;
        idx.min(len.saturating_sub(1))
    }

    /// Fisher-Yates shuffle, walking from the back.
    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..items.len()).rev() {
            let j = (self.next_unit() * (i + 1) as f64).floor() as usize;
            items.swap(i, j.min(i));
        }
    }
}

/// Linear congruential generator modulo 2^32.
///
/// Two generators built from the same seed and driven with the same calls
/// produce identical sequences, which is what makes shared seeds work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn next(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state as f64 / LCG_MODULUS
    }
}

impl RandomSource for SeededRng {
    fn next_unit(&mut self) -> f64 {
        self.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_matches_lcg_formula() {
        let mut rng = SeededRng::new(42);
        let expected = (42u64 * 1_664_525 + 1_013_904_223) % (1u64 << 32);
        let value = rng.next();
        assert_eq!(rng.state() as u64, expected);
        assert_eq!(value, expected as f64 / 4_294_967_296.0);
    }

    #[test]
    fn outputs_stay_in_unit_interval() {
        let mut rng = SeededRng::new(u32::MAX);
        for _ in 0..10_000 {
            let value = rng.next();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn next_int_is_inclusive() {
        let mut rng = SeededRng::new(7);
        let mut seen = [false; 4];
        for _ in 0..1_000 {
            let value = rng.next_int(3, 6);
            assert!((3..=6).contains(&value));
            seen[(value - 3) as usize] = true;
        }
        assert!(seen.iter().all(|hit| *hit));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = SeededRng::new(99);
        let mut items: Vec<u32> = (0..32).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..32).collect::<Vec<_>>());
    }
}

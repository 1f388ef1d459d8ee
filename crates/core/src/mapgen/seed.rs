//! Deterministic random stream and per-attempt seed derivation for level generation.

const LCG_MULTIPLIER: u32 = 1_664_525;
const LCG_INCREMENT: u32 = 1_013_904_223;
const LCG_MODULUS: f64 = 4_294_967_296.0;

/// Linear-congruential stream owned by one generation attempt.
///
/// Every random pick in an attempt draws from a single stream, so the order of
/// calls is part of the output contract.
#[derive(Clone, Debug)]
pub struct LevelRng {
    state: u32,
}

impl LevelRng {
    /// Seeds from the low 32 bits of `seed`.
    pub fn new(seed: u64) -> Self {
        Self { state: seed as u32 }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_INCREMENT);
        f64::from(self.state) / LCG_MODULUS
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Uniform integer in `min_value..=max_value`.
    pub fn range(&mut self, min_value: usize, max_value: usize) -> usize {
        debug_assert!(min_value <= max_value);
        let span = (max_value - min_value + 1) as f64;
        min_value + (self.next_f64() * span) as usize
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.range(0, items.len() - 1);
        items.get(index)
    }

    /// Fisher-Yates, walking from the last element down.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for index in (1..items.len()).rev() {
            let other = self.range(0, index);
            items.swap(index, other);
        }
    }

    /// Sum of `count` rolls of a `sides`-sided die.
    pub fn roll_dice(&mut self, count: u32, sides: u32) -> u32 {
        (0..count).map(|_| self.range(1, sides as usize) as u32).sum()
    }
}

pub(super) fn attempt_seed(seed: u64, attempt: u32, stride: u64) -> u64 {
    seed.wrapping_add(u64::from(attempt).wrapping_mul(stride))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_matches_the_reference_recurrence() {
        let mut rng = LevelRng::new(42);
        assert_eq!(rng.next_f64(), 1_083_814_273.0 / LCG_MODULUS);
        assert_eq!(rng.next_f64(), 378_494_188.0 / LCG_MODULUS);
        assert_eq!(rng.next_f64(), 2_479_403_867.0 / LCG_MODULUS);
    }

    #[test]
    fn only_the_low_32_bits_of_the_seed_matter() {
        let mut low = LevelRng::new(7);
        let mut high = LevelRng::new((1 << 32) + 7);
        for _ in 0..16 {
            assert_eq!(low.next_f64(), high.next_f64());
        }
    }

    #[test]
    fn range_stays_inside_requested_bounds() {
        let mut rng = LevelRng::new(12_345);
        for _ in 0..500 {
            let value = rng.range(7, 13);
            assert!((7..=13).contains(&value));
        }
        assert_eq!(rng.range(4, 4), 4);
    }

    #[test]
    fn shuffle_is_a_seeded_permutation() {
        let mut a: Vec<u32> = (0..20).collect();
        let mut b = a.clone();
        LevelRng::new(99).shuffle(&mut a);
        LevelRng::new(99).shuffle(&mut b);
        assert_eq!(a, b);

        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn dice_totals_respect_their_bounds() {
        let mut rng = LevelRng::new(3);
        for _ in 0..200 {
            assert!((3..=60).contains(&rng.roll_dice(3, 20)));
        }
        assert_eq!(rng.pick::<u8>(&[]), None);
    }

    #[test]
    fn attempt_seeds_step_by_the_stride_and_wrap() {
        assert_eq!(attempt_seed(42, 0, 173), 42);
        assert_eq!(attempt_seed(42, 3, 173), 42 + 3 * 173);
        assert_eq!(attempt_seed(u64::MAX, 1, 173), 172);
    }
}

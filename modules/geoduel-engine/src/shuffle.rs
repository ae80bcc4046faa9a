use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fisher-Yates shuffler over an owned RNG.
pub struct Shuffler {
    rng: StdRng,
}

impl Shuffler {
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic sequence for tests and `--seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// For `i` from the last index down to 1, swap `i` with a uniform pick in `0..=i`.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.rng.random_range(0..=i);
            items.swap(i, j);
        }
    }
}

impl Default for Shuffler {
    fn default() -> Self {
        Self::from_os_rng()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_length_and_multiset() {
        let mut shuffler = Shuffler::seeded(7);
        let original: Vec<u32> = vec![5, 1, 1, 9, 3, 3, 3, 0, 42];
        let mut items = original.clone();

        for _ in 0..50 {
            shuffler.shuffle(&mut items);
            assert_eq!(items.len(), original.len());
            let mut a = items.clone();
            let mut b = original.clone();
            a.sort_unstable();
            b.sort_unstable();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn handles_empty_and_single() {
        let mut shuffler = Shuffler::seeded(1);
        let mut empty: Vec<u8> = Vec::new();
        shuffler.shuffle(&mut empty);
        assert!(empty.is_empty());

        let mut one = vec!["only"];
        shuffler.shuffle(&mut one);
        assert_eq!(one, vec!["only"]);
    }

    #[test]
    fn same_seed_same_order() {
        let mut a: Vec<u32> = (0..20).collect();
        let mut b = a.clone();
        Shuffler::seeded(99).shuffle(&mut a);
        Shuffler::seeded(99).shuffle(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn every_position_is_reachable() {
        // Each of the 3! orderings of a 3-element list should show up.
        let mut shuffler = Shuffler::seeded(2024);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            let mut items = [0u8, 1, 2];
            shuffler.shuffle(&mut items);
            seen.insert(items);
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn roughly_uniform_first_slot() {
        let mut shuffler = Shuffler::seeded(11);
        let mut counts = [0u32; 4];
        let trials = 8_000;
        for _ in 0..trials {
            let mut items = [0usize, 1, 2, 3];
            shuffler.shuffle(&mut items);
            counts[items[0]] += 1;
        }
        // Expected 2000 each; allow a wide band.
        for count in counts {
            assert!((1_700..=2_300).contains(&count), "skewed: {counts:?}");
        }
    }
}

use crate::types::{Entrant, MatchKey, Side};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Decides a single match by naming the winning slot.
pub trait MatchResolver {
    fn resolve(&mut self, key: MatchKey, slot_a: &Entrant, slot_b: &Entrant) -> Side;
}

impl<F> MatchResolver for F
where
    F: FnMut(MatchKey, &Entrant, &Entrant) -> Side,
{
    fn resolve(&mut self, key: MatchKey, slot_a: &Entrant, slot_b: &Entrant) -> Side {
        self(key, slot_a, slot_b)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SlotAWins;

impl MatchResolver for SlotAWins {
    fn resolve(&mut self, _key: MatchKey, _slot_a: &Entrant, _slot_b: &Entrant) -> Side {
        Side::A
    }
}

/// Lower registration seed wins; ties go to slot A.
#[derive(Debug, Default, Clone, Copy)]
pub struct LowerSeedWins;

impl MatchResolver for LowerSeedWins {
    fn resolve(&mut self, _key: MatchKey, slot_a: &Entrant, slot_b: &Entrant) -> Side {
        if slot_b.seed < slot_a.seed {
            Side::B
        } else {
            Side::A
        }
    }
}

/// Simulation placeholder: a coin flip tilted towards the lexicographically
/// earlier label. Not meant for anything but demos.
#[derive(Debug, Clone)]
pub struct LabelBiasedRandom {
    rng: ChaCha8Rng,
    bias: f64,
}

impl LabelBiasedRandom {
    pub const DEFAULT_BIAS: f64 = 0.05;

    pub fn new(seed: u64) -> Self {
        Self::with_bias(seed, Self::DEFAULT_BIAS)
    }

    /// `bias` is clamped to [0, 0.5]; the favored entrant wins with probability 0.5 + bias.
    pub fn with_bias(seed: u64, bias: f64) -> Self {
        let bias = if bias.is_finite() { bias.clamp(0.0, 0.5) } else { Self::DEFAULT_BIAS };
        LabelBiasedRandom {
            rng: ChaCha8Rng::seed_from_u64(seed),
            bias,
        }
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }
}

impl MatchResolver for LabelBiasedRandom {
    fn resolve(&mut self, _key: MatchKey, slot_a: &Entrant, slot_b: &Entrant) -> Side {
        let favored = if slot_b.label.to_lowercase() < slot_a.label.to_lowercase() {
            Side::B
        } else {
            Side::A
        };
        if self.rng.random_bool(0.5 + self.bias) {
            favored
        } else {
            favored.opposite()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Entrant, Entrant) {
        (Entrant::new(1, "Zephyr", 2), Entrant::new(2, "alpha", 1))
    }

    #[test]
    fn test_slot_a_wins() {
        let (a, b) = pair();
        assert_eq!(SlotAWins.resolve(MatchKey::winners(1, 1), &a, &b), Side::A);
    }

    #[test]
    fn test_lower_seed_wins() {
        let (a, b) = pair();
        assert_eq!(LowerSeedWins.resolve(MatchKey::winners(1, 1), &a, &b), Side::B);
    }

    #[test]
    fn test_closure_resolver() {
        let (a, b) = pair();
        let mut calls = 0;
        let mut resolver = |_key: MatchKey, _a: &Entrant, _b: &Entrant| {
            calls += 1;
            Side::B
        };
        assert_eq!(resolver.resolve(MatchKey::losers(1, 1), &a, &b), Side::B);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_biased_random_is_seeded() {
        let (a, b) = pair();
        let mut first = LabelBiasedRandom::new(99);
        let mut second = LabelBiasedRandom::new(99);
        for round in 1..=50 {
            let key = MatchKey::winners(1, round);
            assert_eq!(first.resolve(key, &a, &b), second.resolve(key, &a, &b));
        }
    }

    #[test]
    fn test_full_bias_always_favors_earlier_label() {
        let (a, b) = pair();
        let mut resolver = LabelBiasedRandom::with_bias(3, 10.0);
        assert_eq!(resolver.bias(), 0.5);
        for round in 1..=20 {
            assert_eq!(resolver.resolve(MatchKey::winners(1, round), &a, &b), Side::B);
        }
    }

    #[test]
    fn test_bias_leans_towards_favored() {
        let (a, b) = pair();
        let mut resolver = LabelBiasedRandom::with_bias(11, 0.3);
        let favored = (0..2000)
            .filter(|_| resolver.resolve(MatchKey::winners(1, 1), &a, &b) == Side::B)
            .count();
        assert!(favored > 1400, "favored won {favored} of 2000");
    }
}

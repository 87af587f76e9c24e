use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::compare::ComparisonMethod;
use crate::fraction::Fraction;
use crate::model::{Exercise, ExerciseId};

//
// ─── DIFFICULTY TIERS ──────────────────────────────────────────────────────────
//

/// Generation constraints for one difficulty band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyTier {
    pub min_denominator: u32,
    pub max_denominator: u32,
    /// Preferred minimum distance between the two decimal values.
    pub min_gap: f64,
}

pub const EASY_TIER: DifficultyTier = DifficultyTier {
    min_denominator: 2,
    max_denominator: 6,
    min_gap: 0.3,
};

pub const MEDIUM_TIER: DifficultyTier = DifficultyTier {
    min_denominator: 4,
    max_denominator: 10,
    min_gap: 0.2,
};

pub const HARD_TIER: DifficultyTier = DifficultyTier {
    min_denominator: 6,
    max_denominator: 12,
    min_gap: 0.1,
};

impl DifficultyTier {
    /// `≤ 2` is easy, exactly `3` is medium, everything else is hard.
    #[must_use]
    pub fn for_difficulty(difficulty: f64) -> Self {
        if difficulty <= 2.0 {
            EASY_TIER
        } else if (difficulty - 3.0).abs() < f64::EPSILON {
            MEDIUM_TIER
        } else {
            HARD_TIER
        }
    }
}

/// Two fractions to compare, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExercisePair {
    pub fraction1: Fraction,
    pub fraction2: Fraction,
}

impl ExercisePair {
    #[must_use]
    pub fn gap(&self) -> f64 {
        (self.fraction1.to_decimal() - self.fraction2.to_decimal()).abs()
    }
}

//
// ─── GENERATOR ─────────────────────────────────────────────────────────────────
//

const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Random exercise source.
///
/// Generic over the RNG so tests can drive it with a seeded `StdRng`.
#[derive(Debug, Clone)]
pub struct ExerciseGenerator<R = StdRng> {
    rng: R,
    max_attempts: u32,
}

impl ExerciseGenerator<StdRng> {
    /// Generator seeded from the operating system.
    #[must_use]
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// Reproducible generator for tests and replays.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ExerciseGenerator<R> {
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Cap on redraws while looking for a second fraction far enough away.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Proper fraction with a denominator in `[min, max]`, reduced to lowest terms.
    ///
    /// Denominators below 2 are raised to 2 so a proper numerator exists.
    pub fn random_fraction(&mut self, min_denominator: u32, max_denominator: u32) -> Fraction {
        let low = min_denominator.max(2);
        let high = max_denominator.max(low);
        let denominator = self.rng.random_range(low..=high);
        let numerator = self.rng.random_range(1..denominator);
        Fraction::from_terms(numerator, denominator).simplify()
    }

    /// Draw a pair for the given difficulty.
    ///
    /// The gap is a soft constraint: after `max_attempts` redraws the last
    /// candidate is kept even if it sits closer than the tier's gap.
    pub fn generate_pair(&mut self, difficulty: f64) -> ExercisePair {
        let tier = DifficultyTier::for_difficulty(difficulty);
        let first = self.random_fraction(tier.min_denominator, tier.max_denominator);
        let first_value = first.to_decimal();

        let mut second = self.random_fraction(tier.min_denominator, tier.max_denominator);
        let mut attempts = 1;
        while (first_value - second.to_decimal()).abs() < tier.min_gap
            && attempts < self.max_attempts
        {
            second = self.random_fraction(tier.min_denominator, tier.max_denominator);
            attempts += 1;
        }

        if self.rng.random_bool(0.5) {
            ExercisePair {
                fraction1: first,
                fraction2: second,
            }
        } else {
            ExercisePair {
                fraction1: second,
                fraction2: first,
            }
        }
    }

    /// Uniformly chosen comparison method.
    pub fn pick_method(&mut self) -> ComparisonMethod {
        let index = self.rng.random_range(0..ComparisonMethod::ALL.len());
        ComparisonMethod::ALL[index]
    }

    /// Full exercise with a fresh id and the dispatcher's answer.
    pub fn generate_exercise(&mut self, difficulty: f64, method: ComparisonMethod) -> Exercise {
        let pair = self.generate_pair(difficulty);
        let id = ExerciseId::random_with(&mut self.rng);
        Exercise::new(id, pair.fraction1, pair.fraction2, method, difficulty)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compare_fractions;

    #[test]
    fn tiers_follow_difficulty_bands() {
        assert_eq!(DifficultyTier::for_difficulty(1.0), EASY_TIER);
        assert_eq!(DifficultyTier::for_difficulty(2.0), EASY_TIER);
        assert_eq!(DifficultyTier::for_difficulty(3.0), MEDIUM_TIER);
        assert_eq!(DifficultyTier::for_difficulty(4.0), HARD_TIER);
        assert_eq!(DifficultyTier::for_difficulty(5.0), HARD_TIER);
        assert_eq!(DifficultyTier::for_difficulty(2.5), HARD_TIER);
    }

    #[test]
    fn fractions_are_proper_and_in_range() {
        let mut generator = ExerciseGenerator::seeded(11);
        for difficulty in [1.0, 3.0, 4.0] {
            let tier = DifficultyTier::for_difficulty(difficulty);
            for _ in 0..200 {
                let pair = generator.generate_pair(difficulty);
                for f in [pair.fraction1, pair.fraction2] {
                    assert!(f.is_proper(), "{f}");
                    assert!(f.is_simplified(), "{f}");
                    assert!(f.denominator() <= tier.max_denominator, "{f}");
                }
            }
        }
    }

    #[test]
    fn easy_pairs_mostly_respect_gap() {
        let mut generator = ExerciseGenerator::seeded(3);
        let within = (0..500)
            .filter(|_| generator.generate_pair(1.0).gap() >= EASY_TIER.min_gap)
            .count();
        assert!(within > 450, "only {within} pairs met the gap");
    }

    #[test]
    fn harder_tiers_produce_closer_pairs_on_average() {
        let mut generator = ExerciseGenerator::seeded(42);
        let trials = 2_000;
        let mean_gap = |generator: &mut ExerciseGenerator, difficulty: f64| {
            (0..trials).map(|_| generator.generate_pair(difficulty).gap()).sum::<f64>()
                / f64::from(trials)
        };
        let easy = mean_gap(&mut generator, 1.0);
        let hard = mean_gap(&mut generator, 5.0);
        assert!(hard <= easy, "hard {hard} > easy {easy}");
    }

    #[test]
    fn order_is_randomized() {
        let mut generator = ExerciseGenerator::seeded(5);
        let larger_first = (0..400)
            .filter(|_| {
                let pair = generator.generate_pair(1.0);
                pair.fraction1.to_decimal() > pair.fraction2.to_decimal()
            })
            .count();
        assert!((100..300).contains(&larger_first), "{larger_first}");
    }

    #[test]
    fn exercises_carry_dispatcher_answer() {
        let mut generator = ExerciseGenerator::seeded(9);
        for method in ComparisonMethod::ALL {
            let exercise = generator.generate_exercise(4.0, method);
            assert_eq!(
                exercise.correct_answer(),
                compare_fractions(exercise.fraction1(), exercise.fraction2(), Some(method))
            );
            assert_eq!(exercise.method(), method);
        }
    }

    #[test]
    fn same_seed_same_exercises() {
        let mut a = ExerciseGenerator::seeded(77);
        let mut b = ExerciseGenerator::seeded(77);
        for _ in 0..10 {
            let method = a.pick_method();
            assert_eq!(method, b.pick_method());
            assert_eq!(a.generate_exercise(2.0, method), b.generate_exercise(2.0, method));
        }
    }
}

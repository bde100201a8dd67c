#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seedable stimulus sequence generation for N-back rounds.
//!
//! Positions that have no lag-back predecessor receive a uniform draw from
//! the alphabet. Every later position is either a forced match, copying the
//! value `lag` positions back, or a uniform draw from the alphabet with that
//! value excluded, so non-match positions never match by accident.

use nback_core::{ConfigError, RoundConfig, Sequence};
use rand::{seq::index, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Strategy used to decide which eligible positions become forced matches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MatchPlacement {
    /// Each eligible position is forced independently with probability
    /// `match_percent / 100`.
    #[default]
    Independent,
    /// Exactly the rounded target count of eligible positions is forced,
    /// chosen uniformly without replacement.
    Exact,
}

/// Generated values together with the positions that were forced to match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedSequence {
    /// Stimulus values in presentation order.
    pub sequence: Sequence,
    /// `forced[i]` is true when position `i` was made to copy its lag-back value.
    pub forced: Vec<bool>,
}

impl GeneratedSequence {
    /// Number of forced match positions.
    #[must_use]
    pub fn forced_count(&self) -> usize {
        self.forced.iter().filter(|&&forced| forced).count()
    }
}

/// Produces stimulus sequences from an owned random stream.
#[derive(Clone, Debug)]
pub struct SequenceGenerator {
    rng: ChaCha8Rng,
    placement: MatchPlacement,
}

impl SequenceGenerator {
    /// Creates a generator whose output is fully determined by `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            placement: MatchPlacement::default(),
        }
    }

    /// Creates a generator seeded from operating system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
            placement: MatchPlacement::default(),
        }
    }

    /// Selects how forced matches are placed.
    #[must_use]
    pub fn with_placement(mut self, placement: MatchPlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Strategy currently used for match placement.
    #[must_use]
    pub const fn placement(&self) -> MatchPlacement {
        self.placement
    }

    /// Generates a sequence honoring the configured length, alphabet and lag.
    pub fn generate(&mut self, config: &RoundConfig) -> Result<Sequence, ConfigError> {
        self.generate_with_plan(config)
            .map(|generated| generated.sequence)
    }

    /// Generates a sequence and reports which positions were forced matches.
    pub fn generate_with_plan(
        &mut self,
        config: &RoundConfig,
    ) -> Result<GeneratedSequence, ConfigError> {
        config.validate()?;

        let forced = self.plan_matches(config);
        let mut values: Vec<u32> = Vec::with_capacity(config.length);
        for (position, &is_forced) in forced.iter().enumerate() {
            let value = match position.checked_sub(config.lag) {
                None => self.rng.gen_range(0..config.alphabet_size),
                Some(earlier) => {
                    let lag_back = values[earlier];
                    if is_forced {
                        lag_back
                    } else {
                        self.draw_excluding(config.alphabet_size, lag_back)
                    }
                }
            };
            values.push(value);
        }

        Ok(GeneratedSequence {
            sequence: Sequence::from_values(values),
            forced,
        })
    }

    fn plan_matches(&mut self, config: &RoundConfig) -> Vec<bool> {
        let mut forced = vec![false; config.length];
        match self.placement {
            MatchPlacement::Independent => {
                let probability = f64::from(config.match_percent) / 100.0;
                for slot in forced.iter_mut().skip(config.lag) {
                    *slot = self.rng.gen_bool(probability);
                }
            }
            MatchPlacement::Exact => {
                let eligible = config.eligible_positions();
                let amount = config.target_match_count().min(eligible);
                for offset in index::sample(&mut self.rng, eligible, amount).iter() {
                    forced[config.lag + offset] = true;
                }
            }
        }
        forced
    }

    /// Uniform draw from `[0, alphabet_size)` without `excluded`.
    fn draw_excluding(&mut self, alphabet_size: u32, excluded: u32) -> u32 {
        debug_assert!(alphabet_size >= 2, "exclusion requires two or more values");
        let draw = self.rng.gen_range(0..alphabet_size - 1);
        if draw >= excluded {
            draw + 1
        } else {
            draw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_excluding_never_returns_excluded_value() {
        let mut generator = SequenceGenerator::seeded(7);
        for excluded in 0..3 {
            for _ in 0..200 {
                let value = generator.draw_excluding(3, excluded);
                assert_ne!(value, excluded);
                assert!(value < 3);
            }
        }
    }

    #[test]
    fn draw_excluding_covers_remaining_values() {
        let mut generator = SequenceGenerator::seeded(11);
        let mut seen = [false; 4];
        for _ in 0..400 {
            seen[generator.draw_excluding(4, 2) as usize] = true;
        }
        assert_eq!(seen, [true, true, false, true]);
    }

    #[test]
    fn exact_placement_forces_rounded_target() {
        let config = RoundConfig::new(22, 9, 30, 2);
        let mut generator = SequenceGenerator::seeded(3).with_placement(MatchPlacement::Exact);
        let generated = generator.generate_with_plan(&config).expect("valid config");
        assert_eq!(generated.forced_count(), 6);
        assert!(generated.forced.iter().take(2).all(|forced| !forced));
    }

    #[test]
    fn full_match_percent_forces_every_eligible_position() {
        let config = RoundConfig::new(5, 3, 100, 2);
        let mut generator = SequenceGenerator::seeded(0x5eed);
        let generated = generator.generate_with_plan(&config).expect("valid config");
        assert_eq!(generated.forced, vec![false, false, true, true, true]);

        let values = generated.sequence.values();
        assert_eq!(values[2], values[0]);
        assert_eq!(values[3], values[1]);
        assert_eq!(values[4], values[2]);
    }

    #[test]
    fn zero_match_percent_produces_no_matches() {
        let config = RoundConfig::new(50, 2, 0, 1);
        let mut generator = SequenceGenerator::seeded(99);
        let sequence = generator.generate(&config).expect("valid config");
        assert_eq!(sequence.match_count(1), 0);
    }

    #[test]
    fn rejects_single_value_alphabet() {
        let mut generator = SequenceGenerator::seeded(1);
        let result = generator.generate(&RoundConfig::new(5, 1, 50, 2));
        assert_eq!(result, Err(ConfigError::AlphabetTooSmall { alphabet_size: 1 }));
    }

    #[test]
    fn rejects_lag_not_below_length() {
        let mut generator = SequenceGenerator::seeded(1);
        let result = generator.generate(&RoundConfig::new(3, 4, 50, 3));
        assert_eq!(result, Err(ConfigError::LagOutOfRange { lag: 3, length: 3 }));
    }
}

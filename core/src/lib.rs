#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the N-back engine.
//!
//! This crate defines the vocabulary that connects the sequence generator,
//! the authoritative round engine, and the adapters that present stimuli and
//! persist scores. Adapters describe a round with a [`RoundConfig`], the
//! generator turns it into an immutable [`Sequence`], and the engine reports
//! progress back through [`Stimulus`], [`MatchVerdict`] and [`RoundSummary`]
//! values. Contract violations surface as [`ConfigError`] or [`StateError`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest stimulus alphabet for which a non-match draw is always possible.
pub const MIN_ALPHABET_SIZE: u32 = 2;

/// Largest accepted match percentage.
pub const MAX_MATCH_PERCENT: u8 = 100;

/// Presentation channel used for stimuli. Has no bearing on scoring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Stimuli are shown as highlighted grid cells.
    #[default]
    Visual,
    /// Stimuli are spoken as letters.
    Audio,
}

/// Parameters describing a single round. Immutable once the round starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundConfig {
    /// Number of stimuli presented during the round.
    #[serde(rename = "roundLength", alias = "length")]
    pub length: usize,
    /// Number of distinct stimulus values.
    #[serde(rename = "combinations", alias = "alphabetSize")]
    pub alphabet_size: u32,
    /// Target share of eligible positions that repeat their lag-back value.
    #[serde(rename = "matchPercent")]
    pub match_percent: u8,
    /// Distance in positions between a stimulus and the one it is compared to.
    #[serde(rename = "n", alias = "lag")]
    pub lag: usize,
}

impl RoundConfig {
    /// Creates a new configuration without validating it.
    #[must_use]
    pub const fn new(length: usize, alphabet_size: u32, match_percent: u8, lag: usize) -> Self {
        Self {
            length,
            alphabet_size,
            match_percent,
            lag,
        }
    }

    /// Checks every parameter constraint, reporting the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lag == 0 || self.lag >= self.length {
            return Err(ConfigError::LagOutOfRange {
                lag: self.lag,
                length: self.length,
            });
        }
        if self.alphabet_size < MIN_ALPHABET_SIZE {
            return Err(ConfigError::AlphabetTooSmall {
                alphabet_size: self.alphabet_size,
            });
        }
        if self.match_percent > MAX_MATCH_PERCENT {
            return Err(ConfigError::MatchPercentOutOfRange {
                match_percent: self.match_percent,
            });
        }
        Ok(())
    }

    /// Number of positions that have a lag-back predecessor.
    #[must_use]
    pub const fn eligible_positions(&self) -> usize {
        self.length.saturating_sub(self.lag)
    }

    /// Expected number of matches among eligible positions, rounded to nearest.
    #[must_use]
    pub fn target_match_count(&self) -> usize {
        let eligible = self.eligible_positions();
        let percent = usize::from(self.match_percent.min(MAX_MATCH_PERCENT));
        (eligible * percent + 50) / 100
    }
}

/// Ordered stimulus values generated for one round.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Sequence {
    values: Vec<u32>,
}

impl Sequence {
    /// Wraps already generated values.
    #[must_use]
    pub fn from_values(values: Vec<u32>) -> Self {
        Self { values }
    }

    /// Number of stimuli in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Reports whether the sequence holds no stimuli.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value presented at `index`, if in range.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<u32> {
        self.values.get(index).copied()
    }

    /// All values in presentation order.
    #[must_use]
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Ground truth: whether position `index` repeats the value `lag` positions back.
    ///
    /// Positions without a lag-back predecessor, and positions outside the
    /// sequence, are never matches.
    #[must_use]
    pub fn is_match_at(&self, index: usize, lag: usize) -> bool {
        let Some(previous) = index.checked_sub(lag) else {
            return false;
        };
        match (self.value(index), self.value(previous)) {
            (Some(current), Some(earlier)) => current == earlier,
            _ => false,
        }
    }

    /// Counts matching positions at the provided lag.
    #[must_use]
    pub fn match_count(&self, lag: usize) -> usize {
        (0..self.len())
            .filter(|&index| self.is_match_at(index, lag))
            .count()
    }
}

/// Stimulus presented after a successful advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Stimulus {
    /// Zero-based position within the sequence.
    pub index: usize,
    /// Stimulus value in `[0, alphabet_size)`.
    pub value: u32,
    /// Whether this stimulus repeats the one `lag` positions back.
    pub is_match: bool,
}

/// Mutable progress of a round, owned by the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RoundState {
    /// Index of the stimulus on display, or `None` before the first advance.
    pub current_index: Option<usize>,
    /// Number of correct match submissions so far.
    pub correct_count: u32,
    /// Whether the round is still being presented.
    pub is_running: bool,
    /// Ground-truth match status of the stimulus on display.
    pub last_match_status: bool,
}

/// Result of a user's "match" action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MatchVerdict {
    /// Whether the current stimulus really was a match.
    pub correct: bool,
    /// Whether this submission raised the score. A repeated correct press at
    /// the same index is still correct but earns nothing.
    pub credited: bool,
}

/// Finalized outcome of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundSummary {
    /// Number of correct match submissions.
    pub final_score: u32,
    /// Whether the round beat the best score known when it finished.
    pub is_new_high_score: bool,
    /// Best score after this round was taken into account.
    pub best_score: u32,
}

/// Lifecycle phase of the round engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RoundPhase {
    /// No round has been started yet.
    #[default]
    Idle,
    /// A round is being presented.
    Running,
    /// The round has been finalized.
    Finished,
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Finished => "finished",
        };
        f.write_str(label)
    }
}

/// Engine operations that are only valid in some phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Presenting the next stimulus.
    Advance,
    /// Submitting a "match" action.
    SubmitMatch,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Advance => "advance",
            Self::SubmitMatch => "submit_match",
        };
        f.write_str(label)
    }
}

/// Malformed round parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum ConfigError {
    /// The lag must be at least one and strictly less than the round length.
    #[error("lag {lag} must satisfy 1 <= lag < length ({length})")]
    LagOutOfRange {
        /// Requested lag.
        lag: usize,
        /// Requested round length.
        length: usize,
    },
    /// Fewer than two stimulus values make a non-match impossible.
    #[error("alphabet size {alphabet_size} is below the minimum of {}", MIN_ALPHABET_SIZE)]
    AlphabetTooSmall {
        /// Requested alphabet size.
        alphabet_size: u32,
    },
    /// Match percentage must lie within `[0, 100]`.
    #[error("match percent {match_percent} exceeds {}", MAX_MATCH_PERCENT)]
    MatchPercentOutOfRange {
        /// Requested match percentage.
        match_percent: u8,
    },
}

/// Operation invoked in a phase that forbids it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum StateError {
    /// The operation requires a running round.
    #[error("cannot {operation} while the round is {phase}")]
    NotRunning {
        /// Operation that was rejected.
        operation: Operation,
        /// Phase the engine was in.
        phase: RoundPhase,
    },
    /// A match was submitted before the first stimulus was presented.
    #[error("cannot submit a match before the first stimulus is presented")]
    NoStimulusPresented,
    /// Stop was requested before any round was started.
    #[error("cannot stop: no round has been started")]
    NothingToStop,
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative round state management for the N-back engine.
//!
//! The engine owns the generated [`Sequence`] and the [`RoundState`] for one
//! round at a time. It never keeps time itself: an external tick source calls
//! [`RoundEngine::advance`] once per cadence step, and user input arrives via
//! [`RoundEngine::submit_match`]. Every mutation takes `&mut self`, so callers
//! that drive the engine from several threads must serialize access.

use nback_core::{
    ConfigError, MatchVerdict, Operation, RoundConfig, RoundPhase, RoundState, RoundSummary,
    Sequence, StateError, Stimulus,
};
use nback_system_sequence::SequenceGenerator;
use tracing::{debug, info};

/// Outcome of a single [`RoundEngine::advance`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// A new stimulus is now on display.
    Presented(Stimulus),
    /// The sequence was exhausted and the round has been finalized.
    Finished(RoundSummary),
}

/// Drives a single N-back round from start to final score.
#[derive(Debug)]
pub struct RoundEngine {
    generator: SequenceGenerator,
    best_score: u32,
    round: Option<Round>,
}

#[derive(Debug)]
struct Round {
    config: RoundConfig,
    sequence: Sequence,
    state: RoundState,
    credited_index: Option<usize>,
    summary: Option<RoundSummary>,
}

impl Round {
    fn new(config: RoundConfig, sequence: Sequence) -> Self {
        Self {
            config,
            sequence,
            state: RoundState {
                current_index: None,
                correct_count: 0,
                is_running: true,
                last_match_status: false,
            },
            credited_index: None,
            summary: None,
        }
    }

    fn finalize(&mut self, best_score: &mut u32) -> RoundSummary {
        let final_score = self.state.correct_count;
        let is_new_high_score = final_score > *best_score;
        if is_new_high_score {
            *best_score = final_score;
        }
        self.state.is_running = false;

        let summary = RoundSummary {
            final_score,
            is_new_high_score,
            best_score: *best_score,
        };
        self.summary = Some(summary);
        info!(
            final_score,
            is_new_high_score,
            best_score = *best_score,
            "round finished"
        );
        summary
    }
}

impl RoundEngine {
    /// Creates an idle engine that remembers `best_score` from earlier sessions.
    #[must_use]
    pub fn new(generator: SequenceGenerator, best_score: u32) -> Self {
        Self {
            generator,
            best_score,
            round: None,
        }
    }

    /// Generates a fresh sequence and begins presenting it.
    ///
    /// Any round in progress is discarded without being scored. A rejected
    /// configuration leaves the engine exactly as it was.
    pub fn start(&mut self, config: RoundConfig) -> Result<(), ConfigError> {
        let generated = self
            .generator
            .generate_with_plan(&config)
            .map_err(|error| {
                debug!(%error, ?config, "rejected round configuration");
                error
            })?;

        if phase_of(&self.round) == RoundPhase::Running {
            debug!("abandoning unfinished round");
        }
        info!(
            length = config.length,
            alphabet_size = config.alphabet_size,
            match_percent = config.match_percent,
            lag = config.lag,
            forced_matches = generated.forced_count(),
            "round started"
        );
        self.round = Some(Round::new(config, generated.sequence));
        Ok(())
    }

    /// Presents the next stimulus, or finalizes the round once the sequence is exhausted.
    ///
    /// When the round ends here the current index keeps pointing at the last
    /// presented stimulus.
    pub fn advance(&mut self) -> Result<Advance, StateError> {
        let round = running_round(&mut self.round, Operation::Advance)?;
        let next = round.state.current_index.map_or(0, |index| index + 1);

        let Some(value) = round.sequence.value(next) else {
            return Ok(Advance::Finished(round.finalize(&mut self.best_score)));
        };

        let is_match = round.sequence.is_match_at(next, round.config.lag);
        round.state.current_index = Some(next);
        round.state.last_match_status = is_match;

        Ok(Advance::Presented(Stimulus {
            index: next,
            value,
            is_match,
        }))
    }

    /// Scores a "match" action against the stimulus on display.
    ///
    /// Each matching index is credited at most once.
    pub fn submit_match(&mut self) -> Result<MatchVerdict, StateError> {
        let round = running_round(&mut self.round, Operation::SubmitMatch)?;
        let Some(index) = round.state.current_index else {
            return Err(StateError::NoStimulusPresented);
        };

        let correct = round.sequence.is_match_at(index, round.config.lag);
        round.state.last_match_status = correct;

        let credited = correct && round.credited_index != Some(index);
        if credited {
            round.state.correct_count += 1;
            round.credited_index = Some(index);
        } else if !correct {
            debug!(index, "match submitted on a non-match stimulus");
        }

        Ok(MatchVerdict { correct, credited })
    }

    /// Ends the round and returns its summary.
    ///
    /// Stopping a finished round returns the summary computed when it
    /// finished; the score is finalized only once.
    pub fn stop(&mut self) -> Result<RoundSummary, StateError> {
        let Some(round) = self.round.as_mut() else {
            return Err(StateError::NothingToStop);
        };
        if let Some(summary) = round.summary {
            return Ok(summary);
        }
        Ok(round.finalize(&mut self.best_score))
    }
}

fn phase_of(round: &Option<Round>) -> RoundPhase {
    match round {
        None => RoundPhase::Idle,
        Some(round) if round.summary.is_some() => RoundPhase::Finished,
        Some(_) => RoundPhase::Running,
    }
}

fn running_round(
    round: &mut Option<Round>,
    operation: Operation,
) -> Result<&mut Round, StateError> {
    let phase = phase_of(round);
    match round {
        Some(round) if phase == RoundPhase::Running => Ok(round),
        _ => {
            debug!(%operation, %phase, "rejected operation outside a running round");
            Err(StateError::NotRunning { operation, phase })
        }
    }
}

/// Query functions that provide read-only access to the engine state.
pub mod query {
    use super::{phase_of, RoundEngine};
    use nback_core::{RoundConfig, RoundPhase, RoundState, RoundSummary, Sequence, Stimulus};

    /// Reports the lifecycle phase of the engine.
    #[must_use]
    pub fn phase(engine: &RoundEngine) -> RoundPhase {
        phase_of(&engine.round)
    }

    /// Captures the progress of the current round; idle engines report the reset state.
    #[must_use]
    pub fn round_state(engine: &RoundEngine) -> RoundState {
        engine
            .round
            .as_ref()
            .map(|round| round.state)
            .unwrap_or_default()
    }

    /// Configuration of the current or most recent round.
    #[must_use]
    pub fn config(engine: &RoundEngine) -> Option<&RoundConfig> {
        engine.round.as_ref().map(|round| &round.config)
    }

    /// Sequence of the current or most recent round.
    #[must_use]
    pub fn sequence(engine: &RoundEngine) -> Option<&Sequence> {
        engine.round.as_ref().map(|round| &round.sequence)
    }

    /// Best score known to the engine, including finished rounds.
    #[must_use]
    pub fn best_score(engine: &RoundEngine) -> u32 {
        engine.best_score
    }

    /// Summary of the most recent round, once it has finished.
    #[must_use]
    pub fn last_summary(engine: &RoundEngine) -> Option<RoundSummary> {
        engine.round.as_ref().and_then(|round| round.summary)
    }

    /// Stimulus currently on display, if any has been presented.
    #[must_use]
    pub fn current_stimulus(engine: &RoundEngine) -> Option<Stimulus> {
        let round = engine.round.as_ref()?;
        let index = round.state.current_index?;
        let value = round.sequence.value(index)?;
        Some(Stimulus {
            index,
            value,
            is_match: round.sequence.is_match_at(index, round.config.lag),
        })
    }
}

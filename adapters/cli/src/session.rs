//! Serializes ticks and key presses into a single round.

use std::{
    sync::mpsc::{Receiver, RecvTimeoutError},
    time::Instant,
};

use anyhow::Result;
use nback_core::{GameMode, RoundConfig, RoundSummary};
use nback_engine::{query, Advance, RoundEngine};
use nback_rendering::{ErrorFlash, Presenter};
use tracing::debug;

/// Messages consumed by the session loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Input {
    /// The tick source fired; present the next stimulus.
    Tick,
    /// The player claimed a match.
    Match,
    /// The player asked to end the round early.
    Quit,
}

impl Input {
    /// Interprets one line typed by the player.
    pub(crate) fn from_line(line: &str) -> Option<Self> {
        match line.trim() {
            "" | "m" | "M" => Some(Self::Match),
            "q" | "Q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Plays one round to completion.
///
/// The first stimulus is shown as soon as the round starts. The round ends
/// when the sequence runs out, on [`Input::Quit`], or when every input
/// producer has hung up.
pub(crate) fn play_round<P: Presenter>(
    engine: &mut RoundEngine,
    config: RoundConfig,
    mode: GameMode,
    inputs: &Receiver<Input>,
    presenter: &mut P,
) -> Result<RoundSummary> {
    engine.start(config)?;
    let mut flash = ErrorFlash::default();

    if let Some(summary) = present_next(engine, mode, presenter)? {
        return Ok(summary);
    }

    loop {
        let input = match flash.remaining(Instant::now()) {
            Some(remaining) => inputs.recv_timeout(remaining),
            None => inputs.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match input {
            Ok(Input::Tick) => {
                if let Some(summary) = present_next(engine, mode, presenter)? {
                    return Ok(summary);
                }
            }
            Ok(Input::Match) => match engine.submit_match() {
                Ok(verdict) => {
                    let index = query::round_state(engine).current_index.unwrap_or_default();
                    if verdict.correct {
                        presenter.match_accepted(index)?;
                    } else {
                        flash.raise(Instant::now());
                        presenter.match_rejected(index)?;
                    }
                }
                Err(error) => debug!(%error, "ignored match press"),
            },
            Ok(Input::Quit) | Err(RecvTimeoutError::Disconnected) => {
                let summary = engine.stop()?;
                presenter.round_finished(summary)?;
                return Ok(summary);
            }
            Err(RecvTimeoutError::Timeout) => {}
        }

        if flash.expire(Instant::now()) {
            presenter.clear_error()?;
        }
    }
}

fn present_next<P: Presenter>(
    engine: &mut RoundEngine,
    mode: GameMode,
    presenter: &mut P,
) -> Result<Option<RoundSummary>> {
    match engine.advance()? {
        Advance::Presented(stimulus) => {
            presenter.present(stimulus, mode)?;
            Ok(None)
        }
        Advance::Finished(summary) => {
            presenter.round_finished(summary)?;
            Ok(Some(summary))
        }
    }
}

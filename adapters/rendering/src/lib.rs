#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for N-back adapters.
//!
//! The round engine only reports what happened; this crate decides how a
//! stimulus looks or sounds, and how long the error indication stays up.

use std::{
    fmt,
    io::Write,
    time::{Duration, Instant},
};

use anyhow::Result as AnyResult;
use nback_core::{GameMode, RoundSummary, Stimulus};

/// Letters used for spoken presentation, indexed by stimulus value.
pub const SPOKEN_LETTERS: [char; 9] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I'];

/// How long the error indication stays visible after a wrong match press.
pub const ERROR_FLASH_DURATION: Duration = Duration::from_millis(250);

/// Maps a stimulus value to its spoken letter, if the value has one.
#[must_use]
pub fn letter_for(value: u32) -> Option<char> {
    let index = usize::try_from(value).ok()?;
    SPOKEN_LETTERS.get(index).copied()
}

/// Number of cells along each edge of the smallest square grid holding `alphabet_size` cells.
#[must_use]
pub fn grid_side(alphabet_size: u32) -> u32 {
    let mut side: u32 = 1;
    while u64::from(side) * u64::from(side) < u64::from(alphabet_size) {
        side += 1;
    }
    side
}

/// Position of a stimulus inside the square presentation grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridCell {
    /// Zero-based row, top to bottom.
    pub row: u32,
    /// Zero-based column, left to right.
    pub column: u32,
}

impl GridCell {
    /// Places `value` in a row-major grid with `side` cells per row.
    #[must_use]
    pub fn for_value(value: u32, side: u32) -> Self {
        let side = side.max(1);
        Self {
            row: value / side,
            column: value % side,
        }
    }
}

/// Text label shown for a stimulus in a given mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StimulusLabel {
    /// Spoken letter.
    Letter(char),
    /// Grid cell for visual mode, or values outside the letter table.
    Cell(GridCell),
}

impl StimulusLabel {
    /// Chooses the label for `value`; audio falls back to a cell past the letter table.
    #[must_use]
    pub fn new(value: u32, mode: GameMode, side: u32) -> Self {
        match (mode, letter_for(value)) {
            (GameMode::Audio, Some(letter)) => Self::Letter(letter),
            _ => Self::Cell(GridCell::for_value(value, side)),
        }
    }
}

impl fmt::Display for StimulusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Letter(letter) => write!(f, "{letter}"),
            Self::Cell(cell) => write!(f, "r{}c{}", cell.row + 1, cell.column + 1),
        }
    }
}

/// Transient error indication raised by a wrong match press.
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorFlash {
    raised_at: Option<Instant>,
}

impl ErrorFlash {
    /// Shows the indication starting at `now`, restarting it if already visible.
    pub fn raise(&mut self, now: Instant) {
        self.raised_at = Some(now);
    }

    /// Reports whether the indication is still visible at `now`.
    #[must_use]
    pub fn is_visible(&self, now: Instant) -> bool {
        self.raised_at
            .map_or(false, |raised| now.saturating_duration_since(raised) < ERROR_FLASH_DURATION)
    }

    /// Time left before the indication hides, if it is visible at `now`.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let raised = self.raised_at?;
        ERROR_FLASH_DURATION
            .checked_sub(now.saturating_duration_since(raised))
            .filter(|remaining| !remaining.is_zero())
    }

    /// Hides the indication if its duration has elapsed, returning whether it was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.raised_at.is_some() && !self.is_visible(now) {
            self.raised_at = None;
            return true;
        }
        false
    }
}

/// Collaborator that renders engine output to the player.
pub trait Presenter {
    /// Shows a freshly presented stimulus.
    fn present(&mut self, stimulus: Stimulus, mode: GameMode) -> AnyResult<()>;

    /// Acknowledges a correct match press.
    fn match_accepted(&mut self, stimulus_index: usize) -> AnyResult<()>;

    /// Raises the transient error indication for a wrong match press.
    fn match_rejected(&mut self, stimulus_index: usize) -> AnyResult<()>;

    /// Clears a previously raised error indication.
    fn clear_error(&mut self) -> AnyResult<()>;

    /// Shows the final score.
    fn round_finished(&mut self, summary: RoundSummary) -> AnyResult<()>;
}

/// Line-oriented presenter for terminals and logs.
#[derive(Debug)]
pub struct TerminalPresenter<W> {
    out: W,
    side: u32,
}

impl<W: Write> TerminalPresenter<W> {
    /// Creates a presenter sized for `alphabet_size` stimulus values.
    #[must_use]
    pub fn new(out: W, alphabet_size: u32) -> Self {
        Self {
            out,
            side: grid_side(alphabet_size),
        }
    }

    /// Consumes the presenter, returning the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_grid(&mut self, highlighted: GridCell) -> AnyResult<()> {
        for row in 0..self.side {
            let line: String = (0..self.side)
                .map(|column| {
                    if (GridCell { row, column }) == highlighted {
                        '#'
                    } else {
                        '.'
                    }
                })
                .collect();
            writeln!(self.out, "  {line}")?;
        }
        Ok(())
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn present(&mut self, stimulus: Stimulus, mode: GameMode) -> AnyResult<()> {
        let label = StimulusLabel::new(stimulus.value, mode, self.side);
        writeln!(self.out, "[{:>3}] {label}", stimulus.index + 1)?;
        if let StimulusLabel::Cell(cell) = label {
            self.write_grid(cell)?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn match_accepted(&mut self, stimulus_index: usize) -> AnyResult<()> {
        writeln!(self.out, "      match! (#{})", stimulus_index + 1)?;
        Ok(())
    }

    fn match_rejected(&mut self, stimulus_index: usize) -> AnyResult<()> {
        writeln!(self.out, "      no match at #{}", stimulus_index + 1)?;
        Ok(())
    }

    fn clear_error(&mut self) -> AnyResult<()> {
        Ok(())
    }

    fn round_finished(&mut self, summary: RoundSummary) -> AnyResult<()> {
        writeln!(
            self.out,
            "Round over: {} correct (best {})",
            summary.final_score, summary.best_score
        )?;
        if summary.is_new_high_score {
            writeln!(self.out, "New high score!")?;
        }
        self.out.flush()?;
        Ok(())
    }
}

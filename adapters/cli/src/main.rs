#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays N-back rounds in the terminal.

mod high_score;
mod keyboard;
mod session;
mod settings;
mod ticker;

use std::{io, sync::mpsc, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use nback_engine::RoundEngine;
use nback_rendering::TerminalPresenter;
use nback_system_sequence::SequenceGenerator;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    high_score::HighScoreStore,
    settings::{Args, Settings},
    ticker::IntervalTicker,
};

/// Entry point for the N-back command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let settings = Settings::resolve(&args)?;

    let store = HighScoreStore::new(settings.high_score_file.clone());
    let best_score = store.load()?;
    info!(best_score, path = %store.path().display(), "loaded high score");

    let generator = settings
        .seed
        .map_or_else(SequenceGenerator::from_entropy, SequenceGenerator::seeded)
        .with_placement(settings.placement);
    let mut engine = RoundEngine::new(generator, best_score);

    let (sender, inputs) = mpsc::channel();
    let _ticker = ticker::spawn(
        IntervalTicker::new(settings.interval, Instant::now()),
        sender.clone(),
    );
    let _keyboard = keyboard::spawn(sender);

    let stdout = io::stdout();
    let mut presenter = TerminalPresenter::new(stdout.lock(), settings.round.alphabet_size);
    let summary = session::play_round(
        &mut engine,
        settings.round,
        settings.mode,
        &inputs,
        &mut presenter,
    )
    .context("round aborted")?;

    if summary.is_new_high_score {
        store.save(summary.best_score)?;
    }
    Ok(())
}

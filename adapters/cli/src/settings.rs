//! Round settings assembled from defaults, an optional TOML file and flags.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use nback_core::{GameMode, RoundConfig};
use nback_system_sequence::MatchPlacement;
use serde::Deserialize;

const DEFAULT_ROUND_LENGTH: usize = 20;
const DEFAULT_COMBINATIONS: u32 = 9;
const DEFAULT_MATCH_PERCENT: u8 = 30;
const DEFAULT_N: usize = 2;
const DEFAULT_INTERVAL: Duration = Duration::from_millis(1_800);
const DEFAULT_HIGH_SCORE_FILE: &str = "nback_high_score.toml";

/// Command-line flags. Every round parameter overrides the settings file.
#[derive(Debug, Default, Parser)]
#[command(
    name = "nback",
    about = "Play a round of the N-back memory game in the terminal.",
    after_help = "Press Enter (or type `m` and Enter) for a match, `q` and Enter to quit."
)]
pub(crate) struct Args {
    /// TOML settings file using `roundLength`, `combinations`, `matchPercent`, `n` and `mode`.
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Number of stimuli in the round.
    #[arg(long = "length", visible_alias = "round-length")]
    pub(crate) round_length: Option<usize>,
    /// Number of distinct stimulus values.
    #[arg(long, visible_alias = "alphabet-size")]
    pub(crate) combinations: Option<u32>,
    /// Target percentage of positions that repeat the stimulus N steps back.
    #[arg(long)]
    pub(crate) match_percent: Option<u8>,
    /// Lag between compared stimuli.
    #[arg(short = 'n', long = "n", visible_alias = "lag")]
    pub(crate) n: Option<usize>,
    /// Presentation channel.
    #[arg(long, value_enum)]
    pub(crate) mode: Option<ModeArg>,
    /// Seed for a reproducible sequence.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Milliseconds between stimuli.
    #[arg(long)]
    pub(crate) interval_ms: Option<u64>,
    /// File holding the persisted high score.
    #[arg(long)]
    pub(crate) high_score_file: Option<PathBuf>,
    /// Force exactly the rounded target number of matches.
    #[arg(long)]
    pub(crate) exact_matches: bool,
}

/// Presentation channel accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum ModeArg {
    /// Highlighted grid cells.
    Visual,
    /// Spoken letters.
    Audio,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Visual => GameMode::Visual,
            ModeArg::Audio => GameMode::Audio,
        }
    }
}

/// Contents of a settings file. Missing keys fall back to defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct SettingsFile {
    #[serde(alias = "length")]
    round_length: Option<usize>,
    #[serde(alias = "alphabetSize")]
    combinations: Option<u32>,
    match_percent: Option<u8>,
    #[serde(alias = "lag")]
    n: Option<usize>,
    mode: Option<GameMode>,
    interval_ms: Option<u64>,
    seed: Option<u64>,
    exact_matches: Option<bool>,
    high_score_file: Option<PathBuf>,
}

impl SettingsFile {
    /// Reads and parses the settings file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse settings file at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid settings toml")
    }
}

/// Fully resolved settings for one session.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) round: RoundConfig,
    pub(crate) mode: GameMode,
    pub(crate) interval: Duration,
    pub(crate) seed: Option<u64>,
    pub(crate) placement: MatchPlacement,
    pub(crate) high_score_file: PathBuf,
}

impl Settings {
    /// Loads the settings file named by `args`, if any, and applies the flags on top.
    pub(crate) fn resolve(args: &Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => SettingsFile::load(path)?,
            None => SettingsFile::default(),
        };
        Ok(Self::merge(file, args))
    }

    fn merge(file: SettingsFile, args: &Args) -> Self {
        let round = RoundConfig::new(
            args.round_length
                .or(file.round_length)
                .unwrap_or(DEFAULT_ROUND_LENGTH),
            args.combinations
                .or(file.combinations)
                .unwrap_or(DEFAULT_COMBINATIONS),
            args.match_percent
                .or(file.match_percent)
                .unwrap_or(DEFAULT_MATCH_PERCENT),
            args.n.or(file.n).unwrap_or(DEFAULT_N),
        );
        let mode = args
            .mode
            .map(GameMode::from)
            .or(file.mode)
            .unwrap_or_default();
        let interval = args
            .interval_ms
            .or(file.interval_ms)
            .map_or(DEFAULT_INTERVAL, Duration::from_millis);
        let placement = if args.exact_matches || file.exact_matches.unwrap_or(false) {
            MatchPlacement::Exact
        } else {
            MatchPlacement::Independent
        };
        let high_score_file = args
            .high_score_file
            .clone()
            .or(file.high_score_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_HIGH_SCORE_FILE));

        Self {
            round,
            mode,
            interval,
            seed: args.seed.or(file.seed),
            placement,
            high_score_file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let settings = Settings::merge(SettingsFile::default(), &Args::default());
        assert_eq!(settings.round, RoundConfig::new(20, 9, 30, 2));
        assert_eq!(settings.mode, GameMode::Visual);
        assert_eq!(settings.interval, Duration::from_millis(1_800));
        assert_eq!(settings.placement, MatchPlacement::Independent);
        assert_eq!(settings.seed, None);
        assert_eq!(settings.high_score_file, PathBuf::from("nback_high_score.toml"));
    }

    #[test]
    fn file_values_override_defaults() {
        let file = SettingsFile::parse(
            "roundLength = 30\ncombinations = 4\nmatchPercent = 50\nn = 3\nmode = \"audio\"\nintervalMs = 900\n",
        )
        .expect("valid settings");
        let settings = Settings::merge(file, &Args::default());

        assert_eq!(settings.round, RoundConfig::new(30, 4, 50, 3));
        assert_eq!(settings.mode, GameMode::Audio);
        assert_eq!(settings.interval, Duration::from_millis(900));
    }

    #[test]
    fn flags_override_file_values() {
        let file = SettingsFile::parse("roundLength = 30\nlag = 3\nmode = \"audio\"\n")
            .expect("valid settings");
        let args = Args::parse_from([
            "nback",
            "--length",
            "12",
            "-n",
            "1",
            "--mode",
            "visual",
            "--seed",
            "7",
            "--exact-matches",
        ]);
        let settings = Settings::merge(file, &args);

        assert_eq!(settings.round.length, 12);
        assert_eq!(settings.round.lag, 1);
        assert_eq!(settings.mode, GameMode::Visual);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.placement, MatchPlacement::Exact);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(SettingsFile::parse("roundLenght = 30\n").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let path = Path::new("definitely/not/here/nback.toml");
        let error = SettingsFile::load(path).expect_err("missing file");
        assert!(format!("{error:#}").contains("definitely/not/here/nback.toml"));
    }
}

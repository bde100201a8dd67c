//! Persistence for the single best score.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoreRecord {
    high_score: u32,
}

/// Reads and writes the best score to a small TOML file.
#[derive(Clone, Debug)]
pub(crate) struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored best score, or zero when nothing was saved yet.
    pub(crate) fn load(&self) -> Result<u32> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no stored high score");
            return Ok(0);
        }
        let contents = fs::read_to_string(&self.path).with_context(|| {
            format!("failed to read high score file at {}", self.path.display())
        })?;
        let record: ScoreRecord = toml::from_str(&contents).with_context(|| {
            format!("failed to parse high score file at {}", self.path.display())
        })?;
        Ok(record.high_score)
    }

    pub(crate) fn save(&self, high_score: u32) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let contents = toml::to_string(&ScoreRecord { high_score })
            .context("failed to encode high score")?;
        fs::write(&self.path, contents).with_context(|| {
            format!("failed to write high score file at {}", self.path.display())
        })?;
        debug!(high_score, path = %self.path.display(), "stored high score");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("nback-cli-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn missing_file_loads_as_zero() {
        let store = HighScoreStore::new(scratch_path("missing/high_score.toml"));
        assert_eq!(store.load().expect("load"), 0);
    }

    #[test]
    fn saved_score_is_loaded_back() {
        let store = HighScoreStore::new(scratch_path("saved/high_score.toml"));
        store.save(7).expect("save");
        assert_eq!(store.load().expect("load"), 7);

        let contents = fs::read_to_string(store.path()).expect("read back");
        assert_eq!(contents.trim(), "highScore = 7");
        fs::remove_file(store.path()).expect("cleanup");
    }

    #[test]
    fn corrupt_file_reports_path() {
        let store = HighScoreStore::new(scratch_path("corrupt/high_score.toml"));
        fs::create_dir_all(store.path().parent().expect("parent")).expect("mkdir");
        fs::write(store.path(), "highScore = \"lots\"").expect("write");

        let error = store.load().expect_err("corrupt file");
        assert!(format!("{error:#}").contains("failed to parse high score file"));
        fs::remove_file(store.path()).expect("cleanup");
    }
}

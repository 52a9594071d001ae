//! Environment configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which orchestrator the driver runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Untimed walk through the ten stages.
    #[default]
    Experience,
    /// Countdown and scoring.
    Challenge,
}

impl FromStr for Mode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "experience" => Ok(Self::Experience),
            "challenge" => Ok(Self::Challenge),
            other => Err(AppError::Config(format!(
                "DIANCHA_MODE must be experience or challenge, got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Experience => f.write_str("experience"),
            Self::Challenge => f.write_str("challenge"),
        }
    }
}

/// Settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Initial mode.
    pub mode: Mode,
    /// Script to play; the bundled demo when absent.
    pub script: Option<PathBuf>,
    /// Content table override; the bundled table when absent.
    pub content: Option<PathBuf>,
    /// Frame ticker period.
    pub frame: Duration,
    /// Challenge countdown, in seconds.
    pub challenge_seconds: u32,
    /// How long the loop keeps running after the last script step.
    pub linger: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Experience,
            script: None,
            content: None,
            frame: Duration::from_millis(50),
            challenge_seconds: 150,
            linger: Duration::from_millis(1000),
        }
    }
}

impl AppConfig {
    /// Reads the `DIANCHA_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a value is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let mode = lookup("DIANCHA_MODE")
            .map(|value| value.parse::<Mode>())
            .transpose()?
            .unwrap_or(defaults.mode);
        let frame_ms = positive(&lookup, "DIANCHA_FRAME_MS")?.unwrap_or(50);
        let challenge_seconds = positive(&lookup, "DIANCHA_CHALLENGE_SECONDS")?
            .map(|seconds| {
                u32::try_from(seconds).map_err(|_| {
                    AppError::Config(format!(
                        "DIANCHA_CHALLENGE_SECONDS must fit in 32 bits, got {seconds}"
                    ))
                })
            })
            .transpose()?
            .unwrap_or(defaults.challenge_seconds);
        let linger_ms = lookup("DIANCHA_LINGER_MS")
            .map(|value| {
                value.trim().parse::<u64>().map_err(|e| {
                    AppError::Config(format!(
                        "DIANCHA_LINGER_MS must be a non-negative integer: {e}"
                    ))
                })
            })
            .transpose()?
            .unwrap_or(1000);

        Ok(Self {
            mode,
            script: lookup("DIANCHA_SCRIPT").map(PathBuf::from),
            content: lookup("DIANCHA_CONTENT").map(PathBuf::from),
            frame: Duration::from_millis(frame_ms),
            challenge_seconds,
            linger: Duration::from_millis(linger_ms),
        })
    }
}

fn positive(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>, AppError> {
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    match value.trim().parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(Some(parsed)),
        _ => Err(AppError::Config(format!(
            "{key} must be a positive integer, got {value:?}"
        ))),
    }
}

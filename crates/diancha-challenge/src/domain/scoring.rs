//! Points and ranks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Countdown length of a round, in seconds.
pub const DEFAULT_TIME_BUDGET_SECONDS: u32 = 150;

/// Points for completing a stage with `time_remaining` seconds left:
/// 100 plus 10 for every whole ten seconds remaining.
#[must_use]
pub fn stage_points(time_remaining: u32) -> u32 {
    100 + (time_remaining / 10) * 10
}

/// Title awarded for a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    /// 1000 points or fewer.
    Novice,
    /// Above 1000.
    TeaMaster,
    /// Above 1400.
    TeaSage,
    /// Above 1800.
    TeaImmortal,
}

impl Rank {
    /// The rank earned by `score`, checked from the highest tier down.
    #[must_use]
    pub fn for_score(score: u32) -> Self {
        if score > 1800 {
            Self::TeaImmortal
        } else if score > 1400 {
            Self::TeaSage
        } else if score > 1000 {
            Self::TeaMaster
        } else {
            Self::Novice
        }
    }

    /// Display title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Novice => "Novice",
            Self::TeaMaster => "Tea Master",
            Self::TeaSage => "Tea Sage",
            Self::TeaImmortal => "Tea Immortal",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

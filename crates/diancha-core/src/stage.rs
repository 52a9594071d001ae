//! The ten ordered stages of the ritual.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// One of the ten stages, in ritual order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Warm the tea cake over the stove.
    Roasting = 1,
    /// Crush the roasted cake in the roller trough.
    Grinding = 2,
    /// Turn the stone mill into fine powder.
    Milling = 3,
    /// Spoon the powder into the tea box.
    Boxing = 4,
    /// Bring the ewer to the "fish-eye" boil.
    Boiling = 5,
    /// Warm the cup with hot water.
    Warming = 6,
    /// Scoop powder into the cup.
    Scooping = 7,
    /// First pour, mixing the paste.
    Pouring = 8,
    /// Whisk up the foam.
    Whisking = 9,
    /// Taste the finished tea.
    Tasting = 10,
}

impl Stage {
    /// The first stage of a session.
    pub const FIRST: Self = Self::Roasting;

    /// The last stage of a session.
    pub const LAST: Self = Self::Tasting;

    /// All stages in order.
    pub const ALL: [Self; 10] = [
        Self::Roasting,
        Self::Grinding,
        Self::Milling,
        Self::Boxing,
        Self::Boiling,
        Self::Warming,
        Self::Scooping,
        Self::Pouring,
        Self::Whisking,
        Self::Tasting,
    ];

    /// The 1-based ordinal.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Looks a stage up by its 1-based ordinal.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `ordinal` is outside `1..=10`.
    pub fn from_ordinal(ordinal: u8) -> Result<Self, DomainError> {
        match ordinal {
            1..=10 => Ok(Self::ALL[usize::from(ordinal - 1)]),
            other => Err(DomainError::Validation(format!(
                "stage ordinal must be within 1..=10, got {other}"
            ))),
        }
    }

    /// The following stage, or `None` for the last one.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(usize::from(self.ordinal())).copied()
    }

    /// Stable machine-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Roasting => "roasting",
            Self::Grinding => "grinding",
            Self::Milling => "milling",
            Self::Boxing => "boxing",
            Self::Boiling => "boiling",
            Self::Warming => "warming",
            Self::Scooping => "scooping",
            Self::Pouring => "pouring",
            Self::Whisking => "whisking",
            Self::Tasting => "tasting",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

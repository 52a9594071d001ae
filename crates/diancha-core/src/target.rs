//! Named on-screen targets that gestures are tested against.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// A target element of the ritual scene.
///
/// The presentation layer owns where each target is drawn; the engine only
/// refers to targets by name and reads their rectangles through the
/// bindings it was constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// The charcoal stove used for roasting and boiling.
    Stove,
    /// The roller trough the roasted cake is placed in.
    Trough,
    /// The roller wheel that is tapped to crush the cake.
    Roller,
    /// The stone mill turned by its handle.
    Mill,
    /// The saucer holding freshly milled powder.
    Saucer,
    /// The lidded box the powder is stored in.
    TeaBox,
    /// The tea cup.
    Cup,
}

impl Target {
    /// All targets.
    pub const ALL: [Self; 7] = [
        Self::Stove,
        Self::Trough,
        Self::Roller,
        Self::Mill,
        Self::Saucer,
        Self::TeaBox,
        Self::Cup,
    ];

    /// Where the target sits in the default 1000 x 700 scene.
    ///
    /// Regions that stand for "the left part of the screen" or "below the
    /// tray line" are plain rectangles here.
    #[must_use]
    pub fn reference_rect(self) -> Rect {
        match self {
            Self::Stove => Rect::new(400.0, 300.0, 600.0, 500.0),
            Self::Trough => Rect::new(0.0, 150.0, 1000.0, 700.0),
            Self::Roller => Rect::new(300.0, 250.0, 700.0, 450.0),
            Self::Mill => Rect::new(350.0, 200.0, 650.0, 500.0),
            Self::Saucer => Rect::new(0.0, 0.0, 400.0, 700.0),
            Self::TeaBox => Rect::new(500.0, 0.0, 1000.0, 700.0),
            Self::Cup => Rect::new(200.0, 300.0, 350.0, 450.0),
        }
    }
}

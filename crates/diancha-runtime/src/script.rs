//! Pointer scripts for headless playback.
//!
//! ```yaml
//! layout:
//!   cup: { left: 200, top: 300, right: 350, bottom: 450 }
//! steps:
//!   - at_ms: 100
//!     event: { type: tap, x: 500, y: 400 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use diancha_core::geometry::Rect;
use diancha_core::target::Target;
use serde::{Deserialize, Serialize};

use crate::config::Mode;
use crate::error::AppError;

/// The demo that plays the whole ritual in experience mode.
pub const DEMO_SCRIPT: &str = include_str!("../demos/full_ritual.yaml");

/// An input the host delivers to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// Tap at a point.
    Tap {
        /// Horizontal coordinate.
        x: f64,
        /// Vertical coordinate.
        y: f64,
    },
    /// Drag sample.
    Move {
        /// Horizontal coordinate.
        x: f64,
        /// Vertical coordinate.
        y: f64,
    },
    /// Drop.
    Release {
        /// Horizontal coordinate.
        x: f64,
        /// Vertical coordinate.
        y: f64,
    },
    /// Switch between experience and challenge.
    SwitchMode {
        /// Mode to switch to.
        mode: Mode,
    },
    /// Start the challenge countdown.
    StartChallenge,
    /// Leave the challenge result screen.
    RestartChallenge,
    /// Return the experience session to the first stage.
    Reset,
}

/// One timed event of a script.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Milliseconds after the start of playback.
    pub at_ms: u64,
    /// The event delivered at that time.
    pub event: UiEvent,
}

/// A layout override plus a time-ordered list of events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Rectangles replacing the default scene layout.
    #[serde(default)]
    pub layout: BTreeMap<Target, Rect>,
    /// Events in non-decreasing time order.
    pub steps: Vec<ScriptStep>,
}

impl Script {
    /// Parses and validates a YAML script.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Script` if the document does not parse or its
    /// steps are out of order.
    pub fn from_yaml(source: &str) -> Result<Self, AppError> {
        let script: Self =
            serde_yaml::from_str(source).map_err(|e| AppError::Script(e.to_string()))?;
        if let Some(pair) = script
            .steps
            .windows(2)
            .find(|pair| pair[1].at_ms < pair[0].at_ms)
        {
            return Err(AppError::Script(format!(
                "step at {} ms comes after step at {} ms",
                pair[1].at_ms, pair[0].at_ms
            )));
        }
        Ok(script)
    }

    /// Reads and parses a script file.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file cannot be read and
    /// `AppError::Script` if it is invalid.
    pub async fn load(path: &Path) -> Result<Self, AppError> {
        let source = tokio::fs::read_to_string(path).await?;
        Self::from_yaml(&source)
    }

    /// The bundled demo.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Script` if the bundled demo is invalid.
    pub fn demo() -> Result<Self, AppError> {
        Self::from_yaml(DEMO_SCRIPT)
    }

    /// Time of the last step, in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.steps.last().map_or(0, |step| step.at_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_layout_and_events() {
        let script = Script::from_yaml(
            r"
layout:
  cup: { left: 10, top: 20, right: 30, bottom: 40 }
steps:
  - at_ms: 0
    event: { type: switch_mode, mode: challenge }
  - at_ms: 5
    event: { type: start_challenge }
  - at_ms: 5
    event: { type: move, x: 1.5, y: 2 }
",
        )
        .unwrap();

        assert_eq!(
            script.layout.get(&Target::Cup),
            Some(&Rect::new(10.0, 20.0, 30.0, 40.0))
        );
        assert_eq!(
            script.steps[0].event,
            UiEvent::SwitchMode {
                mode: Mode::Challenge
            }
        );
        assert_eq!(script.steps[1].event, UiEvent::StartChallenge);
        assert_eq!(script.steps[2].event, UiEvent::Move { x: 1.5, y: 2.0 });
        assert_eq!(script.duration_ms(), 5);
    }

    #[test]
    fn test_out_of_order_steps_are_rejected() {
        let result = Script::from_yaml(
            r"
steps:
  - at_ms: 10
    event: { type: reset }
  - at_ms: 5
    event: { type: reset }
",
        );

        match result.unwrap_err() {
            AppError::Script(msg) => assert_eq!(msg, "step at 5 ms comes after step at 10 ms"),
            other => panic!("expected Script, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let result = Script::from_yaml(
            r"
steps:
  - at_ms: 0
    event: { type: shake }
",
        );

        assert!(matches!(result, Err(AppError::Script(_))));
    }

    #[test]
    fn test_demo_script_is_valid() {
        let script = Script::demo().unwrap();

        assert!(script.layout.is_empty());
        assert!(script.duration_ms() > 0);
    }
}

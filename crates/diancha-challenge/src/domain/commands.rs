//! Inputs accepted by the challenge reducer.

use std::time::Duration;

use diancha_stage::domain::commands::GestureInput;

/// Everything that can happen to a challenge, timer ticks included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChallengeInput {
    /// Leave the intro and start the countdown.
    Start,
    /// A pointer event for the current stage.
    Gesture(GestureInput),
    /// A render frame: elapsed time for timed policies and settle windows.
    Frame(Duration),
    /// One second of the countdown.
    ClockSecond,
    /// Leave the result screen for a new intro.
    Restart,
}

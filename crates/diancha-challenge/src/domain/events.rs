//! Domain events for the Challenge context.

use diancha_core::event::{DomainEvent, EventMetadata};
use diancha_core::stage::Stage;
use serde::{Deserialize, Serialize};

use super::scoring::Rank;

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The countdown reached zero.
    TimeExpired,
    /// The last stage was completed.
    SessionFinished,
}

/// Emitted when a round starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeStarted {
    /// Countdown length, in seconds.
    pub budget_seconds: u32,
}

/// Emitted every countdown second.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownTicked {
    /// Seconds left after this tick.
    pub time_remaining: u32,
}

/// Emitted when a completed stage is scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageScored {
    /// The completed stage.
    pub stage: Stage,
    /// Points awarded.
    pub points: u32,
    /// Seconds left when the stage completed.
    pub time_remaining: u32,
    /// Running total after the award.
    pub score: u32,
}

/// Emitted when the round ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeEnded {
    /// Why the round ended.
    pub reason: EndReason,
    /// Final score.
    pub score: u32,
    /// Rank earned.
    pub rank: Rank,
}

/// Emitted when the result screen is left for a new intro.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeRestarted {
    /// Countdown length of the next round, in seconds.
    pub budget_seconds: u32,
}

/// Event type identifier for [`ChallengeStarted`].
pub const CHALLENGE_STARTED_EVENT_TYPE: &str = "challenge.started";

/// Event type identifier for [`CountdownTicked`].
pub const COUNTDOWN_TICKED_EVENT_TYPE: &str = "challenge.countdown_ticked";

/// Event type identifier for [`StageScored`].
pub const STAGE_SCORED_EVENT_TYPE: &str = "challenge.stage_scored";

/// Event type identifier for [`ChallengeEnded`].
pub const CHALLENGE_ENDED_EVENT_TYPE: &str = "challenge.ended";

/// Event type identifier for [`ChallengeRestarted`].
pub const CHALLENGE_RESTARTED_EVENT_TYPE: &str = "challenge.restarted";

/// Event payload variants for the Challenge context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChallengeEventKind {
    /// A round started.
    ChallengeStarted(ChallengeStarted),
    /// One second elapsed.
    CountdownTicked(CountdownTicked),
    /// A stage was scored.
    StageScored(StageScored),
    /// The round ended.
    ChallengeEnded(ChallengeEnded),
    /// Back to the intro.
    ChallengeRestarted(ChallengeRestarted),
}

impl ChallengeEventKind {
    /// The type identifier of this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ChallengeStarted(_) => CHALLENGE_STARTED_EVENT_TYPE,
            Self::CountdownTicked(_) => COUNTDOWN_TICKED_EVENT_TYPE,
            Self::StageScored(_) => STAGE_SCORED_EVENT_TYPE,
            Self::ChallengeEnded(_) => CHALLENGE_ENDED_EVENT_TYPE,
            Self::ChallengeRestarted(_) => CHALLENGE_RESTARTED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Challenge context.
#[derive(Debug, Clone)]
pub struct ChallengeEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: ChallengeEventKind,
}

impl DomainEvent for ChallengeEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("ChallengeEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

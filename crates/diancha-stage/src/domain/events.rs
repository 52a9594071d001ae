//! Domain events for the Stage interaction context.

use diancha_core::event::{DomainEvent, EventMetadata};
use diancha_core::stage::Stage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emitted when a controller is built for a stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageActivated {
    /// The stage being played.
    pub stage: Stage,
    /// Identifier of this activation.
    pub activation_id: Uuid,
    /// Whether the stage starts armed (no prerequisite).
    pub armed: bool,
}

/// Emitted when the prerequisite gesture is satisfied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageArmed {
    /// The stage.
    pub stage: Stage,
}

/// Emitted on the first gesture the policy accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureEngaged {
    /// The stage.
    pub stage: Stage,
}

/// Emitted when progress is full but a closing gesture is still needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetReached {
    /// The stage.
    pub stage: Stage,
}

/// Emitted when progress reaches its target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionLatched {
    /// The stage.
    pub stage: Stage,
    /// Length of the settle window, in milliseconds.
    pub settle_ms: u64,
}

/// Emitted when the settle window has elapsed and the callback fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSettled {
    /// The stage.
    pub stage: Stage,
}

/// Event type identifier for [`StageActivated`].
pub const STAGE_ACTIVATED_EVENT_TYPE: &str = "stage.activated";

/// Event type identifier for [`StageArmed`].
pub const STAGE_ARMED_EVENT_TYPE: &str = "stage.armed";

/// Event type identifier for [`GestureEngaged`].
pub const GESTURE_ENGAGED_EVENT_TYPE: &str = "stage.gesture_engaged";

/// Event type identifier for [`TargetReached`].
pub const TARGET_REACHED_EVENT_TYPE: &str = "stage.target_reached";

/// Event type identifier for [`CompletionLatched`].
pub const COMPLETION_LATCHED_EVENT_TYPE: &str = "stage.completion_latched";

/// Event type identifier for [`StageSettled`].
pub const STAGE_SETTLED_EVENT_TYPE: &str = "stage.settled";

/// Event payload variants for the Stage interaction context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageEventKind {
    /// A controller was activated.
    StageActivated(StageActivated),
    /// The prerequisite was met.
    StageArmed(StageArmed),
    /// The main gesture began.
    GestureEngaged(GestureEngaged),
    /// Progress is full; waiting for the closing gesture.
    TargetReached(TargetReached),
    /// The completion latch fired.
    CompletionLatched(CompletionLatched),
    /// The settle window ended.
    StageSettled(StageSettled),
}

impl StageEventKind {
    /// The type identifier of this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StageActivated(_) => STAGE_ACTIVATED_EVENT_TYPE,
            Self::StageArmed(_) => STAGE_ARMED_EVENT_TYPE,
            Self::GestureEngaged(_) => GESTURE_ENGAGED_EVENT_TYPE,
            Self::TargetReached(_) => TARGET_REACHED_EVENT_TYPE,
            Self::CompletionLatched(_) => COMPLETION_LATCHED_EVENT_TYPE,
            Self::StageSettled(_) => STAGE_SETTLED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Stage interaction context.
#[derive(Debug, Clone)]
pub struct StageEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: StageEventKind,
}

impl DomainEvent for StageEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("StageEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

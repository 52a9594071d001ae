//! Domain events for the Session context.

use diancha_core::event::{DomainEvent, EventMetadata};
use diancha_core::stage::Stage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emitted when a fresh controller takes over a stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStageActivated {
    /// The stage now current.
    pub stage: Stage,
    /// The new controller's activation identifier.
    pub activation_id: Uuid,
}

/// Emitted when the current activation reports completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStageCompleted {
    /// The completed stage.
    pub stage: Stage,
    /// The activation that completed.
    pub activation_id: Uuid,
}

/// Emitted when the last stage has been completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFinished {
    /// The last stage.
    pub stage: Stage,
}

/// Emitted when the session returns to the first stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReset {
    /// The stage that was current before the reset.
    pub from_stage: Stage,
}

/// Event type identifier for [`SessionStageActivated`].
pub const SESSION_STAGE_ACTIVATED_EVENT_TYPE: &str = "session.stage_activated";

/// Event type identifier for [`SessionStageCompleted`].
pub const SESSION_STAGE_COMPLETED_EVENT_TYPE: &str = "session.stage_completed";

/// Event type identifier for [`SessionFinished`].
pub const SESSION_FINISHED_EVENT_TYPE: &str = "session.finished";

/// Event type identifier for [`SessionReset`].
pub const SESSION_RESET_EVENT_TYPE: &str = "session.reset";

/// Event payload variants for the Session context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEventKind {
    /// A stage was activated.
    StageActivated(SessionStageActivated),
    /// A stage was completed.
    StageCompleted(SessionStageCompleted),
    /// The ritual is over.
    Finished(SessionFinished),
    /// The session went back to the start.
    Reset(SessionReset),
}

impl SessionEventKind {
    /// The type identifier of this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StageActivated(_) => SESSION_STAGE_ACTIVATED_EVENT_TYPE,
            Self::StageCompleted(_) => SESSION_STAGE_COMPLETED_EVENT_TYPE,
            Self::Finished(_) => SESSION_FINISHED_EVENT_TYPE,
            Self::Reset(_) => SESSION_RESET_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Session context.
#[derive(Debug, Clone)]
pub struct SessionEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: SessionEventKind,
}

impl DomainEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("SessionEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

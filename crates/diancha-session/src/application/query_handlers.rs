//! Query handlers for the Session context.

use diancha_core::stage::Stage;
use diancha_stage::application::query_handlers::{StageView, stage_view};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::SessionOrchestrator;

/// Read-only view of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    /// The session identifier.
    pub session_id: Uuid,
    /// The current stage.
    pub current_stage: Stage,
    /// Whether all ten stages are done.
    pub finished: bool,
    /// The active stage activation.
    pub stage: StageView,
}

/// Builds the view of a session.
#[must_use]
pub fn session_view(session: &SessionOrchestrator) -> SessionView {
    SessionView {
        session_id: session.id(),
        current_stage: session.current_stage(),
        finished: session.is_finished(),
        stage: stage_view(session.controller()),
    }
}

//! Query handlers for the Stage interaction context.
//!
//! Read-only views handed to the presentation layer.

use diancha_core::stage::Stage;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{StageController, StageState};

/// Read-only view of a stage activation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageView {
    /// The stage being played.
    pub stage: Stage,
    /// The activation identifier.
    pub activation_id: Uuid,
    /// Lifecycle state.
    pub state: StageState,
    /// Progress in `[0, 100]`.
    pub progress: f64,
    /// Whether a carry is under way.
    pub carrying: bool,
    /// Whether progress is full and the closing gesture is awaited.
    pub awaiting_finish: bool,
}

/// Builds the view of an activation.
#[must_use]
pub fn stage_view(controller: &StageController) -> StageView {
    StageView {
        stage: controller.stage(),
        activation_id: controller.activation_id(),
        state: controller.state(),
        progress: controller.progress(),
        carrying: controller.carrying(),
        awaiting_finish: controller.awaiting_finish(),
    }
}

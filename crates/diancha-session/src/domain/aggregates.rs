//! Aggregate roots for the Session context.

use std::sync::Arc;
use std::time::Duration;

use diancha_core::aggregate::AggregateRoot;
use diancha_core::clock::Clock;
use diancha_core::event::EventMetadata;
use diancha_core::stage::Stage;
use diancha_gesture::TargetBindings;
use diancha_stage::domain::aggregates::{StageCompletion, StageController};
use diancha_stage::domain::blueprint::StageCatalog;
use diancha_stage::domain::commands::GestureInput;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use super::events::{
    SessionEvent, SessionEventKind, SessionFinished, SessionReset, SessionStageActivated,
    SessionStageCompleted,
};

/// What an input did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "stage")]
pub enum SessionOutcome {
    /// The stage did not change.
    Idle,
    /// A stage completed and the given stage is now current.
    Advanced(Stage),
    /// The last stage completed.
    Finished,
}

/// Sequences the stages of one experience session.
///
/// The orchestrator is the only place controllers are built. Each
/// controller gets a callback that posts into a channel owned by the
/// orchestrator; completions are drained after every forwarded input and
/// matched against the current activation.
pub struct SessionOrchestrator {
    id: Uuid,
    version: i64,
    catalog: StageCatalog,
    targets: TargetBindings,
    clock: Arc<dyn Clock>,
    current_stage: Stage,
    finished: bool,
    controller: StageController,
    completions_tx: mpsc::UnboundedSender<StageCompletion>,
    completions_rx: mpsc::UnboundedReceiver<StageCompletion>,
    uncommitted_events: Vec<SessionEvent>,
}

impl SessionOrchestrator {
    /// Starts a session on the first stage.
    #[must_use]
    pub fn new(catalog: StageCatalog, targets: TargetBindings, clock: Arc<dyn Clock>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let controller = build_controller(
            Stage::FIRST,
            &catalog,
            &targets,
            &clock,
            &completions_tx,
        );
        let activation_id = controller.activation_id();
        let mut session = Self {
            id: Uuid::new_v4(),
            version: 0,
            catalog,
            targets,
            clock,
            current_stage: Stage::FIRST,
            finished: false,
            controller,
            completions_tx,
            completions_rx,
            uncommitted_events: Vec::new(),
        };
        session.record(SessionEventKind::StageActivated(SessionStageActivated {
            stage: Stage::FIRST,
            activation_id,
        }));
        session
    }

    /// Moves to the next stage, or finishes after the last one.
    ///
    /// A no-op once the session is finished.
    pub fn advance(&mut self) -> SessionOutcome {
        if self.finished {
            return SessionOutcome::Idle;
        }
        match self.current_stage.next() {
            Some(next) => {
                self.activate(next);
                info!(stage = %next, session_id = %self.id, "stage advanced");
                SessionOutcome::Advanced(next)
            }
            None => {
                self.record(SessionEventKind::Finished(SessionFinished {
                    stage: self.current_stage,
                }));
                info!(session_id = %self.id, "session finished");
                SessionOutcome::Finished
            }
        }
    }

    /// Returns to the first stage with a fresh controller.
    pub fn reset(&mut self) {
        self.record(SessionEventKind::Reset(SessionReset {
            from_stage: self.current_stage,
        }));
        self.activate(Stage::FIRST);
        info!(session_id = %self.id, "session reset");
    }

    /// Forwards a pointer event to the active controller.
    pub fn apply_gesture(&mut self, input: GestureInput) -> SessionOutcome {
        self.controller.apply_gesture(input);
        self.drain_completions()
    }

    /// Forwards elapsed time to the active controller.
    pub fn tick(&mut self, elapsed: Duration) -> SessionOutcome {
        self.controller.tick(elapsed);
        self.drain_completions()
    }

    /// The session identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The current stage. Stays on the last stage once finished.
    #[must_use]
    pub fn current_stage(&self) -> Stage {
        self.current_stage
    }

    /// Whether the last stage has been completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The active controller.
    #[must_use]
    pub fn controller(&self) -> &StageController {
        &self.controller
    }

    fn activate(&mut self, stage: Stage) {
        self.controller = build_controller(
            stage,
            &self.catalog,
            &self.targets,
            &self.clock,
            &self.completions_tx,
        );
        self.record(SessionEventKind::StageActivated(SessionStageActivated {
            stage,
            activation_id: self.controller.activation_id(),
        }));
    }

    fn drain_completions(&mut self) -> SessionOutcome {
        let mut outcome = SessionOutcome::Idle;
        while let Ok(completion) = self.completions_rx.try_recv() {
            if completion.activation_id != self.controller.activation_id() {
                debug!(
                    stage = %completion.stage,
                    activation_id = %completion.activation_id,
                    "stale completion discarded"
                );
                continue;
            }
            self.record(SessionEventKind::StageCompleted(SessionStageCompleted {
                stage: completion.stage,
                activation_id: completion.activation_id,
            }));
            outcome = self.advance();
        }
        outcome
    }

    fn record(&mut self, kind: SessionEventKind) {
        let event = SessionEvent {
            metadata: EventMetadata::next(
                kind.event_type(),
                self.id,
                self.version,
                self.clock.as_ref(),
            ),
            kind,
        };
        self.apply(&event);
        self.uncommitted_events.push(event);
    }
}

fn build_controller(
    stage: Stage,
    catalog: &StageCatalog,
    targets: &TargetBindings,
    clock: &Arc<dyn Clock>,
    completions_tx: &mpsc::UnboundedSender<StageCompletion>,
) -> StageController {
    let tx = completions_tx.clone();
    StageController::activate(
        *catalog.blueprint(stage),
        targets.clone(),
        Arc::clone(clock),
        Box::new(move |completion| {
            // Fails only when the orchestrator has been dropped.
            let _ = tx.send(completion);
        }),
    )
}

impl std::fmt::Debug for SessionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionOrchestrator")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("current_stage", &self.current_stage)
            .field("finished", &self.finished)
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

impl AggregateRoot for SessionOrchestrator {
    type Event = SessionEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            SessionEventKind::StageActivated(activated) => {
                self.current_stage = activated.stage;
            }
            SessionEventKind::StageCompleted(_) => {}
            SessionEventKind::Finished(_) => self.finished = true,
            SessionEventKind::Reset(_) => {
                self.current_stage = Stage::FIRST;
                self.finished = false;
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
        self.controller.clear_uncommitted_events();
    }
}

//! The single reducer behind the event loop.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use diancha_challenge::application::query_handlers::{ChallengeView, challenge_view};
use diancha_challenge::domain::aggregates::{ChallengeOrchestrator, ChallengeOutcome};
use diancha_challenge::domain::commands::ChallengeInput;
use diancha_content::domain::table::ContentTable;
use diancha_core::aggregate::AggregateRoot;
use diancha_core::clock::Clock;
use diancha_core::event::DomainEvent;
use diancha_core::geometry::{Point, PointerSample};
use diancha_core::stage::Stage;
use diancha_gesture::TargetBindings;
use diancha_session::application::query_handlers::{SessionView, session_view};
use diancha_session::domain::aggregates::{SessionOrchestrator, SessionOutcome};
use diancha_stage::domain::blueprint::StageCatalog;
use diancha_stage::domain::commands::GestureInput;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Mode;
use crate::error::AppError;
use crate::script::UiEvent;

/// Everything the event loop can deliver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineInput {
    /// A host event, stamped with its time since playback started.
    Ui {
        /// The event.
        event: UiEvent,
        /// Milliseconds since start.
        at_ms: u64,
    },
    /// A render frame.
    Frame(Duration),
    /// One countdown second.
    ClockSecond,
}

/// Snapshot of whichever orchestrator is active.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EngineView {
    /// Experience mode.
    Experience(SessionView),
    /// Challenge mode.
    Challenge(ChallengeView),
}

enum Active {
    Experience(SessionOrchestrator),
    Challenge(Box<ChallengeOrchestrator>),
}

/// Owns the active orchestrator and routes every input to it.
///
/// Switching mode drops the previous orchestrator together with its
/// controller and completion channel.
pub struct Engine {
    catalog: StageCatalog,
    bindings: TargetBindings,
    content: ContentTable,
    clock: Arc<dyn Clock>,
    challenge_seconds: u32,
    active: Active,
}

impl Engine {
    /// Builds an engine in `mode`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Domain` if the challenge budget is invalid.
    pub fn new(
        mode: Mode,
        bindings: TargetBindings,
        content: ContentTable,
        challenge_seconds: u32,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let catalog = StageCatalog::standard();
        // Built once here so an invalid budget fails at startup.
        let probe = ChallengeOrchestrator::new(
            catalog.clone(),
            bindings.clone(),
            Arc::clone(&clock),
            challenge_seconds,
        )?;
        let active = match mode {
            Mode::Experience => Active::Experience(SessionOrchestrator::new(
                catalog.clone(),
                bindings.clone(),
                Arc::clone(&clock),
            )),
            Mode::Challenge => Active::Challenge(Box::new(probe)),
        };
        let mut engine = Self {
            catalog,
            bindings,
            content,
            clock,
            challenge_seconds,
            active,
        };
        engine.announce_stage();
        engine.publish();
        Ok(engine)
    }

    /// Applies one input.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Domain` if a mode switch cannot build the new
    /// orchestrator.
    pub fn handle(&mut self, input: EngineInput) -> Result<(), AppError> {
        match input {
            EngineInput::Ui {
                event: UiEvent::SwitchMode { mode },
                ..
            } => self.switch_mode(mode)?,
            EngineInput::Ui { event, at_ms } => self.handle_ui(event, at_ms),
            EngineInput::Frame(elapsed) => match &mut self.active {
                Active::Experience(session) => {
                    let outcome = session.tick(elapsed);
                    self.after_session(outcome);
                }
                Active::Challenge(challenge) => {
                    let outcome = challenge.dispatch(ChallengeInput::Frame(elapsed));
                    self.after_challenge(outcome);
                }
            },
            EngineInput::ClockSecond => {
                if let Active::Challenge(challenge) = &mut self.active {
                    challenge.dispatch(ChallengeInput::ClockSecond);
                }
            }
        }
        self.publish();
        Ok(())
    }

    /// The active mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        match self.active {
            Active::Experience(_) => Mode::Experience,
            Active::Challenge(_) => Mode::Challenge,
        }
    }

    /// The active session, in either mode.
    #[must_use]
    pub fn session(&self) -> &SessionOrchestrator {
        match &self.active {
            Active::Experience(session) => session,
            Active::Challenge(challenge) => challenge.session(),
        }
    }

    /// The challenge, when in challenge mode.
    #[must_use]
    pub fn challenge(&self) -> Option<&ChallengeOrchestrator> {
        match &self.active {
            Active::Experience(_) => None,
            Active::Challenge(challenge) => Some(&**challenge),
        }
    }

    /// Snapshot for the presentation layer.
    #[must_use]
    pub fn view(&self) -> EngineView {
        match &self.active {
            Active::Experience(session) => EngineView::Experience(session_view(session)),
            Active::Challenge(challenge) => EngineView::Challenge(challenge_view(challenge)),
        }
    }

    fn switch_mode(&mut self, mode: Mode) -> Result<(), AppError> {
        if mode == self.mode() {
            return Ok(());
        }
        self.active = match mode {
            Mode::Experience => Active::Experience(SessionOrchestrator::new(
                self.catalog.clone(),
                self.bindings.clone(),
                Arc::clone(&self.clock),
            )),
            Mode::Challenge => Active::Challenge(Box::new(ChallengeOrchestrator::new(
                self.catalog.clone(),
                self.bindings.clone(),
                Arc::clone(&self.clock),
                self.challenge_seconds,
            )?)),
        };
        info!(mode = %mode, "mode switched");
        self.announce_stage();
        Ok(())
    }

    fn handle_ui(&mut self, event: UiEvent, at_ms: u64) {
        let gesture = match event {
            UiEvent::Tap { x, y } => Some(GestureInput::Tap(Point::new(x, y))),
            UiEvent::Move { x, y } => Some(GestureInput::Move(PointerSample::new(x, y, at_ms))),
            UiEvent::Release { x, y } => Some(GestureInput::Release(Point::new(x, y))),
            UiEvent::SwitchMode { .. } => None,
            UiEvent::StartChallenge => {
                self.dispatch_challenge(ChallengeInput::Start);
                None
            }
            UiEvent::RestartChallenge => {
                self.dispatch_challenge(ChallengeInput::Restart);
                None
            }
            UiEvent::Reset => {
                match &mut self.active {
                    Active::Experience(session) => {
                        session.reset();
                        self.announce_stage();
                    }
                    Active::Challenge(_) => debug!("reset ignored in challenge mode"),
                }
                None
            }
        };
        let Some(gesture) = gesture else {
            return;
        };
        match &mut self.active {
            Active::Experience(session) => {
                let outcome = session.apply_gesture(gesture);
                self.after_session(outcome);
            }
            Active::Challenge(challenge) => {
                let outcome = challenge.dispatch(ChallengeInput::Gesture(gesture));
                self.after_challenge(outcome);
            }
        }
    }

    fn dispatch_challenge(&mut self, input: ChallengeInput) {
        match &mut self.active {
            Active::Challenge(challenge) => {
                let outcome = challenge.dispatch(input);
                self.after_challenge(outcome);
            }
            Active::Experience(_) => debug!(?input, "challenge input ignored in experience mode"),
        }
    }

    fn after_session(&self, outcome: SessionOutcome) {
        if let SessionOutcome::Advanced(_) = outcome {
            self.announce_stage();
        }
    }

    fn after_challenge(&self, outcome: ChallengeOutcome) {
        if matches!(
            outcome,
            ChallengeOutcome::Started | ChallengeOutcome::Scored(_) | ChallengeOutcome::Restarted
        ) {
            self.announce_stage();
        }
    }

    /// Logs and clears the events the active orchestrator recorded.
    fn publish(&mut self) {
        match &mut self.active {
            Active::Experience(session) => publish_events(session),
            Active::Challenge(challenge) => publish_events(&mut **challenge),
        }
    }

    fn announce_stage(&self) {
        let stage: Stage = self.session().current_stage();
        if let Some(info) = self.content.get(stage) {
            info!(stage = %stage, title = %info.title, "now playing");
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("mode", &self.mode())
            .field("challenge_seconds", &self.challenge_seconds)
            .field("content_version", &self.content.version_hash())
            .finish_non_exhaustive()
    }
}

fn publish_events<A: AggregateRoot>(aggregate: &mut A) {
    for event in aggregate.uncommitted_events() {
        let metadata = event.metadata();
        debug!(
            aggregate_id = %metadata.aggregate_id,
            sequence_number = metadata.sequence_number,
            event_type = event.event_type(),
            payload = %event.to_payload(),
            "domain event"
        );
    }
    aggregate.clear_uncommitted_events();
}

/// Loads the content table override, or the bundled table.
///
/// # Errors
///
/// Returns `AppError::Io` if the override cannot be read and
/// `AppError::Domain` if the table is invalid.
pub async fn load_content(path: Option<&Path>) -> Result<ContentTable, AppError> {
    let table = match path {
        Some(path) => ContentTable::from_yaml(&tokio::fs::read_to_string(path).await?)?,
        None => ContentTable::builtin()?,
    };
    info!(version_hash = table.version_hash(), "content table loaded");
    Ok(table)
}

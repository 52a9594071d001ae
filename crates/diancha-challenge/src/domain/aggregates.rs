//! Aggregate roots for the Challenge context.

use std::sync::Arc;

use diancha_core::aggregate::AggregateRoot;
use diancha_core::clock::Clock;
use diancha_core::error::DomainError;
use diancha_core::event::EventMetadata;
use diancha_core::stage::Stage;
use diancha_gesture::TargetBindings;
use diancha_session::domain::aggregates::{SessionOrchestrator, SessionOutcome};
use diancha_stage::domain::blueprint::StageCatalog;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::commands::ChallengeInput;
use super::events::{
    ChallengeEnded, ChallengeEvent, ChallengeEventKind, ChallengeRestarted, ChallengeStarted,
    CountdownTicked, EndReason, StageScored,
};
use super::scoring::{Rank, stage_points};

/// Phase of a challenge round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeState {
    /// Waiting for the player to start.
    Intro,
    /// Countdown running.
    Playing,
    /// Round over; only a restart leaves this state.
    Result,
}

/// What a dispatched input did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// Not valid in the current state.
    Ignored,
    /// Forwarded to the session without completing a stage.
    Forwarded,
    /// The round started.
    Started,
    /// The countdown moved.
    Ticked,
    /// A stage completed and scored.
    Scored(u32),
    /// The round ended.
    Ended(EndReason),
    /// Back to the intro.
    Restarted,
}

/// Countdown, score and session of a challenge round.
///
/// Every input goes through [`ChallengeOrchestrator::dispatch`], so a
/// countdown expiry and a stage completion arriving together are resolved
/// by dispatch order.
pub struct ChallengeOrchestrator {
    id: Uuid,
    version: i64,
    clock: Arc<dyn Clock>,
    budget_seconds: u32,
    state: ChallengeState,
    time_remaining: u32,
    score: u32,
    end_reason: Option<EndReason>,
    rank: Option<Rank>,
    session: SessionOrchestrator,
    uncommitted_events: Vec<ChallengeEvent>,
}

impl ChallengeOrchestrator {
    /// Creates a challenge in the intro state.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `budget_seconds` is zero.
    pub fn new(
        catalog: StageCatalog,
        targets: TargetBindings,
        clock: Arc<dyn Clock>,
        budget_seconds: u32,
    ) -> Result<Self, DomainError> {
        if budget_seconds == 0 {
            return Err(DomainError::Validation(
                "challenge time budget must be at least one second".to_owned(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            version: 0,
            session: SessionOrchestrator::new(catalog, targets, Arc::clone(&clock)),
            clock,
            budget_seconds,
            state: ChallengeState::Intro,
            time_remaining: budget_seconds,
            score: 0,
            end_reason: None,
            rank: None,
            uncommitted_events: Vec::new(),
        })
    }

    /// The single entry point for every input.
    pub fn dispatch(&mut self, input: ChallengeInput) -> ChallengeOutcome {
        match (self.state, input) {
            (ChallengeState::Intro, ChallengeInput::Start) => {
                self.session.reset();
                self.record(ChallengeEventKind::ChallengeStarted(ChallengeStarted {
                    budget_seconds: self.budget_seconds,
                }));
                info!(
                    challenge_id = %self.id,
                    time_remaining = self.time_remaining,
                    "challenge started"
                );
                ChallengeOutcome::Started
            }
            (ChallengeState::Playing, ChallengeInput::ClockSecond) => {
                self.record(ChallengeEventKind::CountdownTicked(CountdownTicked {
                    time_remaining: self.time_remaining.saturating_sub(1),
                }));
                if self.time_remaining == 0 {
                    self.end(EndReason::TimeExpired)
                } else {
                    ChallengeOutcome::Ticked
                }
            }
            (ChallengeState::Playing, ChallengeInput::Gesture(gesture)) => {
                let stage = self.session.current_stage();
                let outcome = self.session.apply_gesture(gesture);
                self.absorb(stage, outcome)
            }
            (ChallengeState::Playing, ChallengeInput::Frame(elapsed)) => {
                let stage = self.session.current_stage();
                let outcome = self.session.tick(elapsed);
                self.absorb(stage, outcome)
            }
            (ChallengeState::Result, ChallengeInput::Restart) => {
                self.session.reset();
                self.record(ChallengeEventKind::ChallengeRestarted(ChallengeRestarted {
                    budget_seconds: self.budget_seconds,
                }));
                info!(challenge_id = %self.id, "challenge restarted");
                ChallengeOutcome::Restarted
            }
            _ => ChallengeOutcome::Ignored,
        }
    }

    /// The challenge identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current phase.
    #[must_use]
    pub fn state(&self) -> ChallengeState {
        self.state
    }

    /// Seconds left on the countdown.
    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    /// Countdown length of a round.
    #[must_use]
    pub fn budget_seconds(&self) -> u32 {
        self.budget_seconds
    }

    /// Points so far.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Why the round ended, once in `Result`.
    #[must_use]
    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    /// Rank earned, once in `Result`.
    #[must_use]
    pub fn rank(&self) -> Option<Rank> {
        self.rank
    }

    /// The wrapped session.
    #[must_use]
    pub fn session(&self) -> &SessionOrchestrator {
        &self.session
    }

    fn absorb(&mut self, stage: Stage, outcome: SessionOutcome) -> ChallengeOutcome {
        match outcome {
            SessionOutcome::Idle => ChallengeOutcome::Forwarded,
            SessionOutcome::Advanced(_) => self.award(stage),
            SessionOutcome::Finished => {
                self.award(stage);
                self.end(EndReason::SessionFinished)
            }
        }
    }

    fn award(&mut self, stage: Stage) -> ChallengeOutcome {
        let points = stage_points(self.time_remaining);
        self.record(ChallengeEventKind::StageScored(StageScored {
            stage,
            points,
            time_remaining: self.time_remaining,
            score: self.score.saturating_add(points),
        }));
        info!(
            challenge_id = %self.id,
            stage = %stage,
            points,
            score = self.score,
            time_remaining = self.time_remaining,
            "stage scored"
        );
        ChallengeOutcome::Scored(points)
    }

    fn end(&mut self, reason: EndReason) -> ChallengeOutcome {
        let rank = Rank::for_score(self.score);
        self.record(ChallengeEventKind::ChallengeEnded(ChallengeEnded {
            reason,
            score: self.score,
            rank,
        }));
        info!(
            challenge_id = %self.id,
            reason = ?reason,
            score = self.score,
            rank = %rank,
            "challenge ended"
        );
        ChallengeOutcome::Ended(reason)
    }

    fn record(&mut self, kind: ChallengeEventKind) {
        let event = ChallengeEvent {
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

    fn restore_round(&mut self, budget_seconds: u32) {
        self.time_remaining = budget_seconds;
        self.score = 0;
        self.end_reason = None;
        self.rank = None;
    }
}

impl std::fmt::Debug for ChallengeOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChallengeOrchestrator")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("state", &self.state)
            .field("time_remaining", &self.time_remaining)
            .field("score", &self.score)
            .field("end_reason", &self.end_reason)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl AggregateRoot for ChallengeOrchestrator {
    type Event = ChallengeEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            ChallengeEventKind::ChallengeStarted(started) => {
                self.restore_round(started.budget_seconds);
                self.state = ChallengeState::Playing;
            }
            ChallengeEventKind::CountdownTicked(ticked) => {
                self.time_remaining = ticked.time_remaining.min(self.time_remaining);
            }
            ChallengeEventKind::StageScored(scored) => {
                self.score = scored.score.max(self.score);
            }
            ChallengeEventKind::ChallengeEnded(ended) => {
                self.state = ChallengeState::Result;
                self.end_reason = Some(ended.reason);
                self.rank = Some(ended.rank);
            }
            ChallengeEventKind::ChallengeRestarted(restarted) => {
                self.restore_round(restarted.budget_seconds);
                self.state = ChallengeState::Intro;
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
        self.session.clear_uncommitted_events();
    }
}

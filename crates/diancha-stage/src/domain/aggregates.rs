//! Aggregate roots for the Stage interaction context.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use diancha_core::aggregate::AggregateRoot;
use diancha_core::clock::Clock;
use diancha_core::event::EventMetadata;
use diancha_core::stage::Stage;
use diancha_gesture::sampler::GestureSampler;
use diancha_gesture::{Accumulation, TargetBindings};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::blueprint::{DiscreteTrigger, GesturePolicy, Prerequisite, StageBlueprint};
use super::commands::GestureInput;
use super::events::{
    CompletionLatched, GestureEngaged, StageActivated, StageArmed, StageEvent, StageEventKind,
    StageSettled, TargetReached,
};

/// Lifecycle of one stage activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    /// Waiting for the prerequisite gesture.
    NotStarted,
    /// Prerequisite met; gestures accepted.
    Armed,
    /// At least one gesture accepted.
    InProgress,
    /// Latched; the settle window is running and gestures are ignored.
    Settling,
    /// Terminal. The completion callback has run.
    Complete,
}

/// Payload handed to the completion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageCompletion {
    /// The completed stage.
    pub stage: Stage,
    /// The activation that completed.
    pub activation_id: Uuid,
    /// The settle window that preceded the callback.
    pub settle: Duration,
}

/// Invoked exactly once when an activation completes.
pub type CompletionCallback = Box<dyn FnOnce(StageCompletion) + Send + Sync>;

/// What a single input or tick did to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageSignal {
    /// Nothing changed.
    Ignored,
    /// The prerequisite was met.
    Armed,
    /// The policy accepted the input.
    Progressed,
    /// Progress is full; the closing gesture is still needed.
    Ready,
    /// Progress reached its target; the settle window started.
    Latched,
    /// The activation completed and the callback ran.
    Completed,
}

enum DiscreteStep {
    Count,
    PickUp,
    Nothing,
}

/// Runs one activation of one stage.
pub struct StageController {
    id: Uuid,
    version: i64,
    blueprint: StageBlueprint,
    targets: TargetBindings,
    clock: Arc<dyn Clock>,
    state: StageState,
    sampler: GestureSampler,
    carrying: bool,
    awaiting_finish: bool,
    settle_remaining: Duration,
    on_complete: Option<CompletionCallback>,
    uncommitted_events: Vec<StageEvent>,
}

impl StageController {
    /// Activates `blueprint` with progress 0.
    ///
    /// The controller starts `NotStarted` when the blueprint has a
    /// prerequisite and `Armed` otherwise.
    #[must_use]
    pub fn activate(
        blueprint: StageBlueprint,
        targets: TargetBindings,
        clock: Arc<dyn Clock>,
        on_complete: CompletionCallback,
    ) -> Self {
        let mut controller = Self {
            id: Uuid::new_v4(),
            version: 0,
            sampler: blueprint.policy.sampler(),
            settle_remaining: blueprint.settle,
            blueprint,
            targets,
            clock,
            state: StageState::NotStarted,
            carrying: false,
            awaiting_finish: false,
            on_complete: Some(on_complete),
            uncommitted_events: Vec::new(),
        };
        controller.record(StageEventKind::StageActivated(StageActivated {
            stage: blueprint.stage,
            activation_id: controller.id,
            armed: blueprint.prerequisite.is_none(),
        }));
        controller
    }

    /// Feeds one pointer event.
    pub fn apply_gesture(&mut self, input: GestureInput) -> StageSignal {
        match self.state {
            StageState::NotStarted => {
                if self.prerequisite_met(input) {
                    self.record(StageEventKind::StageArmed(StageArmed {
                        stage: self.blueprint.stage,
                    }));
                    if self.sampler_engaged() {
                        self.record(StageEventKind::GestureEngaged(GestureEngaged {
                            stage: self.blueprint.stage,
                        }));
                    }
                    StageSignal::Armed
                } else if self.engage_early(input) {
                    debug!(stage = %self.blueprint.stage, "engaged before prerequisite");
                    StageSignal::Progressed
                } else {
                    StageSignal::Ignored
                }
            }
            StageState::Armed | StageState::InProgress if self.awaiting_finish => {
                match self.blueprint.finish {
                    Some(trigger) if trigger_hits(trigger, input, &self.targets) => self.latch(),
                    _ => StageSignal::Ignored,
                }
            }
            StageState::Armed | StageState::InProgress => {
                let accumulation = self.route(input);
                self.absorb(accumulation)
            }
            StageState::Settling | StageState::Complete => StageSignal::Ignored,
        }
    }

    /// Advances time: timed accumulation while in progress, the settle
    /// countdown while settling.
    pub fn tick(&mut self, elapsed: Duration) -> StageSignal {
        match self.state {
            StageState::InProgress => {
                let accumulation = match &mut self.sampler {
                    GestureSampler::Timed(timed) => timed.tick(elapsed),
                    _ => Accumulation::Rejected,
                };
                self.absorb(accumulation)
            }
            StageState::Settling => {
                self.settle_remaining = self.settle_remaining.saturating_sub(elapsed);
                if self.settle_remaining.is_zero() {
                    self.complete();
                    StageSignal::Completed
                } else {
                    StageSignal::Ignored
                }
            }
            StageState::NotStarted | StageState::Armed | StageState::Complete => {
                StageSignal::Ignored
            }
        }
    }

    /// Identifier of this activation.
    #[must_use]
    pub fn activation_id(&self) -> Uuid {
        self.id
    }

    /// The stage being played.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.blueprint.stage
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> StageState {
        self.state
    }

    /// Progress in `[0, 100]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.sampler.progress()
    }

    /// Whether a carry trigger has picked something up.
    #[must_use]
    pub fn carrying(&self) -> bool {
        self.carrying
    }

    /// Time left in the settle window.
    #[must_use]
    pub fn settle_remaining(&self) -> Duration {
        self.settle_remaining
    }

    /// Whether progress is full and the closing gesture is awaited.
    #[must_use]
    pub fn awaiting_finish(&self) -> bool {
        self.awaiting_finish
    }

    fn prerequisite_met(&self, input: GestureInput) -> bool {
        match (self.blueprint.prerequisite, input) {
            (Some(Prerequisite::Tap(zone)), GestureInput::Tap(point))
            | (Some(Prerequisite::Release(zone)), GestureInput::Release(point)) => {
                self.targets.hits(point, zone)
            }
            _ => false,
        }
    }

    fn sampler_engaged(&self) -> bool {
        matches!(&self.sampler, GestureSampler::Timed(timed) if timed.is_engaged())
    }

    fn engage_early(&mut self, input: GestureInput) -> bool {
        match (self.blueprint.policy, &mut self.sampler, input) {
            (
                GesturePolicy::Timed {
                    engage,
                    engage_early: true,
                    ..
                },
                GestureSampler::Timed(timed),
                GestureInput::Release(point),
            ) => self.targets.hits(point, engage) && timed.engage(),
            _ => false,
        }
    }

    fn route(&mut self, input: GestureInput) -> Accumulation {
        let targets = &self.targets;
        match (self.blueprint.policy, &mut self.sampler) {
            (GesturePolicy::Displacement { .. }, GestureSampler::Displacement(sampler)) => {
                match input {
                    GestureInput::Move(sample) => sampler.sample(sample.point),
                    GestureInput::Release(_) => {
                        sampler.release();
                        Accumulation::Rejected
                    }
                    GestureInput::Tap(_) => Accumulation::Rejected,
                }
            }
            (GesturePolicy::Angular { pivot, .. }, GestureSampler::Angular(sampler)) => {
                match input {
                    GestureInput::Move(sample) => targets
                        .rect(pivot)
                        .map_or(Accumulation::Rejected, |rect| {
                            sampler.sample(rect.center(), sample.point)
                        }),
                    GestureInput::Release(_) => {
                        sampler.release();
                        Accumulation::Rejected
                    }
                    GestureInput::Tap(_) => Accumulation::Rejected,
                }
            }
            (GesturePolicy::Discrete { trigger, .. }, GestureSampler::Discrete(counter)) => {
                match discrete_step(trigger, input, targets, &mut self.carrying) {
                    DiscreteStep::Count => counter.register(),
                    DiscreteStep::PickUp => Accumulation::Accepted,
                    DiscreteStep::Nothing => Accumulation::Rejected,
                }
            }
            (GesturePolicy::Timed { engage, .. }, GestureSampler::Timed(timed)) => match input {
                GestureInput::Release(point) if targets.hits(point, engage) && timed.engage() => {
                    Accumulation::Accepted
                }
                _ => Accumulation::Rejected,
            },
            _ => Accumulation::Rejected,
        }
    }

    fn absorb(&mut self, accumulation: Accumulation) -> StageSignal {
        if accumulation == Accumulation::Rejected {
            return StageSignal::Ignored;
        }
        if self.state == StageState::Armed {
            self.record(StageEventKind::GestureEngaged(GestureEngaged {
                stage: self.blueprint.stage,
            }));
        }
        match accumulation {
            Accumulation::Completed if self.blueprint.finish.is_some() => {
                self.record(StageEventKind::TargetReached(TargetReached {
                    stage: self.blueprint.stage,
                }));
                StageSignal::Ready
            }
            Accumulation::Completed => self.latch(),
            _ => StageSignal::Progressed,
        }
    }

    fn latch(&mut self) -> StageSignal {
        let settle_ms = u64::try_from(self.blueprint.settle.as_millis()).unwrap_or(u64::MAX);
        self.record(StageEventKind::CompletionLatched(CompletionLatched {
            stage: self.blueprint.stage,
            settle_ms,
        }));
        if self.settle_remaining.is_zero() {
            self.complete();
            StageSignal::Completed
        } else {
            StageSignal::Latched
        }
    }

    fn complete(&mut self) {
        self.record(StageEventKind::StageSettled(StageSettled {
            stage: self.blueprint.stage,
        }));
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(StageCompletion {
                stage: self.blueprint.stage,
                activation_id: self.id,
                settle: self.blueprint.settle,
            });
        }
    }

    fn record(&mut self, kind: StageEventKind) {
        let event = StageEvent {
            metadata: EventMetadata::next(
                kind.event_type(),
                self.id,
                self.version,
                self.clock.as_ref(),
            ),
            kind,
        };
        debug!(
            stage = %self.blueprint.stage,
            activation_id = %self.id,
            event_type = %event.metadata.event_type,
            "stage event recorded"
        );
        self.apply(&event);
        self.uncommitted_events.push(event);
    }
}

fn discrete_step(
    trigger: DiscreteTrigger,
    input: GestureInput,
    targets: &TargetBindings,
    carrying: &mut bool,
) -> DiscreteStep {
    if let (
        DiscreteTrigger::Carry {
            source,
            destination,
        },
        GestureInput::Release(point),
    ) = (trigger, input)
    {
        if *carrying && targets.hits(point, destination) {
            *carrying = false;
            return DiscreteStep::Count;
        }
        if !*carrying && targets.hits(point, source) {
            *carrying = true;
            return DiscreteStep::PickUp;
        }
        return DiscreteStep::Nothing;
    }
    if trigger_hits(trigger, input, targets) {
        DiscreteStep::Count
    } else {
        DiscreteStep::Nothing
    }
}

/// Whether `input` is one unit of a non-carry trigger.
fn trigger_hits(trigger: DiscreteTrigger, input: GestureInput, targets: &TargetBindings) -> bool {
    match (trigger, input) {
        (DiscreteTrigger::Tap(zone), GestureInput::Tap(point))
        | (DiscreteTrigger::ReleaseOn(zone), GestureInput::Release(point)) => {
            targets.hits(point, zone)
        }
        (DiscreteTrigger::Hover(zone), GestureInput::Move(sample)) => {
            targets.hits(sample.point, zone)
        }
        (DiscreteTrigger::TapAnywhere, GestureInput::Tap(point)) => point.is_finite(),
        _ => false,
    }
}

impl fmt::Debug for StageController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageController")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("stage", &self.blueprint.stage)
            .field("state", &self.state)
            .field("progress", &self.sampler.progress())
            .field("carrying", &self.carrying)
            .field("awaiting_finish", &self.awaiting_finish)
            .field("settle_remaining", &self.settle_remaining)
            .finish_non_exhaustive()
    }
}

impl AggregateRoot for StageController {
    type Event = StageEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            StageEventKind::StageActivated(activated) => {
                self.state = if activated.armed {
                    StageState::Armed
                } else {
                    StageState::NotStarted
                };
                self.sampler = self.blueprint.policy.sampler();
                self.carrying = false;
                self.awaiting_finish = false;
                self.settle_remaining = self.blueprint.settle;
            }
            StageEventKind::StageArmed(_) => self.state = StageState::Armed,
            StageEventKind::GestureEngaged(_) => self.state = StageState::InProgress,
            StageEventKind::TargetReached(_) => self.awaiting_finish = true,
            StageEventKind::CompletionLatched(latched) => {
                self.state = StageState::Settling;
                self.awaiting_finish = false;
                self.settle_remaining = Duration::from_millis(latched.settle_ms);
            }
            StageEventKind::StageSettled(_) => {
                self.state = StageState::Complete;
                self.settle_remaining = Duration::ZERO;
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use diancha_core::event::DomainEvent;
    use diancha_core::geometry::{Point, PointerSample};
    use diancha_core::target::Target;
    use diancha_test_support::{FixedClock, center_of, orbit, standard_bindings, zigzag};

    use super::*;
    use crate::domain::blueprint::StageCatalog;

    type Completions = Arc<Mutex<Vec<StageCompletion>>>;

    const FRAME: Duration = Duration::from_millis(50);

    fn activate(stage: Stage) -> (StageController, Completions) {
        let completions: Completions = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&completions);
        let controller = StageController::activate(
            StageBlueprint::standard(stage),
            standard_bindings(),
            Arc::new(FixedClock::standard()),
            Box::new(move |completion| sink.lock().unwrap().push(completion)),
        );
        (controller, completions)
    }

    fn tap(target: Target) -> GestureInput {
        GestureInput::Tap(center_of(target))
    }

    fn release(target: Target) -> GestureInput {
        GestureInput::Release(center_of(target))
    }

    fn drag(point: Point) -> GestureInput {
        GestureInput::Move(PointerSample {
            point,
            timestamp_ms: 0,
        })
    }

    #[test]
    fn test_activate_records_activation_with_zero_progress() {
        let (controller, _) = activate(Stage::Roasting);

        assert_eq!(controller.state(), StageState::NotStarted);
        assert!((controller.progress() - 0.0).abs() < f64::EPSILON);
        assert_eq!(controller.version(), 1);
        let events = controller.uncommitted_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "stage.activated");
        assert_eq!(events[0].metadata.aggregate_id, controller.activation_id());
        assert_eq!(events[0].metadata.sequence_number, 1);
        assert_eq!(events[0].metadata.occurred_at, FixedClock::standard().0);
    }

    #[test]
    fn test_stage_without_prerequisite_starts_armed() {
        let (controller, _) = activate(Stage::Boxing);

        assert_eq!(controller.state(), StageState::Armed);
    }

    #[test]
    fn test_not_started_ignores_everything_but_the_prerequisite() {
        let (mut controller, _) = activate(Stage::Roasting);

        assert_eq!(
            controller.apply_gesture(release(Target::Stove)),
            StageSignal::Ignored
        );
        assert_eq!(
            controller.apply_gesture(GestureInput::Tap(Point::new(50.0, 50.0))),
            StageSignal::Ignored
        );
        assert_eq!(controller.tick(Duration::from_secs(10)), StageSignal::Ignored);
        assert_eq!(controller.state(), StageState::NotStarted);
    }

    #[test]
    fn test_roasting_heats_over_time_then_settles_once() {
        let (mut controller, completions) = activate(Stage::Roasting);

        assert_eq!(controller.apply_gesture(tap(Target::Stove)), StageSignal::Armed);
        assert_eq!(controller.tick(FRAME), StageSignal::Ignored);
        assert_eq!(
            controller.apply_gesture(release(Target::Stove)),
            StageSignal::Progressed
        );
        assert_eq!(controller.state(), StageState::InProgress);

        for _ in 0..39 {
            assert_eq!(controller.tick(FRAME), StageSignal::Progressed);
        }
        assert!((controller.progress() - 97.5).abs() < 1e-9);
        assert_eq!(controller.tick(FRAME), StageSignal::Latched);
        assert_eq!(controller.state(), StageState::Settling);

        assert_eq!(
            controller.tick(Duration::from_millis(999)),
            StageSignal::Ignored
        );
        assert!(completions.lock().unwrap().is_empty());
        assert_eq!(controller.tick(Duration::from_millis(1)), StageSignal::Completed);
        assert_eq!(controller.state(), StageState::Complete);

        let fired = completions.lock().unwrap();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].stage, Stage::Roasting);
        assert_eq!(fired[0].activation_id, controller.activation_id());
        assert_eq!(fired[0].settle, Duration::from_millis(1000));
    }

    #[test]
    fn test_grinding_needs_six_taps_on_the_roller() {
        let (mut controller, completions) = activate(Stage::Grinding);

        assert_eq!(
            controller.apply_gesture(GestureInput::Release(Point::new(500.0, 600.0))),
            StageSignal::Armed
        );
        assert_eq!(
            controller.apply_gesture(GestureInput::Tap(Point::new(100.0, 100.0))),
            StageSignal::Ignored
        );
        for _ in 0..5 {
            assert_eq!(
                controller.apply_gesture(tap(Target::Roller)),
                StageSignal::Progressed
            );
        }
        assert_eq!(controller.state(), StageState::InProgress);
        assert_eq!(controller.apply_gesture(tap(Target::Roller)), StageSignal::Latched);
        assert!((controller.progress() - 100.0).abs() < f64::EPSILON);

        assert_eq!(
            controller.tick(Duration::from_millis(1200)),
            StageSignal::Completed
        );
        assert_eq!(completions.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_milling_completes_after_two_forward_turns() {
        let (mut controller, _) = activate(Stage::Milling);
        let pivot = center_of(Target::Mill);

        assert_eq!(controller.apply_gesture(release(Target::Mill)), StageSignal::Armed);

        let signals: Vec<StageSignal> = orbit(pivot, 100.0, 30.0, 900.0)
            .into_iter()
            .map(|point| controller.apply_gesture(drag(point)))
            .collect();

        assert_eq!(signals[0], StageSignal::Progressed);
        assert_eq!(
            signals
                .iter()
                .filter(|signal| **signal == StageSignal::Latched)
                .count(),
            1
        );
        assert_eq!(controller.state(), StageState::Settling);
    }

    #[test]
    fn test_milling_ignores_backward_rotation() {
        let (mut controller, _) = activate(Stage::Milling);
        let pivot = center_of(Target::Mill);
        controller.apply_gesture(release(Target::Mill));

        let mut backward = orbit(pivot, 100.0, 30.0, 720.0);
        backward.reverse();
        for point in backward {
            controller.apply_gesture(drag(point));
        }

        assert_eq!(controller.state(), StageState::InProgress);
        assert!((controller.progress() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_boxing_counts_only_completed_carries() {
        let (mut controller, completions) = activate(Stage::Boxing);

        assert_eq!(
            controller.apply_gesture(release(Target::TeaBox)),
            StageSignal::Ignored
        );
        for _ in 0..2 {
            assert_eq!(
                controller.apply_gesture(release(Target::Saucer)),
                StageSignal::Progressed
            );
            assert!(controller.carrying());
            assert_eq!(
                controller.apply_gesture(release(Target::TeaBox)),
                StageSignal::Progressed
            );
            assert!(!controller.carrying());
        }
        controller.apply_gesture(release(Target::Saucer));

        assert_eq!(
            controller.apply_gesture(release(Target::TeaBox)),
            StageSignal::Ready
        );
        assert!(controller.awaiting_finish());
        assert!((controller.progress() - 100.0).abs() < f64::EPSILON);
        assert!(completions.lock().unwrap().is_empty());

        assert_eq!(
            controller.apply_gesture(tap(Target::Saucer)),
            StageSignal::Completed
        );
        assert_eq!(controller.state(), StageState::Complete);
        assert_eq!(completions.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_boxing_waits_for_the_confirm_tap() {
        let (mut controller, completions) = activate(Stage::Boxing);
        for _ in 0..3 {
            controller.apply_gesture(release(Target::Saucer));
            controller.apply_gesture(release(Target::TeaBox));
        }

        assert_eq!(
            controller.apply_gesture(release(Target::Saucer)),
            StageSignal::Ignored
        );
        assert_eq!(controller.tick(Duration::from_secs(5)), StageSignal::Ignored);
        assert_eq!(controller.state(), StageState::InProgress);
        assert!(!controller.carrying());
        assert!(completions.lock().unwrap().is_empty());
    }

    #[test]
    fn test_boiling_accepts_the_kettle_before_the_fire() {
        let (mut controller, completions) = activate(Stage::Boiling);
        let under_stove = Point::new(500.0, 560.0);

        assert_eq!(
            controller.apply_gesture(GestureInput::Release(under_stove)),
            StageSignal::Progressed
        );
        assert_eq!(controller.state(), StageState::NotStarted);
        assert_eq!(controller.tick(Duration::from_secs(10)), StageSignal::Ignored);
        assert!((controller.progress() - 0.0).abs() < f64::EPSILON);

        assert_eq!(controller.apply_gesture(tap(Target::Stove)), StageSignal::Armed);
        assert_eq!(controller.state(), StageState::InProgress);
        for _ in 0..99 {
            assert_eq!(controller.tick(FRAME), StageSignal::Progressed);
        }
        assert_eq!(controller.tick(FRAME), StageSignal::Latched);
        assert_eq!(
            controller.tick(Duration::from_millis(1500)),
            StageSignal::Completed
        );
        assert_eq!(completions.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_boiling_accepts_the_kettle_after_the_fire() {
        let (mut controller, _) = activate(Stage::Boiling);

        assert_eq!(controller.apply_gesture(tap(Target::Stove)), StageSignal::Armed);
        assert_eq!(controller.state(), StageState::Armed);
        assert_eq!(
            controller.apply_gesture(GestureInput::Release(Point::new(500.0, 560.0))),
            StageSignal::Progressed
        );
        assert_eq!(controller.state(), StageState::InProgress);
    }

    #[test]
    fn test_boiling_ignores_a_kettle_dropped_beside_the_stove() {
        let (mut controller, _) = activate(Stage::Boiling);
        controller.apply_gesture(tap(Target::Stove));

        assert_eq!(
            controller.apply_gesture(GestureInput::Release(Point::new(380.0, 560.0))),
            StageSignal::Ignored
        );
        assert_eq!(controller.state(), StageState::Armed);
    }

    #[test]
    fn test_warming_completes_only_when_the_warmed_cup_is_emptied() {
        let (mut controller, completions) = activate(Stage::Warming);

        assert_eq!(
            controller.apply_gesture(tap(Target::Cup)),
            StageSignal::Ignored
        );
        assert_eq!(
            controller.apply_gesture(release(Target::Cup)),
            StageSignal::Progressed
        );
        for _ in 0..49 {
            assert_eq!(controller.tick(FRAME), StageSignal::Progressed);
        }
        assert_eq!(controller.tick(FRAME), StageSignal::Ready);
        for _ in 0..40 {
            assert_eq!(controller.tick(FRAME), StageSignal::Ignored);
        }
        assert_eq!(controller.state(), StageState::InProgress);
        assert!(completions.lock().unwrap().is_empty());

        assert_eq!(
            controller.apply_gesture(GestureInput::Tap(Point::new(900.0, 100.0))),
            StageSignal::Ignored
        );
        assert_eq!(controller.apply_gesture(tap(Target::Cup)), StageSignal::Latched);
        assert_eq!(
            controller.tick(Duration::from_millis(1500)),
            StageSignal::Completed
        );
        assert_eq!(completions.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_pouring_ignores_gestures_while_settling() {
        let (mut controller, completions) = activate(Stage::Pouring);

        assert_eq!(
            controller.apply_gesture(drag(Point::new(600.0, 100.0))),
            StageSignal::Ignored
        );
        assert_eq!(
            controller.apply_gesture(drag(center_of(Target::Cup))),
            StageSignal::Latched
        );
        assert_eq!(
            controller.apply_gesture(drag(center_of(Target::Cup))),
            StageSignal::Ignored
        );
        assert_eq!(controller.tick(Duration::from_secs(3)), StageSignal::Ignored);
        assert_eq!(controller.settle_remaining(), Duration::from_millis(500));
        assert_eq!(
            controller.tick(Duration::from_secs(1)),
            StageSignal::Completed
        );
        assert_eq!(completions.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_whisking_accumulates_stroke_distance() {
        let (mut controller, _) = activate(Stage::Whisking);
        let strokes = zigzag(Point::new(400.0, 400.0), Point::new(600.0, 400.0), 5);

        let signals: Vec<StageSignal> = strokes
            .into_iter()
            .map(|point| controller.apply_gesture(drag(point)))
            .collect();

        assert_eq!(signals[0], StageSignal::Ignored);
        assert_eq!(signals[4], StageSignal::Progressed);
        assert_eq!(signals[5], StageSignal::Latched);
    }

    #[test]
    fn test_whisking_release_forgets_previous_sample() {
        let (mut controller, _) = activate(Stage::Whisking);

        controller.apply_gesture(drag(Point::new(400.0, 400.0)));
        controller.apply_gesture(GestureInput::Release(Point::new(400.0, 400.0)));

        assert_eq!(
            controller.apply_gesture(drag(Point::new(900.0, 400.0))),
            StageSignal::Ignored
        );
        assert!((controller.progress() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tasting_needs_a_taste_then_a_confirm_tap() {
        let (mut controller, completions) = activate(Stage::Tasting);

        assert_eq!(
            controller.apply_gesture(GestureInput::Tap(Point::new(5.0, 5.0))),
            StageSignal::Ready
        );
        assert!(completions.lock().unwrap().is_empty());
        assert_eq!(
            controller.apply_gesture(GestureInput::Tap(Point::new(600.0, 20.0))),
            StageSignal::Completed
        );

        let event_types: Vec<&str> = controller
            .uncommitted_events()
            .iter()
            .map(DomainEvent::event_type)
            .collect();
        assert_eq!(
            event_types,
            vec![
                "stage.activated",
                "stage.gesture_engaged",
                "stage.target_reached",
                "stage.completion_latched",
                "stage.settled"
            ]
        );
        assert_eq!(completions.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_completion_fires_once_whatever_follows() {
        let (mut controller, completions) = activate(Stage::Tasting);

        for _ in 0..5 {
            controller.apply_gesture(GestureInput::Tap(Point::new(5.0, 5.0)));
            controller.tick(Duration::from_secs(5));
        }

        assert_eq!(completions.lock().unwrap().len(), 1);
        assert_eq!(controller.state(), StageState::Complete);
    }

    #[test]
    fn test_clear_uncommitted_events_keeps_version() {
        let (mut controller, _) = activate(Stage::Boxing);

        controller.clear_uncommitted_events();

        assert!(controller.uncommitted_events().is_empty());
        assert_eq!(controller.version(), 1);
    }

    #[test]
    fn test_progress_is_bounded_and_monotonic_for_every_stage() {
        let catalog = StageCatalog::standard();
        let mut inputs: Vec<GestureInput> = Vec::new();
        for target in Target::ALL {
            inputs.push(tap(target));
            inputs.push(release(target));
        }
        inputs.extend(orbit(center_of(Target::Mill), 80.0, 45.0, 1080.0).into_iter().map(drag));
        inputs.extend(
            zigzag(Point::new(100.0, 100.0), Point::new(900.0, 600.0), 12)
                .into_iter()
                .map(drag),
        );
        inputs.push(GestureInput::Tap(Point::new(f64::NAN, 3.0)));
        inputs.push(drag(Point::new(f64::INFINITY, 0.0)));

        for stage in Stage::ALL {
            let completions: Completions = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&completions);
            let mut controller = StageController::activate(
                *catalog.blueprint(stage),
                standard_bindings(),
                Arc::new(FixedClock::standard()),
                Box::new(move |completion| sink.lock().unwrap().push(completion)),
            );
            let mut last = controller.progress();
            for round in 0..3 {
                for input in &inputs {
                    controller.apply_gesture(*input);
                    controller.tick(Duration::from_millis(40 * (round + 1)));
                    let progress = controller.progress();
                    assert!((0.0..=100.0).contains(&progress), "{stage}: {progress}");
                    assert!(progress >= last, "{stage}: {progress} < {last}");
                    last = progress;
                }
            }
            assert!(completions.lock().unwrap().len() <= 1, "{stage}");
        }
    }
}

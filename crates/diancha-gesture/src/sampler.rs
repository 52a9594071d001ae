//! Gesture samplers: turn pointer streams into bounded progress.
//!
//! Every sampler feeds an [`Accumulator`]. The accumulator owns the
//! [`CompletionLatch`], which is set inside the same call that makes the
//! amount reach its target, so a burst of samples can never report
//! completion twice.

use std::time::Duration;

use diancha_core::geometry::Point;

/// Default noise floor of the displacement policy, in screen units.
pub const DEFAULT_NOISE_FLOOR: f64 = 0.3;

/// Default angular travel of the rotary policy: two full turns.
pub const DEFAULT_TARGET_TRAVEL_DEGREES: f64 = 720.0;

/// What a single contribution did to an accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accumulation {
    /// Nothing changed.
    Rejected,
    /// The sample was used but the target is not reached.
    Accepted,
    /// The target was reached by this sample. Reported once.
    Completed,
}

/// One-shot latch guarding the completion side effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionLatch {
    fired: bool,
}

impl CompletionLatch {
    /// Sets the latch. Returns `true` only for the first call.
    pub fn try_fire(&mut self) -> bool {
        !std::mem::replace(&mut self.fired, true)
    }

    /// Whether the latch has been set.
    #[must_use]
    pub fn is_fired(self) -> bool {
        self.fired
    }
}

/// Running amount toward a target, in the policy's native unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accumulator {
    amount: f64,
    target: f64,
    latch: CompletionLatch,
}

impl Accumulator {
    /// Creates an empty accumulator. Non-positive targets are raised to the
    /// smallest positive value so a single contribution completes.
    #[must_use]
    pub fn new(target: f64) -> Self {
        let target = if target.is_finite() && target > 0.0 {
            target
        } else {
            f64::MIN_POSITIVE
        };
        Self {
            amount: 0.0,
            target,
            latch: CompletionLatch::default(),
        }
    }

    /// Adds `delta`. Negative and non-finite deltas are rejected, and so is
    /// everything after completion.
    pub fn add(&mut self, delta: f64) -> Accumulation {
        if self.latch.is_fired() || !delta.is_finite() || delta <= 0.0 {
            return Accumulation::Rejected;
        }
        self.amount = (self.amount + delta).min(self.target);
        if self.amount >= self.target && self.latch.try_fire() {
            Accumulation::Completed
        } else {
            Accumulation::Accepted
        }
    }

    /// Progress in `[0, 100]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        (self.amount / self.target * 100.0).clamp(0.0, 100.0)
    }

    /// Raw accumulated amount, never above the target.
    #[must_use]
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Whether the target has been reached.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.latch.is_fired()
    }
}

/// Normalises an angle difference in degrees into `(-180, 180]`.
#[must_use]
pub fn normalize_delta(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Angle of `point` about `pivot`, in degrees, within `(-180, 180]`.
#[must_use]
pub fn angle_about(pivot: Point, point: Point) -> f64 {
    (point.y - pivot.y).atan2(point.x - pivot.x).to_degrees()
}

/// Progress proportional to distance moved, direction-agnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementSampler {
    noise_floor: f64,
    gain: f64,
    last: Option<Point>,
    accumulator: Accumulator,
}

impl DisplacementSampler {
    /// `gain` is progress points per unit of travel above the noise floor.
    #[must_use]
    pub fn new(noise_floor: f64, gain: f64) -> Self {
        Self {
            noise_floor,
            gain,
            last: None,
            accumulator: Accumulator::new(100.0),
        }
    }

    /// Feeds one drag sample.
    pub fn sample(&mut self, point: Point) -> Accumulation {
        if !point.is_finite() {
            return Accumulation::Rejected;
        }
        let Some(previous) = self.last.replace(point) else {
            return Accumulation::Rejected;
        };
        let distance = previous.distance_to(point);
        if distance <= self.noise_floor {
            return Accumulation::Rejected;
        }
        self.accumulator.add(distance * self.gain)
    }

    /// Forgets the previous sample at the end of a drag.
    pub fn release(&mut self) {
        self.last = None;
    }

    /// The underlying accumulator.
    #[must_use]
    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }
}

/// Forward angular travel about a pivot.
///
/// Forward is the direction of increasing `atan2` angle, which on a
/// y-down screen is clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct AngularSampler {
    last_angle: Option<f64>,
    accumulator: Accumulator,
}

impl AngularSampler {
    /// Creates a sampler completing after `target_degrees` of forward travel.
    #[must_use]
    pub fn new(target_degrees: f64) -> Self {
        Self {
            last_angle: None,
            accumulator: Accumulator::new(target_degrees),
        }
    }

    /// Feeds one drag sample taken about `pivot`.
    ///
    /// The first sample of a drag only records the starting angle and is
    /// reported as accepted.
    pub fn sample(&mut self, pivot: Point, point: Point) -> Accumulation {
        if !point.is_finite() || !pivot.is_finite() || point == pivot {
            return Accumulation::Rejected;
        }
        let angle = angle_about(pivot, point);
        match self.last_angle.replace(angle) {
            Some(previous) => self.advance(angle - previous),
            None => Accumulation::Accepted,
        }
    }

    /// Applies a raw angle difference. Only forward deltas count.
    pub fn advance(&mut self, delta_degrees: f64) -> Accumulation {
        let delta = normalize_delta(delta_degrees);
        if delta > 0.0 {
            self.accumulator.add(delta)
        } else {
            Accumulation::Rejected
        }
    }

    /// Forgets the previous angle at the end of a drag.
    pub fn release(&mut self) {
        self.last_angle = None;
    }

    /// The underlying accumulator (amount in degrees).
    #[must_use]
    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }
}

/// Counts discrete qualifying events.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteCounter {
    required: u32,
    accumulator: Accumulator,
}

impl DiscreteCounter {
    /// Creates a counter completing after `required` events.
    #[must_use]
    pub fn new(required: u32) -> Self {
        Self {
            required,
            accumulator: Accumulator::new(f64::from(required)),
        }
    }

    /// Registers one qualifying event.
    pub fn register(&mut self) -> Accumulation {
        self.accumulator.add(1.0)
    }

    /// Events counted so far.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn count(&self) -> u32 {
        self.accumulator.amount().round() as u32
    }

    /// Events needed to complete.
    #[must_use]
    pub fn required(&self) -> u32 {
        self.required
    }

    /// The underlying accumulator.
    #[must_use]
    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }
}

/// Progress that grows with elapsed time once engaged.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedAccumulator {
    rate_per_second: f64,
    engaged: bool,
    accumulator: Accumulator,
}

impl TimedAccumulator {
    /// Creates an accumulator gaining `rate_per_second` progress points.
    #[must_use]
    pub fn new(rate_per_second: f64) -> Self {
        Self {
            rate_per_second,
            engaged: false,
            accumulator: Accumulator::new(100.0),
        }
    }

    /// Starts the clock. Returns `false` if it was already running.
    pub fn engage(&mut self) -> bool {
        !std::mem::replace(&mut self.engaged, true)
    }

    /// Whether the clock is running.
    #[must_use]
    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Advances by `elapsed`. Ignored until engaged.
    pub fn tick(&mut self, elapsed: Duration) -> Accumulation {
        if !self.engaged {
            return Accumulation::Rejected;
        }
        self.accumulator
            .add(self.rate_per_second * elapsed.as_secs_f64())
    }

    /// The underlying accumulator.
    #[must_use]
    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }
}

/// The sampler of one stage activation, tagged by policy.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureSampler {
    /// Oscillating motion, e.g. whisking.
    Displacement(DisplacementSampler),
    /// Rotary motion, e.g. turning the mill.
    Angular(AngularSampler),
    /// Counted releases, e.g. spoonfuls.
    Discrete(DiscreteCounter),
    /// Held in place while time passes, e.g. heating.
    Timed(TimedAccumulator),
}

impl GestureSampler {
    fn accumulator(&self) -> &Accumulator {
        match self {
            Self::Displacement(sampler) => sampler.accumulator(),
            Self::Angular(sampler) => sampler.accumulator(),
            Self::Discrete(counter) => counter.accumulator(),
            Self::Timed(timed) => timed.accumulator(),
        }
    }

    /// Progress in `[0, 100]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.accumulator().progress()
    }

    /// Whether the completion latch is set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.accumulator().is_complete()
    }

    /// Ends the current drag for policies that track the previous sample.
    pub fn release(&mut self) {
        match self {
            Self::Displacement(sampler) => sampler.release(),
            Self::Angular(sampler) => sampler.release(),
            Self::Discrete(_) | Self::Timed(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_fires_once() {
        let mut latch = CompletionLatch::default();

        assert!(latch.try_fire());
        assert!(!latch.try_fire());
        assert!(latch.is_fired());
    }

    #[test]
    fn test_accumulator_clamps_and_completes_once() {
        let mut acc = Accumulator::new(100.0);

        assert_eq!(acc.add(60.0), Accumulation::Accepted);
        assert_eq!(acc.add(60.0), Accumulation::Completed);
        assert_eq!(acc.add(60.0), Accumulation::Rejected);
        assert!((acc.progress() - 100.0).abs() < f64::EPSILON);
        assert!((acc.amount() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_accumulator_rejects_negative_and_non_finite() {
        let mut acc = Accumulator::new(10.0);

        assert_eq!(acc.add(-3.0), Accumulation::Rejected);
        assert_eq!(acc.add(f64::NAN), Accumulation::Rejected);
        assert_eq!(acc.add(f64::INFINITY), Accumulation::Rejected);
        assert_eq!(acc.add(0.0), Accumulation::Rejected);
        assert!(acc.progress().abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalize_delta_wraps_into_half_open_range() {
        assert!((normalize_delta(190.0) - -170.0).abs() < 1e-9);
        assert!((normalize_delta(-190.0) - 170.0).abs() < 1e-9);
        assert!((normalize_delta(180.0) - 180.0).abs() < 1e-9);
        assert!((normalize_delta(-180.0) - 180.0).abs() < 1e-9);
        assert!((normalize_delta(340.0) - -20.0).abs() < 1e-9);
        assert!((normalize_delta(-340.0) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_angular_exact_target_travel_completes() {
        let mut sampler = AngularSampler::new(DEFAULT_TARGET_TRAVEL_DEGREES);

        for _ in 0..7 {
            assert_eq!(sampler.advance(90.0), Accumulation::Accepted);
        }
        assert_eq!(sampler.advance(90.0), Accumulation::Completed);
        assert!((sampler.accumulator().progress() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_angular_one_degree_short_does_not_complete() {
        let mut sampler = AngularSampler::new(DEFAULT_TARGET_TRAVEL_DEGREES);

        for _ in 0..7 {
            sampler.advance(90.0);
        }
        assert_eq!(sampler.advance(89.0), Accumulation::Accepted);
        assert!(!sampler.accumulator().is_complete());
        assert!(sampler.accumulator().progress() < 100.0);
    }

    #[test]
    fn test_angular_ignores_backward_travel() {
        let mut sampler = AngularSampler::new(360.0);

        assert_eq!(sampler.advance(-45.0), Accumulation::Rejected);
        assert_eq!(sampler.advance(45.0), Accumulation::Accepted);
        assert!((sampler.accumulator().amount() - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_angular_crossing_the_seam_counts_forward() {
        let pivot = Point::new(0.0, 0.0);
        let mut sampler = AngularSampler::new(720.0);
        // On either side of the negative x axis: about +179.4 and -179.4 degrees.
        let below = Point::new(-100.0, 1.0);
        let above = Point::new(-100.0, -1.0);

        assert_eq!(sampler.sample(pivot, below), Accumulation::Accepted);
        // below -> above wraps from +179.4 to -179.4: forward by ~1.1 degrees.
        assert_eq!(sampler.sample(pivot, above), Accumulation::Accepted);
        // above -> below is the same hop backward.
        assert_eq!(sampler.sample(pivot, below), Accumulation::Rejected);
        let travelled = sampler.accumulator().amount();
        assert!(travelled > 0.0 && travelled < 2.0, "travelled {travelled}");
    }

    #[test]
    fn test_angular_release_forgets_previous_angle() {
        let pivot = Point::new(0.0, 0.0);
        let mut sampler = AngularSampler::new(720.0);

        sampler.sample(pivot, Point::new(100.0, 0.0));
        sampler.release();
        sampler.sample(pivot, Point::new(0.0, 100.0));

        assert!(sampler.accumulator().amount().abs() < f64::EPSILON);
    }

    #[test]
    fn test_angular_sample_on_pivot_is_rejected() {
        let pivot = Point::new(10.0, 10.0);
        let mut sampler = AngularSampler::new(720.0);

        assert_eq!(sampler.sample(pivot, pivot), Accumulation::Rejected);
    }

    #[test]
    fn test_discrete_requires_exact_count() {
        let mut counter = DiscreteCounter::new(3);

        assert_eq!(counter.register(), Accumulation::Accepted);
        assert_eq!(counter.register(), Accumulation::Accepted);
        assert!(!counter.accumulator().is_complete());
        assert_eq!(counter.register(), Accumulation::Completed);
        assert_eq!(counter.register(), Accumulation::Rejected);
        assert_eq!(counter.count(), 3);
        assert_eq!(counter.required(), 3);
    }

    #[test]
    fn test_displacement_ignores_noise() {
        let mut sampler = DisplacementSampler::new(DEFAULT_NOISE_FLOOR, 1.0);

        assert_eq!(sampler.sample(Point::new(0.0, 0.0)), Accumulation::Rejected);
        assert_eq!(sampler.sample(Point::new(0.2, 0.0)), Accumulation::Rejected);
        assert_eq!(sampler.sample(Point::new(0.4, 0.0)), Accumulation::Rejected);
        assert!(sampler.accumulator().progress().abs() < f64::EPSILON);
    }

    #[test]
    fn test_displacement_accumulates_distance_times_gain() {
        let mut sampler = DisplacementSampler::new(DEFAULT_NOISE_FLOOR, 0.5);

        sampler.sample(Point::new(0.0, 0.0));
        assert_eq!(sampler.sample(Point::new(30.0, 40.0)), Accumulation::Accepted);

        assert!((sampler.accumulator().progress() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_displacement_release_starts_a_new_stroke() {
        let mut sampler = DisplacementSampler::new(DEFAULT_NOISE_FLOOR, 1.0);

        sampler.sample(Point::new(0.0, 0.0));
        sampler.release();
        assert_eq!(sampler.sample(Point::new(50.0, 0.0)), Accumulation::Rejected);
    }

    #[test]
    fn test_timed_waits_for_engagement() {
        let mut timed = TimedAccumulator::new(50.0);

        assert_eq!(timed.tick(Duration::from_secs(1)), Accumulation::Rejected);
        assert!(timed.engage());
        assert!(!timed.engage());
        assert_eq!(timed.tick(Duration::from_secs(1)), Accumulation::Accepted);
        assert_eq!(timed.tick(Duration::from_secs(1)), Accumulation::Completed);
        assert_eq!(timed.tick(Duration::from_secs(1)), Accumulation::Rejected);
    }

    #[test]
    fn test_progress_never_exceeds_bounds_for_any_policy() {
        let mut samplers = vec![
            GestureSampler::Displacement(DisplacementSampler::new(DEFAULT_NOISE_FLOOR, 3.0)),
            GestureSampler::Angular(AngularSampler::new(90.0)),
            GestureSampler::Discrete(DiscreteCounter::new(2)),
            GestureSampler::Timed(TimedAccumulator::new(500.0)),
        ];

        for sampler in &mut samplers {
            let mut last = sampler.progress();
            for step in 0..200_u32 {
                let point = Point::new(f64::from(step % 7) * 13.0, f64::from(step % 5) * 11.0);
                match sampler {
                    GestureSampler::Displacement(s) => {
                        s.sample(point);
                    }
                    GestureSampler::Angular(s) => {
                        s.sample(Point::new(20.0, 20.0), point);
                    }
                    GestureSampler::Discrete(c) => {
                        c.register();
                    }
                    GestureSampler::Timed(t) => {
                        t.engage();
                        t.tick(Duration::from_millis(50));
                    }
                }
                let progress = sampler.progress();
                assert!((0.0..=100.0).contains(&progress));
                assert!(progress >= last);
                last = progress;
            }
        }
    }
}

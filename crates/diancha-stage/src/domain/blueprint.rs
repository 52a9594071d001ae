//! Stage blueprints: what each stage asks of the user.
//!
//! A blueprint is plain data. One `StageController` type runs every stage;
//! the blueprint's prerequisite and [`GesturePolicy`] variant are what make
//! roasting differ from whisking.

use std::time::Duration;

use diancha_core::error::DomainError;
use diancha_core::stage::Stage;
use diancha_core::target::Target;
use diancha_gesture::HitZone;
use diancha_gesture::sampler::{
    AngularSampler, DEFAULT_NOISE_FLOOR, DEFAULT_TARGET_TRAVEL_DEGREES, DiscreteCounter,
    DisplacementSampler, GestureSampler, TimedAccumulator,
};

/// Gesture that must happen before a stage accepts its main gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prerequisite {
    /// A tap inside the zone, e.g. igniting the stove.
    Tap(HitZone),
    /// A drop inside the zone, e.g. loading the mill.
    Release(HitZone),
}

/// Which inputs count as one unit for a discrete policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiscreteTrigger {
    /// A tap inside the zone.
    Tap(HitZone),
    /// Any tap.
    TapAnywhere,
    /// A drop inside the zone.
    ReleaseOn(HitZone),
    /// A drag sample passing over the zone.
    Hover(HitZone),
    /// A drop in `source` picks up; a later drop in `destination` counts.
    Carry {
        /// Where the tool is loaded.
        source: HitZone,
        /// Where the load is delivered.
        destination: HitZone,
    },
}

/// The rule turning gestures into progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GesturePolicy {
    /// Distance travelled, direction-agnostic.
    Displacement {
        /// Moves at or below this distance are ignored.
        noise_floor: f64,
        /// Progress points per unit of distance.
        gain: f64,
    },
    /// Forward rotation about the centre of a target.
    Angular {
        /// Target whose centre is the pivot.
        pivot: Target,
        /// Forward travel needed, in degrees.
        target_degrees: f64,
    },
    /// Counted units.
    Discrete {
        /// Units needed.
        required: u32,
        /// What counts as a unit.
        trigger: DiscreteTrigger,
    },
    /// Time passing after a drop on a zone.
    Timed {
        /// The drop that starts the clock.
        engage: HitZone,
        /// Progress points per second once engaged.
        rate_per_second: f64,
        /// Whether the engaging drop also counts before the prerequisite
        /// is met. The clock still only runs once the stage is armed.
        engage_early: bool,
    },
}

impl GesturePolicy {
    /// A fresh sampler for one activation.
    #[must_use]
    pub fn sampler(&self) -> GestureSampler {
        match *self {
            Self::Displacement { noise_floor, gain } => {
                GestureSampler::Displacement(DisplacementSampler::new(noise_floor, gain))
            }
            Self::Angular { target_degrees, .. } => {
                GestureSampler::Angular(AngularSampler::new(target_degrees))
            }
            Self::Discrete { required, .. } => {
                GestureSampler::Discrete(DiscreteCounter::new(required))
            }
            Self::Timed {
                rate_per_second, ..
            } => GestureSampler::Timed(TimedAccumulator::new(rate_per_second)),
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        match *self {
            Self::Displacement { noise_floor, gain } => {
                require_non_negative("noise_floor", noise_floor)?;
                require_positive("gain", gain)
            }
            Self::Angular { target_degrees, .. } => {
                require_positive("target_degrees", target_degrees)
            }
            Self::Discrete { required, trigger } => {
                if required == 0 {
                    return Err(DomainError::Validation(
                        "required count must be at least 1".to_owned(),
                    ));
                }
                trigger.validate()
            }
            Self::Timed {
                engage,
                rate_per_second,
                ..
            } => {
                validate_zone(engage)?;
                require_positive("rate_per_second", rate_per_second)
            }
        }
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), DomainError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<(), DomainError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}

fn validate_zone(zone: HitZone) -> Result<(), DomainError> {
    require_non_negative("tolerance", zone.tolerance)?;
    require_non_negative("extend_below", zone.extend_below)
}

impl DiscreteTrigger {
    fn validate(self) -> Result<(), DomainError> {
        match self {
            Self::Tap(zone) | Self::ReleaseOn(zone) | Self::Hover(zone) => validate_zone(zone),
            Self::Carry {
                source,
                destination,
            } => {
                validate_zone(source)?;
                validate_zone(destination)
            }
            Self::TapAnywhere => Ok(()),
        }
    }
}

/// Everything that defines one stage's interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageBlueprint {
    /// The stage this blueprint drives.
    pub stage: Stage,
    /// Gesture required before the main gesture is accepted.
    pub prerequisite: Option<Prerequisite>,
    /// How gestures become progress.
    pub policy: GesturePolicy,
    /// Cosmetic pause between logical completion and the callback.
    pub settle: Duration,
    /// Closing gesture required once progress is full, e.g. emptying the
    /// warmed cup. The completion latch waits for it.
    pub finish: Option<DiscreteTrigger>,
}

impl StageBlueprint {
    /// Creates a validated blueprint.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a policy parameter or a zone
    /// tolerance is out of range.
    pub fn new(
        stage: Stage,
        prerequisite: Option<Prerequisite>,
        policy: GesturePolicy,
        settle: Duration,
    ) -> Result<Self, DomainError> {
        policy.validate()?;
        if let Some(Prerequisite::Tap(zone) | Prerequisite::Release(zone)) = prerequisite {
            validate_zone(zone)?;
        }
        Ok(Self {
            stage,
            prerequisite,
            policy,
            settle,
            finish: None,
        })
    }

    /// The same blueprint, completing only after `trigger` once progress
    /// is full.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `trigger` is a carry or one of
    /// its zones is out of range.
    pub fn with_finish(self, trigger: DiscreteTrigger) -> Result<Self, DomainError> {
        if matches!(trigger, DiscreteTrigger::Carry { .. }) {
            return Err(DomainError::Validation(
                "a closing gesture cannot be a carry".to_owned(),
            ));
        }
        trigger.validate()?;
        Ok(Self {
            finish: Some(trigger),
            ..self
        })
    }

    /// The standard interaction of `stage`.
    #[must_use]
    pub fn standard(stage: Stage) -> Self {
        let (prerequisite, policy, settle_ms, finish) = match stage {
            Stage::Roasting => (
                Some(Prerequisite::Tap(HitZone::exact(Target::Stove))),
                GesturePolicy::Timed {
                    engage: HitZone::padded(Target::Stove, 50.0),
                    rate_per_second: 50.0,
                    engage_early: false,
                },
                1000,
                None,
            ),
            Stage::Grinding => (
                Some(Prerequisite::Release(HitZone::exact(Target::Trough))),
                GesturePolicy::Discrete {
                    required: 6,
                    trigger: DiscreteTrigger::Tap(HitZone::exact(Target::Roller)),
                },
                1200,
                None,
            ),
            Stage::Milling => (
                Some(Prerequisite::Release(HitZone::padded(Target::Mill, 50.0))),
                GesturePolicy::Angular {
                    pivot: Target::Mill,
                    target_degrees: DEFAULT_TARGET_TRAVEL_DEGREES,
                },
                1200,
                None,
            ),
            Stage::Boxing => (
                None,
                GesturePolicy::Discrete {
                    required: 3,
                    trigger: DiscreteTrigger::Carry {
                        source: HitZone::exact(Target::Saucer),
                        destination: HitZone::exact(Target::TeaBox),
                    },
                },
                0,
                Some(DiscreteTrigger::TapAnywhere),
            ),
            // The kettle can be set down before or after the fire is lit.
            Stage::Boiling => (
                Some(Prerequisite::Tap(HitZone::exact(Target::Stove))),
                GesturePolicy::Timed {
                    engage: HitZone::exact(Target::Stove).extended_below(100.0),
                    rate_per_second: 20.0,
                    engage_early: true,
                },
                1500,
                None,
            ),
            Stage::Warming => (
                None,
                GesturePolicy::Timed {
                    engage: HitZone::padded(Target::Cup, 50.0),
                    rate_per_second: 40.0,
                    engage_early: false,
                },
                1500,
                Some(DiscreteTrigger::Tap(HitZone::exact(Target::Cup))),
            ),
            Stage::Scooping => (
                None,
                GesturePolicy::Discrete {
                    required: 1,
                    trigger: DiscreteTrigger::Carry {
                        source: HitZone::exact(Target::TeaBox),
                        destination: HitZone::padded(Target::Cup, 50.0),
                    },
                },
                1500,
                None,
            ),
            Stage::Pouring => (
                None,
                GesturePolicy::Discrete {
                    required: 1,
                    trigger: DiscreteTrigger::Hover(HitZone::padded(Target::Cup, 80.0)),
                },
                3500,
                None,
            ),
            Stage::Whisking => (
                None,
                GesturePolicy::Displacement {
                    noise_floor: DEFAULT_NOISE_FLOOR,
                    gain: 0.1,
                },
                1200,
                None,
            ),
            // Taste first, then confirm.
            Stage::Tasting => (
                None,
                GesturePolicy::Discrete {
                    required: 1,
                    trigger: DiscreteTrigger::TapAnywhere,
                },
                0,
                Some(DiscreteTrigger::TapAnywhere),
            ),
        };
        Self {
            stage,
            prerequisite,
            policy,
            settle: Duration::from_millis(settle_ms),
            finish,
        }
    }
}

/// One blueprint per stage, in ritual order.
#[derive(Debug, Clone, PartialEq)]
pub struct StageCatalog {
    blueprints: Vec<StageBlueprint>,
}

impl StageCatalog {
    /// The standard ten-stage ritual.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            blueprints: Stage::ALL.into_iter().map(StageBlueprint::standard).collect(),
        }
    }

    /// Builds a catalogue from exactly one blueprint per stage, in any order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a stage is missing or repeated.
    pub fn from_blueprints(
        blueprints: impl IntoIterator<Item = StageBlueprint>,
    ) -> Result<Self, DomainError> {
        let mut slots: Vec<Option<StageBlueprint>> = vec![None; Stage::ALL.len()];
        for blueprint in blueprints {
            let slot = &mut slots[usize::from(blueprint.stage.ordinal() - 1)];
            if slot.is_some() {
                return Err(DomainError::Validation(format!(
                    "duplicate blueprint for stage {}",
                    blueprint.stage
                )));
            }
            *slot = Some(blueprint);
        }
        let blueprints = slots
            .into_iter()
            .zip(Stage::ALL)
            .map(|(slot, stage)| {
                slot.ok_or_else(|| {
                    DomainError::Validation(format!("missing blueprint for stage {stage}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { blueprints })
    }

    /// Replaces the blueprint of one stage.
    #[must_use]
    pub fn with_blueprint(mut self, blueprint: StageBlueprint) -> Self {
        self.blueprints[usize::from(blueprint.stage.ordinal() - 1)] = blueprint;
        self
    }

    /// The blueprint of `stage`.
    #[must_use]
    pub fn blueprint(&self, stage: Stage) -> &StageBlueprint {
        &self.blueprints[usize::from(stage.ordinal() - 1)]
    }
}

impl Default for StageCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_is_in_ritual_order() {
        let catalog = StageCatalog::standard();

        for stage in Stage::ALL {
            assert_eq!(catalog.blueprint(stage).stage, stage);
        }
    }

    #[test]
    fn test_standard_blueprints_pass_validation() {
        for stage in Stage::ALL {
            let standard = StageBlueprint::standard(stage);
            let mut validated = StageBlueprint::new(
                standard.stage,
                standard.prerequisite,
                standard.policy,
                standard.settle,
            )
            .unwrap();
            if let Some(finish) = standard.finish {
                validated = validated.with_finish(finish).unwrap();
            }
            assert_eq!(validated, standard);
        }
    }

    #[test]
    fn test_prerequisites_match_the_ritual() {
        let with_prerequisite: Vec<Stage> = Stage::ALL
            .into_iter()
            .filter(|stage| StageBlueprint::standard(*stage).prerequisite.is_some())
            .collect();

        assert_eq!(
            with_prerequisite,
            vec![
                Stage::Roasting,
                Stage::Grinding,
                Stage::Milling,
                Stage::Boiling
            ]
        );
    }

    #[test]
    fn test_closing_gestures_match_the_ritual() {
        let with_finish: Vec<Stage> = Stage::ALL
            .into_iter()
            .filter(|stage| StageBlueprint::standard(*stage).finish.is_some())
            .collect();

        assert_eq!(
            with_finish,
            vec![Stage::Boxing, Stage::Warming, Stage::Tasting]
        );
    }

    #[test]
    fn test_carry_cannot_close_a_stage() {
        let result = StageBlueprint::standard(Stage::Whisking).with_finish(DiscreteTrigger::Carry {
            source: HitZone::exact(Target::Saucer),
            destination: HitZone::exact(Target::Cup),
        });

        match result.unwrap_err() {
            DomainError::Validation(msg) => assert_eq!(msg, "a closing gesture cannot be a carry"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_extension_below_is_rejected() {
        let result = StageBlueprint::standard(Stage::Warming).with_finish(DiscreteTrigger::Tap(
            HitZone::exact(Target::Cup).extended_below(-5.0),
        ));

        match result.unwrap_err() {
            DomainError::Validation(msg) => {
                assert_eq!(msg, "extend_below must be a non-negative number, got -5");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_required_count_is_rejected() {
        let result = StageBlueprint::new(
            Stage::Grinding,
            None,
            GesturePolicy::Discrete {
                required: 0,
                trigger: DiscreteTrigger::TapAnywhere,
            },
            Duration::ZERO,
        );

        match result.unwrap_err() {
            DomainError::Validation(msg) => assert_eq!(msg, "required count must be at least 1"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_non_positive_rate_is_rejected() {
        let result = StageBlueprint::new(
            Stage::Boiling,
            None,
            GesturePolicy::Timed {
                engage: HitZone::exact(Target::Stove),
                rate_per_second: 0.0,
                engage_early: false,
            },
            Duration::ZERO,
        );

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_negative_tolerance_is_rejected() {
        let result = StageBlueprint::new(
            Stage::Milling,
            Some(Prerequisite::Release(HitZone::padded(Target::Mill, -1.0))),
            GesturePolicy::Angular {
                pivot: Target::Mill,
                target_degrees: 720.0,
            },
            Duration::ZERO,
        );

        match result.unwrap_err() {
            DomainError::Validation(msg) => {
                assert_eq!(msg, "tolerance must be a non-negative number, got -1");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_from_blueprints_rejects_missing_stage() {
        let partial = Stage::ALL
            .into_iter()
            .filter(|stage| *stage != Stage::Warming)
            .map(StageBlueprint::standard);

        match StageCatalog::from_blueprints(partial).unwrap_err() {
            DomainError::Validation(msg) => assert_eq!(msg, "missing blueprint for stage warming"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_from_blueprints_rejects_duplicate_stage() {
        let doubled = Stage::ALL
            .into_iter()
            .chain([Stage::Boxing])
            .map(StageBlueprint::standard);

        match StageCatalog::from_blueprints(doubled).unwrap_err() {
            DomainError::Validation(msg) => assert_eq!(msg, "duplicate blueprint for stage boxing"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_with_blueprint_replaces_one_stage() {
        let quick_whisk = StageBlueprint::new(
            Stage::Whisking,
            None,
            GesturePolicy::Displacement {
                noise_floor: 0.0,
                gain: 10.0,
            },
            Duration::ZERO,
        )
        .unwrap();

        let catalog = StageCatalog::standard().with_blueprint(quick_whisk);

        assert_eq!(*catalog.blueprint(Stage::Whisking), quick_whisk);
        assert_eq!(
            *catalog.blueprint(Stage::Pouring),
            StageBlueprint::standard(Stage::Pouring)
        );
    }
}

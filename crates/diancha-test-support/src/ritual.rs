//! Pointer scripts that play each stage of the reference ritual to completion.

use std::time::Duration;

use diancha_core::geometry::Point;
use diancha_core::stage::Stage;
use diancha_core::target::Target;

use crate::layout::{center_of, orbit, zigzag};

/// Frame length the scripts' waits are measured in.
pub const FRAME: Duration = Duration::from_millis(50);

/// One step of a pointer script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerStep {
    /// Tap at a point.
    Tap(Point),
    /// Drag sample at a point.
    Move(Point),
    /// Drop at a point.
    Release(Point),
    /// Let time pass, in frames of [`FRAME`].
    Wait(Duration),
}

impl PointerStep {
    /// Number of whole frames a wait covers, rounded up.
    #[must_use]
    pub fn frames(&self) -> u32 {
        match self {
            Self::Wait(duration) => {
                let millis = duration.as_millis().div_ceil(FRAME.as_millis());
                u32::try_from(millis).unwrap_or(u32::MAX)
            }
            _ => 0,
        }
    }
}

fn wait_ms(millis: u64) -> PointerStep {
    PointerStep::Wait(Duration::from_millis(millis))
}

/// Steps that complete `stage` in the reference layout, including the
/// heating time and settle window, with some slack.
#[must_use]
pub fn ritual_steps(stage: Stage) -> Vec<PointerStep> {
    let stove = center_of(Target::Stove);
    let cup = center_of(Target::Cup);
    match stage {
        Stage::Roasting => vec![
            PointerStep::Tap(stove),
            PointerStep::Release(stove),
            wait_ms(3500),
        ],
        Stage::Grinding => {
            let mut steps = vec![PointerStep::Release(Point::new(500.0, 600.0))];
            steps.extend((0..6).map(|_| PointerStep::Tap(center_of(Target::Roller))));
            steps.push(wait_ms(1700));
            steps
        }
        Stage::Milling => {
            let mill = center_of(Target::Mill);
            let path = orbit(mill, 100.0, 30.0, 900.0);
            let mut steps = vec![PointerStep::Release(mill)];
            steps.extend(path.iter().copied().map(PointerStep::Move));
            steps.push(PointerStep::Release(path[path.len() - 1]));
            steps.push(wait_ms(1700));
            steps
        }
        Stage::Boxing => {
            let mut steps: Vec<PointerStep> = (0..3)
                .flat_map(|_| {
                    [
                        PointerStep::Release(center_of(Target::Saucer)),
                        PointerStep::Release(center_of(Target::TeaBox)),
                    ]
                })
                .collect();
            steps.push(PointerStep::Tap(Point::new(500.0, 650.0)));
            steps
        }
        Stage::Boiling => vec![
            PointerStep::Tap(stove),
            PointerStep::Release(stove),
            wait_ms(7000),
        ],
        Stage::Warming => vec![
            PointerStep::Release(cup),
            wait_ms(2600),
            PointerStep::Tap(cup),
            wait_ms(1700),
        ],
        Stage::Scooping => vec![
            PointerStep::Release(center_of(Target::TeaBox)),
            PointerStep::Release(cup),
            wait_ms(2000),
        ],
        Stage::Pouring => vec![PointerStep::Move(cup), wait_ms(4000)],
        Stage::Whisking => {
            let from = Point::new(400.0, 400.0);
            let mut steps: Vec<PointerStep> = zigzag(from, Point::new(600.0, 400.0), 5)
                .into_iter()
                .map(PointerStep::Move)
                .collect();
            steps.push(PointerStep::Release(from));
            steps.push(wait_ms(1700));
            steps
        }
        Stage::Tasting => vec![
            PointerStep::Tap(Point::new(500.0, 350.0)),
            PointerStep::Tap(Point::new(500.0, 600.0)),
        ],
    }
}

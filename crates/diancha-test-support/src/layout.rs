//! Reference-layout bindings and gesture path helpers.

use diancha_core::geometry::Point;
use diancha_core::target::Target;
use diancha_gesture::{FixedRegion, TargetBindings};

/// Centre of `target` in the reference layout.
#[must_use]
pub fn center_of(target: Target) -> Point {
    target.reference_rect().center()
}

/// Bindings for every target, fixed at the reference layout.
#[must_use]
pub fn standard_bindings() -> TargetBindings {
    Target::ALL
        .into_iter()
        .fold(TargetBindings::new(), |bindings, target| {
            bindings.bind(target, FixedRegion(target.reference_rect()))
        })
}

/// Points on a circle about `pivot`, starting at angle 0 and moving forward
/// (increasing `atan2` angle) in `step_degrees` increments until
/// `total_degrees` have been covered.
#[must_use]
pub fn orbit(pivot: Point, radius: f64, step_degrees: f64, total_degrees: f64) -> Vec<Point> {
    let mut points = Vec::new();
    let mut angle: f64 = 0.0;
    while angle <= total_degrees {
        let radians = angle.to_radians();
        points.push(Point::new(
            pivot.x + radius * radians.cos(),
            pivot.y + radius * radians.sin(),
        ));
        angle += step_degrees;
    }
    points
}

/// Alternating points between `from` and `to`, `strokes + 1` points long.
#[must_use]
pub fn zigzag(from: Point, to: Point, strokes: usize) -> Vec<Point> {
    (0..=strokes)
        .map(|i| if i % 2 == 0 { from } else { to })
        .collect()
}

//! Inbound gestures for the Stage interaction context.

use diancha_core::geometry::{Point, PointerSample};

/// A discrete pointer event delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureInput {
    /// Press and release without dragging.
    Tap(Point),
    /// One sample of an ongoing drag.
    Move(PointerSample),
    /// End of a drag, at the drop position.
    Release(Point),
}

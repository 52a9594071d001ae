//! Shared test fixtures and utilities for the Diancha engine.

mod clock;
mod layout;
mod ritual;

pub use clock::FixedClock;
pub use layout::{center_of, orbit, standard_bindings, zigzag};
pub use ritual::{FRAME, PointerStep, ritual_steps};

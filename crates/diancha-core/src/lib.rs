//! Diancha Core — shared vocabulary of the tea ritual engine.
//!
//! This crate defines the stage and target vocabulary, the geometry that
//! gestures are expressed in, and the event/aggregate abstractions every
//! state machine in the workspace is built on. It contains no gesture or
//! progression logic of its own.

pub mod aggregate;
pub mod clock;
pub mod error;
pub mod event;
pub mod geometry;
pub mod stage;
pub mod target;

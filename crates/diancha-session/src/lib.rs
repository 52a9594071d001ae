//! Diancha — Session bounded context.
//!
//! Sequences the ten stages of an experience session: owns the active
//! stage controller, receives its completion and activates the next stage.

pub mod application;
pub mod domain;

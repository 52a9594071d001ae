//! Diancha — Stage interaction bounded context.
//!
//! Responsible for the per-activation state machine of a single stage:
//! prerequisite gestures, gesture policies, the settle window and the
//! exactly-once completion callback.

pub mod application;
pub mod domain;

//! Diancha — Challenge bounded context.
//!
//! Wraps a session in a countdown: every completed stage scores points
//! weighted by the time left, and the round ends when the clock runs out or
//! the last stage is done, whichever is dispatched first.

pub mod application;
pub mod domain;

//! Diancha — headless runtime.
//!
//! Wires the orchestrators to the outside world: environment configuration,
//! a scene layout of live target regions, a YAML script format for pointer
//! input, and a tokio event loop that feeds script events, frame ticks and
//! countdown seconds into a single reducer.

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod layout;
pub mod script;

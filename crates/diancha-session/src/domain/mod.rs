//! Domain model for the Session context.

pub mod aggregates;
pub mod events;

//! Domain model for the Stage interaction context.

pub mod aggregates;
pub mod blueprint;
pub mod commands;
pub mod events;

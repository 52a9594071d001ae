//! Domain model for the Challenge context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod scoring;

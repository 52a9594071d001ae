//! Domain model for stage content.

pub mod table;

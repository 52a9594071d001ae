//! Application layer for the Stage interaction context.

pub mod query_handlers;

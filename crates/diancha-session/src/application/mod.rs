//! Application layer for the Session context.

pub mod query_handlers;

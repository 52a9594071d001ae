//! Application layer for the Challenge context.

pub mod query_handlers;

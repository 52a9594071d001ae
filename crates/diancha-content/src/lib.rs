//! Diancha — stage content.
//!
//! Titles, descriptions, lore and tool notes for each stage, loaded from a
//! YAML table. The engine never reads anything here but the ordinal; the
//! table is handed to the presentation layer as-is.

pub mod domain;

//! Docmark library
//!
//! Token-level comparison of two documents, rendering of highlighted copies
//! for each side, and the session that ties loading, comparing and marking
//! together. The binary and demos are thin wrappers around these modules.

pub mod config;
pub mod constant;
pub mod diff;
pub mod document;
pub mod exporter;
pub mod loader;
pub mod messages;
pub mod render;
pub mod session;
pub mod tokenizer;

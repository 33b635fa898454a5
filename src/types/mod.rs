//! This module defines the core, strongly-typed data representations used
//! throughout the decode and reduction pipeline.
//!
//! It includes the canonical `StatKind` enum, which replaces fragile run-time
//! type-name comparisons, the `LineTag` enum for wire-line tags, and the
//! `StatValue` produced by reduction.

pub mod stat_kind;
pub mod stat_value;

// Re-export the main type(s) for easier access.
pub use stat_kind::{LineTag, StatKind};
pub use stat_value::StatValue;

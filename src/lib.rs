//! This file is the root of the `statdump_core` Rust crate.
//!
//! The crate turns gem5 statistics dumps (line protocol `Type/Identifier/Value`)
//! into one reduced row per dump, driven by a declarative `ParseConfig`.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of our library (`stat_types`, `decoder`, etc.)
//!     so the Rust compiler knows they exist.
//! 2.  Re-exporting the handful of types a dump scheduler needs.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod config;
pub mod decoder;
pub mod error;
pub mod logging;
pub mod reduction;
pub mod stat_types;
pub mod types;

#[doc(hidden)]
pub use log as __log;

//==================================================================================
// 2. Public API
//==================================================================================
pub use bridge::{header_for, process_dump, process_dump_with};
pub use config::{ParseConfig, VariableConfig};
pub use error::StatsError;
pub use reduction::DumpRow;
pub use stat_types::{EntryBatch, StatSet, StatType, StatTypeRegistry};
pub use types::{StatKind, StatValue};

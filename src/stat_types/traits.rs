// In: src/stat_types/traits.rs

//! Defines the behavioral traits shared by the accumulator variants.
//!
//! `Accumulator` is the lifecycle contract every variant honors. The two
//! capability traits split the write side by wire shape: `ScalarAssignable`
//! variants take one value per identifier, `EntryIndexed` variants take a batch
//! of `base::entry` emissions. The decoder picks the capability by matching on
//! the configured `StatKind`, never by inspecting type names.

use crate::error::StatsError;
use crate::stat_types::samples::EntryBatch;
use crate::types::{StatKind, StatValue};

/// The lifecycle contract every variant implements.
pub trait Accumulator {
    fn id(&self) -> &str;

    fn kind(&self) -> StatKind;

    /// Samples expected per dump.
    fn repeat(&self) -> u32;

    /// Name of the current lifecycle phase, for diagnostics.
    fn phase_name(&self) -> &'static str;

    /// `true` until the first write (or default) of this dump.
    fn is_uninitialized(&self) -> bool;

    /// `true` once `reduce` has succeeded.
    fn is_reduced(&self) -> bool;

    /// Fills in the value a variable takes when the dump never mentioned it.
    fn apply_default(&mut self) -> Result<(), StatsError>;

    /// Pads accumulated samples to exactly `repeat`. Legal exactly once.
    fn balance(&mut self) -> Result<(), StatsError>;

    /// Collapses balanced samples to the final value(s). Legal exactly once, after `balance`.
    fn reduce(&mut self) -> Result<(), StatsError>;
}

/// Variants that hold a single value (`Scalar`, `Configuration`).
pub trait ScalarAssignable: Accumulator {
    /// Stores `raw` as the pending value. The last write of a dump wins.
    fn assign(&mut self, raw: &str) -> Result<(), StatsError>;

    fn reduced_value(&self) -> Result<StatValue, StatsError>;
}

/// Variants keyed by entry (`Vector`, `Distribution`, `Histogram`).
pub trait EntryIndexed: Accumulator {
    /// Sums the raw values of each key in `batch` and appends the sum as one sample.
    fn set_content(&mut self, batch: &EntryBatch) -> Result<(), StatsError>;

    /// The ordered output column suffixes of this variable.
    fn entries(&self) -> Vec<String>;

    fn reduced_entry(&self, key: &str) -> Result<f64, StatsError>;
}

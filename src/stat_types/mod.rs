// In: src/stat_types/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Accumulators
// ====================================================================================
//
// One `StatType` exists per configured variable per dump. It is built by the
// registry, fed by the decoder, then balanced and reduced by `reduction`:
//
//   1. [StatTypeRegistry::build]  VariableConfig -> StatType (Uninitialized)
//   2. [decoder]                  set_scalar / set_entries  -> Accumulating
//                                 apply_default (untouched variables)
//   3. [reduction::reduce_dump]   balance()  -> Balanced
//                                 reduce()   -> Reduced
//                                 columns() + reduced_row() -> DumpRow
//
// Dispatch is by the closed `StatType` enum. The decoder only asks for a
// capability (`ScalarAssignable` or `EntryIndexed`); a variable without the
// requested capability is a protocol mismatch.
// ====================================================================================

mod configuration;
mod distribution;
mod histogram;
mod lifecycle;
mod rebin;
mod registry;
pub mod samples;
mod scalar;
mod set;
mod traits;
mod vector;

pub use configuration::{Configuration, DEFAULT_ON_EMPTY};
pub use distribution::{Distribution, OVERFLOWS, UNDERFLOWS};
pub use histogram::Histogram;
pub use registry::{StatTypeBuilder, StatTypeRegistry};
pub use samples::EntryBatch;
pub use scalar::Scalar;
pub use set::StatSet;
pub use traits::{Accumulator, EntryIndexed, ScalarAssignable};
pub use vector::Vector;

use crate::error::StatsError;
use crate::stat_types::samples::KeyedTotals;
use crate::types::{StatKind, StatValue};

/// Separator between a variable id and an entry key in output column names.
pub const COLUMN_SEPARATOR: &str = "..";

//==================================================================================
// 1. Reduced Entries
//==================================================================================

/// The reduced form of an entry-indexed variable: the ordered output entries
/// plus every reduced value (which may include keys that are not emitted).
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ReducedEntries {
    entries: Vec<String>,
    values: KeyedTotals,
}

impl ReducedEntries {
    pub fn new(entries: Vec<String>, values: KeyedTotals) -> Self {
        Self { entries, values }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn get(&self, id: &str, key: &str) -> Result<f64, StatsError> {
        self.values
            .get(key)
            .ok_or_else(|| StatsError::UnknownEntryError {
                id: id.to_string(),
                key: key.to_string(),
            })
    }
}

//==================================================================================
// 2. The StatType Enum
//==================================================================================

/// A configured variable's accumulator for one dump.
#[derive(Debug, Clone, PartialEq)]
pub enum StatType {
    Scalar(Scalar),
    Configuration(Configuration),
    Vector(Vector),
    Distribution(Distribution),
    Histogram(Histogram),
}

impl StatType {
    pub fn as_accumulator(&self) -> &dyn Accumulator {
        match self {
            StatType::Scalar(s) => s,
            StatType::Configuration(c) => c,
            StatType::Vector(v) => v,
            StatType::Distribution(d) => d,
            StatType::Histogram(h) => h,
        }
    }

    pub fn as_accumulator_mut(&mut self) -> &mut dyn Accumulator {
        match self {
            StatType::Scalar(s) => s,
            StatType::Configuration(c) => c,
            StatType::Vector(v) => v,
            StatType::Distribution(d) => d,
            StatType::Histogram(h) => h,
        }
    }

    pub fn as_scalar(&self) -> Option<&dyn ScalarAssignable> {
        match self {
            StatType::Scalar(s) => Some(s),
            StatType::Configuration(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_scalar_mut(&mut self) -> Option<&mut dyn ScalarAssignable> {
        match self {
            StatType::Scalar(s) => Some(s),
            StatType::Configuration(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_entry_indexed(&self) -> Option<&dyn EntryIndexed> {
        match self {
            StatType::Vector(v) => Some(v),
            StatType::Distribution(d) => Some(d),
            StatType::Histogram(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_entry_indexed_mut(&mut self) -> Option<&mut dyn EntryIndexed> {
        match self {
            StatType::Vector(v) => Some(v),
            StatType::Distribution(d) => Some(d),
            StatType::Histogram(h) => Some(h),
            _ => None,
        }
    }

    pub fn id(&self) -> &str {
        self.as_accumulator().id()
    }

    pub fn kind(&self) -> StatKind {
        self.as_accumulator().kind()
    }

    pub fn repeat(&self) -> u32 {
        self.as_accumulator().repeat()
    }

    pub fn phase_name(&self) -> &'static str {
        self.as_accumulator().phase_name()
    }

    pub fn is_uninitialized(&self) -> bool {
        self.as_accumulator().is_uninitialized()
    }

    pub fn is_reduced(&self) -> bool {
        self.as_accumulator().is_reduced()
    }

    /// Assigns a single raw value. Fails with `ProtocolMismatchError` on an
    /// entry-indexed variable.
    pub fn set_scalar(&mut self, raw: &str) -> Result<(), StatsError> {
        let (id, kind) = (self.id().to_string(), self.kind());
        match self.as_scalar_mut() {
            Some(scalar) => scalar.assign(raw),
            None => Err(StatsError::ProtocolMismatchError {
                id,
                expected: kind,
                found: "scalar assignment".to_string(),
            }),
        }
    }

    /// Appends one sample built from `batch`. Fails with `ProtocolMismatchError`
    /// on a scalar-assignable variable.
    pub fn set_entries(&mut self, batch: &EntryBatch) -> Result<(), StatsError> {
        let (id, kind) = (self.id().to_string(), self.kind());
        match self.as_entry_indexed_mut() {
            Some(indexed) => indexed.set_content(batch),
            None => Err(StatsError::ProtocolMismatchError {
                id,
                expected: kind,
                found: "entry content".to_string(),
            }),
        }
    }

    pub fn apply_default(&mut self) -> Result<(), StatsError> {
        self.as_accumulator_mut().apply_default()
    }

    pub fn balance(&mut self) -> Result<(), StatsError> {
        self.as_accumulator_mut().balance()
    }

    pub fn reduce(&mut self) -> Result<(), StatsError> {
        self.as_accumulator_mut().reduce()
    }

    /// The reduced value. Scalar kinds ignore `key`; entry-indexed kinds need one.
    pub fn reduced_value(&self, key: Option<&str>) -> Result<StatValue, StatsError> {
        if let Some(scalar) = self.as_scalar() {
            return scalar.reduced_value();
        }
        match (self.as_entry_indexed(), key) {
            (Some(indexed), Some(key)) => indexed.reduced_entry(key).map(StatValue::Number),
            _ if !self.is_reduced() => Err(StatsError::IllegalStateError {
                id: self.id().to_string(),
                operation: "read the reduced value",
                phase: self.phase_name(),
            }),
            _ => Err(StatsError::UnknownEntryError {
                id: self.id().to_string(),
                key: String::new(),
            }),
        }
    }

    /// Output entries; empty for scalar kinds.
    pub fn entries(&self) -> Vec<String> {
        self.as_entry_indexed()
            .map(|indexed| indexed.entries())
            .unwrap_or_default()
    }

    /// Output column names: `id` for scalar kinds, `id..entry` per entry otherwise.
    pub fn columns(&self) -> Vec<String> {
        match self.as_entry_indexed() {
            None => vec![self.id().to_string()],
            Some(indexed) => indexed
                .entries()
                .iter()
                .map(|entry| format!("{}{}{}", self.id(), COLUMN_SEPARATOR, entry))
                .collect(),
        }
    }

    /// Reduced values aligned with `columns()`.
    pub fn reduced_row(&self) -> Result<Vec<StatValue>, StatsError> {
        match self.as_entry_indexed() {
            None => Ok(vec![self.reduced_value(None)?]),
            Some(indexed) => indexed
                .entries()
                .iter()
                .map(|entry| indexed.reduced_entry(entry).map(StatValue::Number))
                .collect(),
        }
    }
}

// In: src/reduction.rs

//! Per-dump reduction: balance and reduce every decoded accumulator, then
//! flatten them into one ordered row.

use serde::{Deserialize, Serialize};

use crate::error::StatsError;
use crate::stat_types::StatSet;
use crate::types::StatValue;

/// One output row: ordered column names with their reduced values.
///
/// Columns follow configuration order, each entry-indexed variable expanding
/// to `id..entry` in `entries()` order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DumpRow {
    pub columns: Vec<String>,
    pub values: Vec<StatValue>,
}

impl DumpRow {
    pub fn get(&self, column: &str) -> Option<&StatValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    /// `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StatValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn extend(&mut self, columns: Vec<String>, values: Vec<StatValue>) {
        self.columns.extend(columns);
        self.values.extend(values);
    }
}

/// Balances, reduces and flattens every variable of a decoded dump.
pub fn reduce_dump(stats: &mut StatSet) -> Result<DumpRow, StatsError> {
    for stat in stats.iter_mut() {
        stat.balance()?;
        stat.reduce()?;
    }

    let mut row = DumpRow::default();
    for stat in stats.iter() {
        row.extend(stat.columns(), stat.reduced_row()?);
    }
    log_metric!("event" = "reduce_dump", "variables" = stats.len(), "columns" = row.len());
    Ok(row)
}

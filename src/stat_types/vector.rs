use crate::config::VariableConfig;
use crate::error::StatsError;
use crate::stat_types::lifecycle::Phase;
use crate::stat_types::samples::{sum_emissions, EntryBatch, KeyedSamples, KeyedTotals};
use crate::stat_types::traits::{Accumulator, EntryIndexed};
use crate::stat_types::ReducedEntries;
use crate::types::StatKind;

/// Summary keys gem5 appends to most vectors. Unrequested ones are dropped quietly.
const STANDARD_SUMMARY_KEYS: [&str; 5] = ["total", "mean", "samples", "stdev", "gmean"];

/// Named entries with one numeric value each (per-core counters, per-region cycles).
///
/// Only the configured entries are kept; anything else in the dump is skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    id: String,
    repeat: u32,
    entries: Vec<String>,
    phase: Phase<KeyedSamples, ReducedEntries>,
}

impl Vector {
    pub fn new<S: Into<String>>(
        id: impl Into<String>,
        repeat: u32,
        entries: impl IntoIterator<Item = S>,
    ) -> Self {
        let entries: Vec<String> = entries.into_iter().map(Into::into).collect();
        Self {
            id: id.into(),
            repeat,
            phase: Phase::new(KeyedSamples::with_keys(&entries)),
            entries,
        }
    }

    /// `statisticsOnly` vectors take their entries from `statistics`.
    pub(crate) fn from_config(var: &VariableConfig) -> Result<Self, StatsError> {
        let entries = if var.statistics_only {
            var.statistics.clone().unwrap_or_default()
        } else {
            var.vector_entries
                .clone()
                .or_else(|| var.entries.clone())
                .ok_or_else(|| {
                    StatsError::config(var.id.clone(), "vector requires 'vectorEntries'")
                })?
        };
        Ok(Self::new(var.id.clone(), var.repeat, entries))
    }
}

impl Accumulator for Vector {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> StatKind {
        StatKind::Vector
    }

    fn repeat(&self) -> u32 {
        self.repeat
    }

    fn phase_name(&self) -> &'static str {
        self.phase.name()
    }

    fn is_uninitialized(&self) -> bool {
        self.phase.is_uninitialized()
    }

    fn is_reduced(&self) -> bool {
        self.phase.is_reduced()
    }

    fn apply_default(&mut self) -> Result<(), StatsError> {
        self.phase.accumulate(&self.id)?;
        Ok(())
    }

    fn balance(&mut self) -> Result<(), StatsError> {
        let (id, repeat) = (&self.id, self.repeat);
        self.phase.balance(id, |samples| samples.balance(id, repeat))
    }

    fn reduce(&mut self) -> Result<(), StatsError> {
        let repeat = self.repeat;
        let entries = &self.entries;
        self.phase.reduce(&self.id, |samples| {
            let mut values = KeyedTotals::default();
            for entry in entries {
                values.add(entry, samples.mean(entry, repeat));
            }
            Ok(ReducedEntries::new(entries.clone(), values))
        })
    }
}

impl EntryIndexed for Vector {
    fn set_content(&mut self, batch: &EntryBatch) -> Result<(), StatsError> {
        let samples = self.phase.accumulate(&self.id)?;
        let mut unknown = Vec::new();
        for (key, raws) in batch.iter() {
            if self.entries.iter().any(|e| e == key) {
                samples.push(key, sum_emissions(&self.id, key, raws)?);
            } else if !STANDARD_SUMMARY_KEYS.contains(&key) {
                unknown.push(key);
            }
        }
        if !unknown.is_empty() {
            log::warn!(
                "VECTOR {}: entries in dump differ from configured entries {:?}; skipping {:?}",
                self.id,
                self.entries,
                unknown
            );
        }
        Ok(())
    }

    fn entries(&self) -> Vec<String> {
        self.entries.clone()
    }

    fn reduced_entry(&self, key: &str) -> Result<f64, StatsError> {
        self.phase.reduced(&self.id)?.get(&self.id, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(pairs: &[(&str, &str)]) -> EntryBatch {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_same_key_emissions_are_summed() {
        let mut vector = Vector::new("cacheMiss", 1, ["0"]);
        vector
            .set_content(&batch(&[("0", "10"), ("0", "5")]))
            .unwrap();
        vector.balance().unwrap();
        vector.reduce().unwrap();
        assert_eq!(vector.reduced_entry("0").unwrap(), 15.0);
    }

    #[test]
    fn test_unconfigured_entries_are_skipped() {
        let mut vector = Vector::new("v", 1, ["0", "1"]);
        vector
            .set_content(&batch(&[("0", "1"), ("7", "3"), ("total", "4")]))
            .unwrap();
        vector.balance().unwrap();
        vector.reduce().unwrap();
        assert_eq!(vector.entries(), vec!["0", "1"]);
        assert_eq!(vector.reduced_entry("1").unwrap(), 0.0);
        assert!(matches!(
            vector.reduced_entry("7"),
            Err(StatsError::UnknownEntryError { .. })
        ));
    }

    #[test]
    fn test_mean_over_padded_repeat() {
        let mut vector = Vector::new("v", 4, ["0"]);
        vector.set_content(&batch(&[("0", "8")])).unwrap();
        vector.set_content(&batch(&[("0", "4")])).unwrap();
        vector.balance().unwrap();
        vector.reduce().unwrap();
        // (8 + 4 + 0 + 0) / 4
        assert_eq!(vector.reduced_entry("0").unwrap(), 3.0);
    }

    #[test]
    fn test_more_samples_than_repeat_overflows() {
        let mut vector = Vector::new("v", 1, ["0"]);
        vector.set_content(&batch(&[("0", "1")])).unwrap();
        vector.set_content(&batch(&[("0", "2")])).unwrap();
        assert!(matches!(
            vector.balance(),
            Err(StatsError::AggregationOverflowError { .. })
        ));
    }

    #[test]
    fn test_missing_entries_config_is_rejected() {
        let var = VariableConfig::new("v", "vector");
        assert!(matches!(
            Vector::from_config(&var),
            Err(StatsError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_statistics_only_uses_statistics_as_entries() {
        let var = VariableConfig::new("v", "vector")
            .with_statistics(["total"])
            .statistics_only();
        let vector = Vector::from_config(&var).unwrap();
        assert_eq!(vector.entries(), vec!["total"]);
    }
}

// In: src/stat_types/histogram.rs

//! The Histogram accumulator: range-keyed buckets (`system.mem::0-1023`)
//! plus optional summary statistics (`::samples`, `::mean`).
//!
//! Raw buckets are accumulated per sample exactly like a Distribution. At
//! reduction time they are either averaged per key, or, when `bins` and
//! `max_range` are configured, rebinned sample by sample onto a fixed uniform
//! layout (see `rebin`) and then averaged, so every dump yields the same columns
//! no matter how gem5 sized its buckets for that run.

use crate::config::VariableConfig;
use crate::error::StatsError;
use crate::stat_types::lifecycle::Phase;
use crate::stat_types::rebin::RebinLayout;
use crate::stat_types::samples::{sum_emissions, EntryBatch, KeyedSamples, KeyedTotals};
use crate::stat_types::traits::{Accumulator, EntryIndexed};
use crate::stat_types::ReducedEntries;
use crate::types::StatKind;

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    id: String,
    repeat: u32,
    bins: u32,
    max_range: f64,
    layout: Option<RebinLayout>,
    entries_override: Option<Vec<String>>,
    statistics: Vec<String>,
    phase: Phase<KeyedSamples, ReducedEntries>,
}

impl Histogram {
    /// A histogram reporting its raw buckets. Use the `with_*` builders to
    /// enable rebinning, pick explicit entries or carry statistics.
    pub fn new(id: impl Into<String>, repeat: u32) -> Self {
        Self {
            id: id.into(),
            repeat,
            bins: 0,
            max_range: 0.0,
            layout: None,
            entries_override: None,
            statistics: Vec::new(),
            phase: Phase::default(),
        }
    }

    pub fn with_rebinning(mut self, bins: u32, max_range: f64) -> Self {
        self.bins = bins;
        self.max_range = max_range;
        self.layout = RebinLayout::new(bins, max_range);
        self
    }

    pub fn with_entries<S: Into<String>>(mut self, entries: impl IntoIterator<Item = S>) -> Self {
        let entries: Vec<String> = entries.into_iter().map(Into::into).collect();
        self.entries_override = if entries.is_empty() { None } else { Some(entries) };
        self
    }

    /// Statistics are registered up front so their columns exist even in dumps
    /// that never emit them.
    pub fn with_statistics<S: Into<String>>(
        mut self,
        statistics: impl IntoIterator<Item = S>,
    ) -> Self {
        let statistics: Vec<String> = statistics.into_iter().map(Into::into).collect();
        if let Phase::Uninitialized(samples) = &mut self.phase {
            for stat in &statistics {
                samples.register(stat);
            }
        }
        self.statistics = statistics;
        self
    }

    pub(crate) fn from_config(var: &VariableConfig) -> Result<Self, StatsError> {
        if !(var.max_range >= 0.0) || !var.max_range.is_finite() {
            return Err(StatsError::config(
                var.id.clone(),
                format!("max_range must be a finite, non-negative number, got {}", var.max_range),
            ));
        }
        let statistics = var
            .statistics
            .clone()
            .or_else(|| var.vector_entries.clone())
            .unwrap_or_default();

        let histogram = Self::new(var.id.clone(), var.repeat).with_statistics(statistics);
        if var.statistics_only {
            return Ok(histogram);
        }
        Ok(histogram
            .with_rebinning(var.bins, var.max_range)
            .with_entries(var.entries.clone().unwrap_or_default()))
    }

    pub fn bins(&self) -> u32 {
        self.bins
    }

    pub fn max_range(&self) -> f64 {
        self.max_range
    }

    pub fn statistics(&self) -> &[String] {
        &self.statistics
    }

    /// Resolves the output entries against the given raw samples:
    /// explicit entries, else the rebinned layout, else the sorted raw keys;
    /// statistics are appended when missing.
    fn resolve_entries(&self, samples: Option<&KeyedSamples>) -> Vec<String> {
        let mut entries = if let Some(explicit) = &self.entries_override {
            explicit.clone()
        } else if let Some(layout) = &self.layout {
            layout.labels()
        } else {
            let mut raw: Vec<String> = samples
                .map(|s| s.keys().map(str::to_string).collect())
                .unwrap_or_default();
            raw.sort();
            raw
        };
        for stat in &self.statistics {
            if !entries.contains(stat) {
                entries.push(stat.clone());
            }
        }
        entries
    }
}

impl Accumulator for Histogram {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> StatKind {
        StatKind::Histogram
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
        let entries = self.resolve_entries(self.phase.content());
        let repeat = self.repeat;
        let layout = self.layout.clone();

        self.phase.reduce(&self.id, move |samples| {
            let mut values = KeyedTotals::with_keys(&entries);
            match &layout {
                Some(layout) => {
                    for index in 0..repeat as usize {
                        let sample = samples
                            .keys()
                            .map(|key| (key, samples.sample(key, index)));
                        for (key, value) in layout.rebin(sample).iter() {
                            values.add(key, value);
                        }
                    }
                    values.scale(1.0 / f64::from(repeat));
                }
                None => {
                    for key in samples.keys() {
                        values.add(key, samples.mean(key, repeat));
                    }
                }
            }
            Ok(ReducedEntries::new(entries, values))
        })
    }
}

impl EntryIndexed for Histogram {
    fn set_content(&mut self, batch: &EntryBatch) -> Result<(), StatsError> {
        let mut summed = Vec::with_capacity(batch.len());
        for (key, raws) in batch.iter() {
            summed.push((key, sum_emissions(&self.id, key, raws)?));
        }
        let samples = self.phase.accumulate(&self.id)?;
        for (key, value) in summed {
            samples.push(key, value);
        }
        Ok(())
    }

    fn entries(&self) -> Vec<String> {
        match &self.phase {
            Phase::Reduced(reduced) => reduced.entries().to_vec(),
            phase => self.resolve_entries(phase.content()),
        }
    }

    fn reduced_entry(&self, key: &str) -> Result<f64, StatsError> {
        self.phase.reduced(&self.id)?.get(&self.id, key)
    }
}

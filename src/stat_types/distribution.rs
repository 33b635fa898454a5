use crate::config::VariableConfig;
use crate::error::StatsError;
use crate::stat_types::lifecycle::Phase;
use crate::stat_types::samples::{sum_emissions, EntryBatch, KeyedSamples, KeyedTotals};
use crate::stat_types::traits::{Accumulator, EntryIndexed};
use crate::stat_types::ReducedEntries;
use crate::types::StatKind;

pub const UNDERFLOWS: &str = "underflows";
pub const OVERFLOWS: &str = "overflows";

/// Bucketed frequencies with integer bucket keys.
///
/// With `minimum`/`maximum` configured the bucket set is fixed
/// (`underflows`, `min..=max`, `overflows`); without them, buckets are
/// discovered from the dumps. Configured `statistics` always get a column.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    id: String,
    repeat: u32,
    bounds: Option<(i64, i64)>,
    statistics: Vec<String>,
    phase: Phase<KeyedSamples, ReducedEntries>,
}

impl Distribution {
    pub fn new(
        id: impl Into<String>,
        repeat: u32,
        bounds: Option<(i64, i64)>,
        statistics: Vec<String>,
    ) -> Self {
        let mut samples = KeyedSamples::default();
        if let Some((minimum, maximum)) = bounds {
            samples.register(UNDERFLOWS);
            for bucket in minimum..=maximum {
                samples.register(&bucket.to_string());
            }
            samples.register(OVERFLOWS);
        }
        for stat in &statistics {
            samples.register(stat);
        }
        Self {
            id: id.into(),
            repeat,
            bounds,
            statistics,
            phase: Phase::new(samples),
        }
    }

    pub(crate) fn from_config(var: &VariableConfig) -> Result<Self, StatsError> {
        let statistics = var
            .statistics
            .clone()
            .or_else(|| var.vector_entries.clone())
            .unwrap_or_default();
        let bounds = if var.statistics_only {
            None
        } else {
            match (var.minimum, var.maximum) {
                (Some(minimum), Some(maximum)) if minimum <= maximum => Some((minimum, maximum)),
                (Some(minimum), Some(maximum)) => {
                    return Err(StatsError::config(
                        var.id.clone(),
                        format!("minimum {} is greater than maximum {}", minimum, maximum),
                    ))
                }
                (None, None) => None,
                _ => {
                    return Err(StatsError::config(
                        var.id.clone(),
                        "distribution needs both 'minimum' and 'maximum', or neither",
                    ))
                }
            }
        };
        Ok(Self::new(var.id.clone(), var.repeat, bounds, statistics))
    }

    pub fn bounds(&self) -> Option<(i64, i64)> {
        self.bounds
    }
}

/// Decides where a raw key goes: `Ok(true)` store, `Ok(false)` skip.
fn admits(
    id: &str,
    bounds: Option<(i64, i64)>,
    samples: &KeyedSamples,
    key: &str,
) -> Result<bool, StatsError> {
    let (minimum, maximum) = match bounds {
        Some(bounds) => bounds,
        None => return Ok(true),
    };
    if samples.contains(key) {
        return Ok(true);
    }
    match key.trim().parse::<i64>() {
        Ok(bucket) => Err(StatsError::BucketOutOfRangeError {
            id: id.to_string(),
            bucket,
            minimum,
            maximum,
        }),
        Err(_) => Ok(false),
    }
}

impl Accumulator for Distribution {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> StatKind {
        StatKind::Distribution
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
        self.phase.reduce(&self.id, |samples| {
            let entries: Vec<String> = samples.keys().map(str::to_string).collect();
            let mut values = KeyedTotals::default();
            for entry in &entries {
                values.add(entry, samples.mean(entry, repeat));
            }
            Ok(ReducedEntries::new(entries, values))
        })
    }
}

impl EntryIndexed for Distribution {
    fn set_content(&mut self, batch: &EntryBatch) -> Result<(), StatsError> {
        let (id, bounds) = (&self.id, self.bounds);
        // The whole batch is checked before the phase moves to `Accumulating`.
        let mut accepted = Vec::with_capacity(batch.len());
        if let Some(samples) = self.phase.content() {
            for (key, raws) in batch.iter() {
                if admits(id, bounds, samples, key)? {
                    accepted.push((key, sum_emissions(id, key, raws)?));
                } else {
                    log::debug!("DISTRIBUTION {}: skipping unconfigured key '{}'", id, key);
                }
            }
        }
        let samples = self.phase.accumulate(id)?;
        for (key, value) in accepted {
            samples.push(key, value);
        }
        Ok(())
    }

    fn entries(&self) -> Vec<String> {
        let mut entries: Vec<String> = match &self.phase {
            Phase::Reduced(reduced) => reduced.entries().to_vec(),
            phase => phase
                .content()
                .map(|samples| samples.keys().map(str::to_string).collect())
                .unwrap_or_default(),
        };
        for stat in &self.statistics {
            if !entries.contains(stat) {
                entries.push(stat.clone());
            }
        }
        entries
    }

    fn reduced_entry(&self, key: &str) -> Result<f64, StatsError> {
        self.phase.reduced(&self.id)?.get(&self.id, key)
    }
}

//! Ordered, keyed storage shared by the entry-indexed accumulators.
//!
//! Column order matters downstream, so every container here remembers the
//! order in which keys were first seen. Lookups go through a `hashbrown`
//! index.

use hashbrown::HashMap;

use crate::error::StatsError;

//==================================================================================
// 1. Raw Emissions (decoder -> accumulator)
//==================================================================================

/// The raw, still-textual values one dump emitted for one entry-indexed
/// variable, grouped by entry key.
///
/// A key appearing more than once means several sources (cores, controllers)
/// emitted it; the accumulator sums them into a single sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryBatch {
    keys: Vec<String>,
    values: HashMap<String, Vec<String>>,
}

impl EntryBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, raw_value: impl Into<String>) {
        let key = key.into();
        if !self.values.contains_key(&key) {
            self.keys.push(key.clone());
        }
        self.values.entry(key).or_default().push(raw_value.into());
    }

    /// Iterates `(key, raw values)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.keys
            .iter()
            .filter_map(|k| self.values.get(k).map(|v| (k.as_str(), v.as_slice())))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EntryBatch {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut batch = EntryBatch::new();
        for (k, v) in iter {
            batch.push(k, v);
        }
        batch
    }
}

/// Parses one raw value as a number.
pub(crate) fn coerce(id: &str, key: &str, raw: &str) -> Result<f64, StatsError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| StatsError::ValueCoercionError {
            id: id.to_string(),
            key: key.to_string(),
            value: raw.to_string(),
        })
}

/// Collapses the multi-source emissions of one key into one sample.
pub(crate) fn sum_emissions(id: &str, key: &str, raws: &[String]) -> Result<f64, StatsError> {
    let mut total = 0.0;
    for raw in raws {
        total += coerce(id, key, raw)?;
    }
    Ok(total)
}

//==================================================================================
// 2. Accumulated Samples
//==================================================================================

/// Entry key -> samples accumulated so far in this dump (at most `repeat` once balanced).
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct KeyedSamples {
    keys: Vec<String>,
    samples: HashMap<String, Vec<f64>>,
}

impl KeyedSamples {
    pub fn with_keys<S: AsRef<str>>(keys: impl IntoIterator<Item = S>) -> Self {
        let mut samples = Self::default();
        for key in keys {
            samples.register(key.as_ref());
        }
        samples
    }

    /// Makes sure `key` exists (with no samples) so it is balanced and emitted.
    pub fn register(&mut self, key: &str) {
        if !self.samples.contains_key(key) {
            self.keys.push(key.to_string());
            self.samples.insert(key.to_string(), Vec::new());
        }
    }

    pub fn push(&mut self, key: &str, value: f64) {
        self.register(key);
        if let Some(list) = self.samples.get_mut(key) {
            list.push(value);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.samples.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&[f64]> {
        self.samples.get(key).map(Vec::as_slice)
    }

    /// The value of sample `index` for `key`, or `0.0` when missing.
    pub fn sample(&self, key: &str, index: usize) -> f64 {
        self.get(key)
            .and_then(|list| list.get(index).copied())
            .unwrap_or(0.0)
    }

    /// Right-pads every key to exactly `repeat` samples with `0.0`.
    ///
    /// Fails if any key already holds more than `repeat` samples, which means
    /// more dumps or sources matched than the configuration declared. On
    /// failure no key has been padded.
    pub fn balance(&mut self, id: &str, repeat: u32) -> Result<(), StatsError> {
        let target = repeat as usize;
        for key in &self.keys {
            if let Some(list) = self.samples.get(key) {
                if list.len() > target {
                    return Err(StatsError::AggregationOverflowError {
                        id: id.to_string(),
                        key: key.clone(),
                        len: list.len(),
                        repeat,
                    });
                }
            }
        }
        for list in self.samples.values_mut() {
            list.resize(target, 0.0);
        }
        Ok(())
    }

    /// Arithmetic mean of the first `repeat` samples of `key`.
    pub fn mean(&self, key: &str, repeat: u32) -> f64 {
        let list = match self.get(key) {
            Some(list) if !list.is_empty() => list,
            _ => return 0.0,
        };
        let total: f64 = list.iter().take(repeat as usize).sum();
        total / f64::from(repeat)
    }
}

//==================================================================================
// 3. Reduced Totals
//==================================================================================

/// Ordered key -> reduced value. Adding to an existing key accumulates.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct KeyedTotals {
    keys: Vec<String>,
    totals: HashMap<String, f64>,
}

impl KeyedTotals {
    pub fn with_keys<S: AsRef<str>>(keys: impl IntoIterator<Item = S>) -> Self {
        let mut totals = Self::default();
        for key in keys {
            totals.add(key.as_ref(), 0.0);
        }
        totals
    }

    pub fn add(&mut self, key: &str, value: f64) {
        match self.totals.get_mut(key) {
            Some(total) => *total += value,
            None => {
                self.keys.push(key.to_string());
                self.totals.insert(key.to_string(), value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.totals.get(key).copied()
    }

    pub fn scale(&mut self, factor: f64) {
        for total in self.totals.values_mut() {
            *total *= factor;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.keys
            .iter()
            .filter_map(|k| self.totals.get(k).map(|v| (k.as_str(), *v)))
    }

    #[cfg(test)]
    pub fn sum(&self) -> f64 {
        self.totals.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_batch_keeps_first_seen_order_and_groups_duplicates() {
        let batch: EntryBatch = vec![("b", "1"), ("a", "2"), ("b", "3")].into_iter().collect();
        let collected: Vec<_> = batch.iter().collect();
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0].0, "b");
        assert_eq!(collected[0].1, &["1".to_string(), "3".to_string()]);
        assert_eq!(collected[1].0, "a");
    }

    #[test]
    fn test_sum_emissions_rejects_non_numeric() {
        let raws = vec!["10".to_string(), "five".to_string()];
        let err = sum_emissions("v", "0", &raws).unwrap_err();
        assert!(matches!(err, StatsError::ValueCoercionError { .. }));

        let raws = vec!["10".to_string(), " 5 ".to_string()];
        assert_eq!(sum_emissions("v", "0", &raws).unwrap(), 15.0);
    }

    #[test]
    fn test_balance_pads_every_key_to_repeat() {
        for repeat in 1..=4u32 {
            for k in 0..=repeat {
                let mut samples = KeyedSamples::with_keys(["stat"]);
                for i in 0..k {
                    samples.push("x", f64::from(i + 1));
                }
                samples.balance("v", repeat).unwrap();
                assert_eq!(samples.get("x").map(|l| l.len()).unwrap_or(repeat as usize), repeat as usize);
                assert_eq!(samples.get("stat").unwrap().len(), repeat as usize);

                let expected: f64 = (1..=k).map(f64::from).sum::<f64>() / f64::from(repeat);
                if k > 0 {
                    assert!((samples.mean("x", repeat) - expected).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_balance_overflow_is_reported_with_key() {
        let mut samples = KeyedSamples::default();
        samples.push("0", 1.0);
        samples.push("0", 2.0);
        let err = samples.balance("v", 1).unwrap_err();
        match err {
            StatsError::AggregationOverflowError { key, len, repeat, .. } => {
                assert_eq!(key, "0");
                assert_eq!(len, 2);
                assert_eq!(repeat, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_failed_balance_pads_nothing() {
        let mut samples = KeyedSamples::with_keys(["early"]);
        samples.push("late", 1.0);
        samples.push("late", 2.0);
        samples.push("late", 3.0);
        assert!(samples.balance("v", 2).is_err());
        // "early" comes first in key order but was not padded either.
        assert_eq!(samples.get("early").unwrap().len(), 0);
        assert_eq!(samples.get("late").unwrap().len(), 3);
    }

    #[test]
    fn test_keyed_totals_accumulate_on_collision() {
        let mut totals = KeyedTotals::with_keys(["a"]);
        totals.add("a", 2.0);
        totals.add("b", 1.0);
        totals.add("a", 3.0);
        totals.scale(0.5);
        assert_eq!(totals.get("a"), Some(2.5));
        assert_eq!(totals.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(totals.sum(), 3.0);
    }
}

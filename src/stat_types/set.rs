//! The per-dump set of accumulators, in configuration order with lookup by id.

use hashbrown::HashMap;

use crate::error::StatsError;
use crate::stat_types::StatType;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatSet {
    stats: Vec<StatType>,
    index: HashMap<String, usize>,
}

impl StatSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stats: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Appends `stat`; ids must be unique within a set.
    pub fn insert(&mut self, stat: StatType) -> Result<(), StatsError> {
        if self.index.contains_key(stat.id()) {
            return Err(StatsError::config(
                stat.id(),
                "duplicate variable id in configuration",
            ));
        }
        self.index.insert(stat.id().to_string(), self.stats.len());
        self.stats.push(stat);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&StatType> {
        self.index.get(id).map(|&i| &self.stats[i])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut StatType> {
        match self.index.get(id) {
            Some(&i) => self.stats.get_mut(i),
            None => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatType> {
        self.stats.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StatType> {
        self.stats.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

//! Registry of accumulator constructors, keyed by configuration type name.
//!
//! The default registry knows the five built-in kinds. Callers can register
//! additional names (aliases, or custom constructors producing one of the
//! built-in variants) without touching the decoder.

use std::fmt;

use hashbrown::HashMap;

use crate::config::{ParseConfig, VariableConfig};
use crate::error::StatsError;
use crate::stat_types::{
    Configuration, Distribution, Histogram, Scalar, StatSet, StatType, Vector,
};
use crate::types::StatKind;

/// Builds one accumulator from its configuration.
pub type StatTypeBuilder = fn(&VariableConfig) -> Result<StatType, StatsError>;

#[derive(Clone)]
pub struct StatTypeRegistry {
    builders: HashMap<String, StatTypeBuilder>,
}

impl StatTypeRegistry {
    /// A registry without any type. Mostly useful for tests.
    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Registers `builder` under `name` (case-insensitive), replacing any
    /// previous entry.
    pub fn register(&mut self, name: &str, builder: StatTypeBuilder) {
        self.builders.insert(name.to_ascii_lowercase(), builder);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(&name.to_ascii_lowercase())
    }

    /// Registered type names, sorted.
    pub fn types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds a fresh, uninitialized accumulator for `var`.
    pub fn build(&self, var: &VariableConfig) -> Result<StatType, StatsError> {
        if var.repeat == 0 {
            return Err(StatsError::config(var.id.clone(), "repeat must be at least 1"));
        }
        let builder = self
            .builders
            .get(&var.kind.to_ascii_lowercase())
            .ok_or_else(|| {
                StatsError::config(
                    var.id.clone(),
                    format!(
                        "unknown type '{}', available types: {}",
                        var.kind,
                        self.types().join(", ")
                    ),
                )
            })?;
        builder(var)
    }

    /// Builds one accumulator per configured variable, in configuration order.
    pub fn build_all(&self, config: &ParseConfig) -> Result<StatSet, StatsError> {
        if config.variables.is_empty() {
            return Err(StatsError::config("<config>", "vars to parse is empty"));
        }
        let mut set = StatSet::with_capacity(config.variables.len());
        for var in &config.variables {
            set.insert(self.build(var)?)?;
        }
        log::debug!("built {} accumulators", set.len());
        Ok(set)
    }
}

impl fmt::Debug for StatTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatTypeRegistry")
            .field("types", &self.types())
            .finish()
    }
}

impl Default for StatTypeRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for kind in StatKind::ALL {
            let builder: StatTypeBuilder = match kind {
                StatKind::Scalar => build_scalar,
                StatKind::Configuration => build_configuration,
                StatKind::Vector => build_vector,
                StatKind::Distribution => build_distribution,
                StatKind::Histogram => build_histogram,
            };
            registry.register(kind.name(), builder);
        }
        registry
    }
}

fn build_scalar(var: &VariableConfig) -> Result<StatType, StatsError> {
    Scalar::from_config(var).map(StatType::Scalar)
}

fn build_configuration(var: &VariableConfig) -> Result<StatType, StatsError> {
    Configuration::from_config(var).map(StatType::Configuration)
}

fn build_vector(var: &VariableConfig) -> Result<StatType, StatsError> {
    Vector::from_config(var).map(StatType::Vector)
}

fn build_distribution(var: &VariableConfig) -> Result<StatType, StatsError> {
    Distribution::from_config(var).map(StatType::Distribution)
}

fn build_histogram(var: &VariableConfig) -> Result<StatType, StatsError> {
    Histogram::from_config(var).map(StatType::Histogram)
}

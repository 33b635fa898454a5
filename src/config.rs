// In: src/config.rs

//! The single source of truth for the variables a parse run extracts.
//!
//! `ParseConfig` is created once at the application boundary (from a JSON file,
//! a JSON string, or programmatically) and then handed by reference to every
//! per-dump invocation. There is no process-wide cache: two runs with different
//! configurations never observe each other.

use std::fs;
use std::path::Path;

use hashbrown::HashSet;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StatsError;
use crate::stat_types::StatTypeRegistry;

//==================================================================================
// I. Per-Variable Configuration
//==================================================================================

/// The declarative description of one requested statistic.
///
/// Type-specific parameters are all optional here; the registry decides which
/// ones a given `type` requires and reports a `ConfigurationError` when one is
/// missing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VariableConfig {
    /// The variable identifier as it appears in the dump (`system.cpu.numCycles`).
    #[serde(alias = "name")]
    pub id: String,

    /// The registry name of the accumulator kind (`"scalar"`, `"vector"`, ...).
    #[serde(rename = "type")]
    pub kind: String,

    /// Samples expected per dump.
    #[serde(default = "default_repeat")]
    pub repeat: u32,

    /// Vector entries. Accepts a list or a comma-separated string.
    #[serde(
        default,
        rename = "vectorEntries",
        deserialize_with = "deserialize_entry_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub vector_entries: Option<Vec<String>>,

    /// Explicit entry override (histogram), or vector entries when
    /// `vectorEntries` is absent.
    #[serde(
        default,
        deserialize_with = "deserialize_entry_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub entries: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,

    /// Target bucket count for histogram rebinning; `0` disables rebinning.
    #[serde(default)]
    pub bins: u32,

    /// Upper bound of the rebinned range; `0.0` disables rebinning.
    #[serde(default)]
    pub max_range: f64,

    /// Auxiliary summary keys (`mean`, `samples`, ...) carried through reduction.
    #[serde(
        default,
        deserialize_with = "deserialize_entry_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub statistics: Option<Vec<String>>,

    /// Extract only the summary statistics of a compound variable.
    #[serde(default, rename = "statisticsOnly", alias = "statistics_only")]
    pub statistics_only: bool,

    /// Value a configuration variable takes when the dump never sets it.
    #[serde(
        default,
        rename = "onEmpty",
        alias = "on_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub on_empty: Option<String>,
}

impl VariableConfig {
    /// A bare configuration of the given registry `kind`, with every optional
    /// parameter unset.
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            repeat: default_repeat(),
            vector_entries: None,
            entries: None,
            minimum: None,
            maximum: None,
            bins: 0,
            max_range: 0.0,
            statistics: None,
            statistics_only: false,
            on_empty: None,
        }
    }

    pub fn scalar(id: impl Into<String>) -> Self {
        Self::new(id, "scalar")
    }

    pub fn configuration(id: impl Into<String>, on_empty: impl Into<String>) -> Self {
        let mut var = Self::new(id, "configuration");
        var.on_empty = Some(on_empty.into());
        var
    }

    pub fn vector<S: Into<String>>(id: impl Into<String>, entries: impl IntoIterator<Item = S>) -> Self {
        let mut var = Self::new(id, "vector");
        var.vector_entries = Some(entries.into_iter().map(Into::into).collect());
        var
    }

    pub fn distribution(id: impl Into<String>) -> Self {
        Self::new(id, "distribution")
    }

    pub fn histogram(id: impl Into<String>) -> Self {
        Self::new(id, "histogram")
    }

    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_bounds(mut self, minimum: i64, maximum: i64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    pub fn with_rebinning(mut self, bins: u32, max_range: f64) -> Self {
        self.bins = bins;
        self.max_range = max_range;
        self
    }

    pub fn with_entries<S: Into<String>>(mut self, entries: impl IntoIterator<Item = S>) -> Self {
        self.entries = Some(entries.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_statistics<S: Into<String>>(
        mut self,
        statistics: impl IntoIterator<Item = S>,
    ) -> Self {
        self.statistics = Some(statistics.into_iter().map(Into::into).collect());
        self
    }

    pub fn statistics_only(mut self) -> Self {
        self.statistics_only = true;
        self
    }
}

//==================================================================================
// II. The Unified ParseConfig
//==================================================================================

/// The full set of variables extracted from every dump of a parse run.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ParseConfig {
    /// Output columns follow this order.
    pub variables: Vec<VariableConfig>,
}

impl ParseConfig {
    pub fn new(variables: Vec<VariableConfig>) -> Self {
        Self { variables }
    }

    /// Decodes and validates a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, StatsError> {
        let config: ParseConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, decodes and validates a configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StatsError> {
        let raw = fs::read_to_string(path.as_ref())?;
        log::debug!("loaded parse configuration from {}", path.as_ref().display());
        Self::from_json_str(&raw)
    }

    /// Checks everything that can be checked before the first dump is decoded:
    /// the variable set is non-empty, ids are unique, and every variable can be
    /// built by the default registry.
    pub fn validate(&self) -> Result<(), StatsError> {
        if self.variables.is_empty() {
            return Err(StatsError::config("<config>", "vars to parse is empty"));
        }

        let registry = StatTypeRegistry::default();
        let mut seen = HashSet::with_capacity(self.variables.len());
        for var in &self.variables {
            if !seen.insert(var.id.as_str()) {
                return Err(StatsError::config(
                    var.id.clone(),
                    "duplicate variable id in configuration",
                ));
            }
            registry.build(var)?;
        }
        Ok(())
    }
}

//==================================================================================
// III. Serde Helpers
//==================================================================================

/// Helper for `serde` to default `repeat` to a single sample.
fn default_repeat() -> u32 {
    1
}

/// Entry lists arrive either as JSON arrays or as `"a, b, c"` strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum EntryListRepr {
    List(Vec<String>),
    Csv(String),
}

fn deserialize_entry_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = Option::<EntryListRepr>::deserialize(deserializer)?;
    Ok(repr.map(|repr| match repr {
        EntryListRepr::List(list) => list,
        EntryListRepr::Csv(csv) => csv
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_applies_defaults_and_aliases() {
        let json = r#"{
            "variables": [
                { "id": "simTicks", "type": "scalar" },
                { "name": "cacheMiss", "type": "vector", "vectorEntries": "0, 1", "repeat": 2 },
                { "id": "lat", "type": "histogram", "bins": 5, "max_range": 100.0,
                  "statistics": ["mean", "samples"] },
                { "id": "isa", "type": "configuration", "onEmpty": "unknown" }
            ]
        }"#;

        let config = ParseConfig::from_json_str(json).unwrap();
        assert_eq!(config.variables.len(), 4);
        assert_eq!(config.variables[0].repeat, 1);
        assert_eq!(config.variables[1].id, "cacheMiss");
        assert_eq!(
            config.variables[1].vector_entries,
            Some(vec!["0".to_string(), "1".to_string()])
        );
        assert_eq!(config.variables[1].repeat, 2);
        assert_eq!(config.variables[2].bins, 5);
        assert_eq!(config.variables[3].on_empty.as_deref(), Some("unknown"));
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let config = ParseConfig::new(vec![
            VariableConfig::scalar("simTicks"),
            VariableConfig::scalar("simTicks"),
        ]);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, StatsError::ConfigurationError { .. }));
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_validate_rejects_empty_and_unknown_types() {
        assert!(ParseConfig::default().validate().is_err());

        let config = ParseConfig::new(vec![VariableConfig::new("x", "matrix")]);
        assert!(matches!(
            config.validate(),
            Err(StatsError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_vector_without_entries_is_rejected_at_load_time() {
        let json = r#"{ "variables": [ { "id": "v", "type": "vector" } ] }"#;
        assert!(matches!(
            ParseConfig::from_json_str(json),
            Err(StatsError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_malformed_json_surfaces_serde_error() {
        let err = ParseConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, StatsError::SerdeJson(_)));
    }
}

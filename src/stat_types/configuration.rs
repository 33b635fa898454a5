use crate::config::VariableConfig;
use crate::error::StatsError;
use crate::stat_types::lifecycle::Phase;
use crate::stat_types::traits::{Accumulator, ScalarAssignable};
use crate::types::{StatKind, StatValue};

/// The text a configuration variable takes when a dump never sets it.
pub const DEFAULT_ON_EMPTY: &str = "None";

/// A textual, run-describing value (`system.cpu.isa`, a policy name).
///
/// Carried through reduction unchanged; an absent or empty value becomes `on_empty`.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    id: String,
    repeat: u32,
    on_empty: String,
    phase: Phase<Option<String>, String>,
}

impl Configuration {
    pub fn new(id: impl Into<String>, repeat: u32, on_empty: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            repeat,
            on_empty: on_empty.into(),
            phase: Phase::default(),
        }
    }

    pub(crate) fn from_config(var: &VariableConfig) -> Result<Self, StatsError> {
        let on_empty = match var.on_empty.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => DEFAULT_ON_EMPTY,
        };
        Ok(Self::new(var.id.clone(), var.repeat, on_empty))
    }

    pub fn on_empty(&self) -> &str {
        &self.on_empty
    }

    fn resolve(&self, value: Option<&String>) -> String {
        match value {
            Some(text) if !text.is_empty() => text.clone(),
            _ => self.on_empty.clone(),
        }
    }
}

impl Accumulator for Configuration {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> StatKind {
        StatKind::Configuration
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
        let current = self.phase.content().cloned().flatten();
        let resolved = self.resolve(current.as_ref());
        *self.phase.accumulate(&self.id)? = Some(resolved);
        Ok(())
    }

    fn balance(&mut self) -> Result<(), StatsError> {
        self.phase.balance(&self.id, |_| Ok(()))
    }

    fn reduce(&mut self) -> Result<(), StatsError> {
        let on_empty = self.on_empty.clone();
        self.phase.reduce(&self.id, |value| {
            Ok(match value {
                Some(text) if !text.is_empty() => text.clone(),
                _ => on_empty,
            })
        })
    }
}

impl ScalarAssignable for Configuration {
    fn assign(&mut self, raw: &str) -> Result<(), StatsError> {
        *self.phase.accumulate(&self.id)? = Some(raw.trim().to_string());
        Ok(())
    }

    fn reduced_value(&self) -> Result<StatValue, StatsError> {
        self.phase
            .reduced(&self.id)
            .map(|text| StatValue::Text(text.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reduced(mut conf: Configuration) -> StatValue {
        conf.apply_default().unwrap();
        conf.balance().unwrap();
        conf.reduce().unwrap();
        conf.reduced_value().unwrap()
    }

    #[test]
    fn test_text_is_carried_through() {
        let mut conf = Configuration::new("isa", 1, "unknown");
        conf.assign("X86").unwrap();
        assert_eq!(reduced(conf), StatValue::from("X86"));
    }

    #[test]
    fn test_missing_value_uses_on_empty() {
        let conf = Configuration::new("isa", 1, "unknown");
        assert_eq!(reduced(conf), StatValue::from("unknown"));
    }

    #[test]
    fn test_empty_value_uses_on_empty() {
        let mut conf = Configuration::new("isa", 1, "unknown");
        conf.assign("").unwrap();
        assert_eq!(reduced(conf), StatValue::from("unknown"));
    }

    #[test]
    fn test_config_without_on_empty_defaults_to_none_text() {
        let var = VariableConfig::new("isa", "configuration");
        let conf = Configuration::from_config(&var).unwrap();
        assert_eq!(conf.on_empty(), DEFAULT_ON_EMPTY);
        assert_eq!(reduced(conf), StatValue::from("None"));
    }
}

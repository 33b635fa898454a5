use crate::config::VariableConfig;
use crate::error::StatsError;
use crate::stat_types::lifecycle::Phase;
use crate::stat_types::samples::coerce;
use crate::stat_types::traits::{Accumulator, ScalarAssignable};
use crate::types::{StatKind, StatValue};

/// A single numeric value per dump (`simTicks`, `system.cpu.numCycles`).
#[derive(Debug, Clone, PartialEq)]
pub struct Scalar {
    id: String,
    repeat: u32,
    phase: Phase<Option<f64>, f64>,
}

impl Scalar {
    pub fn new(id: impl Into<String>, repeat: u32) -> Self {
        Self {
            id: id.into(),
            repeat,
            phase: Phase::default(),
        }
    }

    pub(crate) fn from_config(var: &VariableConfig) -> Result<Self, StatsError> {
        Ok(Self::new(var.id.clone(), var.repeat))
    }
}

impl Accumulator for Scalar {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> StatKind {
        StatKind::Scalar
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
        if self.phase.is_uninitialized() {
            *self.phase.accumulate(&self.id)? = Some(0.0);
        }
        Ok(())
    }

    fn balance(&mut self) -> Result<(), StatsError> {
        self.phase.balance(&self.id, |_| Ok(()))
    }

    fn reduce(&mut self) -> Result<(), StatsError> {
        self.phase.reduce(&self.id, |value| Ok(value.unwrap_or(0.0)))
    }
}

impl ScalarAssignable for Scalar {
    fn assign(&mut self, raw: &str) -> Result<(), StatsError> {
        let value = coerce(&self.id, "", raw)?;
        *self.phase.accumulate(&self.id)? = Some(value);
        Ok(())
    }

    fn reduced_value(&self) -> Result<StatValue, StatsError> {
        self.phase.reduced(&self.id).map(|v| StatValue::Number(*v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut scalar = Scalar::new("simTicks", 1);
        scalar.assign("10").unwrap();
        scalar.assign("99").unwrap();
        scalar.balance().unwrap();
        scalar.reduce().unwrap();
        assert_eq!(scalar.reduced_value().unwrap().to_string(), "99");
    }

    #[test]
    fn test_non_numeric_value_is_a_coercion_error() {
        let mut scalar = Scalar::new("simTicks", 1);
        let err = scalar.assign("not_a_number").unwrap_err();
        assert!(matches!(err, StatsError::ValueCoercionError { .. }));
        assert!(scalar.is_uninitialized());
    }

    #[test]
    fn test_default_is_zero() {
        let mut scalar = Scalar::new("simTicks", 1);
        scalar.apply_default().unwrap();
        scalar.balance().unwrap();
        scalar.reduce().unwrap();
        assert_eq!(scalar.reduced_value().unwrap(), StatValue::Number(0.0));
    }

    #[test]
    fn test_reduced_value_requires_balance_then_reduce() {
        let mut scalar = Scalar::new("simTicks", 1);
        scalar.assign("1.5").unwrap();
        assert!(matches!(
            scalar.reduced_value(),
            Err(StatsError::IllegalStateError { .. })
        ));
        assert!(scalar.reduce().is_err());
        scalar.balance().unwrap();
        assert!(scalar.reduced_value().is_err());
        scalar.reduce().unwrap();
        assert_eq!(scalar.reduced_value().unwrap().as_f64(), Some(1.5));
    }
}

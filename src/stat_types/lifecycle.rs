//! The accumulator lifecycle: `Uninitialized -> Accumulating -> Balanced -> Reduced`.
//!
//! Each phase owns the data that is valid in it. Accumulated content lives in
//! the first three phases; the reduced value only exists inside `Reduced`, so a
//! read before reduction has nothing to return and reports `IllegalStateError`.

use crate::error::StatsError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Phase<C, R> {
    /// Constructed, nothing written yet in this dump.
    Uninitialized(C),
    /// At least one write (or default) applied.
    Accumulating(C),
    /// Padded to `repeat`; no more writes.
    Balanced(C),
    /// Collapsed to the final representative value.
    Reduced(R),
}

impl<C: Default, R> Default for Phase<C, R> {
    fn default() -> Self {
        Phase::Uninitialized(C::default())
    }
}

impl<C: Default, R> Phase<C, R> {
    pub fn new(content: C) -> Self {
        Phase::Uninitialized(content)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Uninitialized(_) => "uninitialized",
            Phase::Accumulating(_) => "accumulating",
            Phase::Balanced(_) => "balanced",
            Phase::Reduced(_) => "reduced",
        }
    }

    pub fn is_uninitialized(&self) -> bool {
        matches!(self, Phase::Uninitialized(_))
    }

    pub fn is_reduced(&self) -> bool {
        matches!(self, Phase::Reduced(_))
    }

    /// The content, readable in every phase before `Reduced`.
    pub fn content(&self) -> Option<&C> {
        match self {
            Phase::Uninitialized(c) | Phase::Accumulating(c) | Phase::Balanced(c) => Some(c),
            Phase::Reduced(_) => None,
        }
    }

    /// Grants write access to the content, moving `Uninitialized` to `Accumulating`.
    pub fn accumulate(&mut self, id: &str) -> Result<&mut C, StatsError> {
        if let Phase::Uninitialized(c) = self {
            let content = std::mem::take(c);
            *self = Phase::Accumulating(content);
        }
        match self {
            Phase::Accumulating(c) => Ok(c),
            other => Err(illegal(id, "write content", other.name())),
        }
    }

    /// Runs `pad` over the content and moves to `Balanced`. Legal exactly once.
    pub fn balance<F>(&mut self, id: &str, pad: F) -> Result<(), StatsError>
    where
        F: FnOnce(&mut C) -> Result<(), StatsError>,
    {
        match self {
            Phase::Uninitialized(c) | Phase::Accumulating(c) => {
                pad(c)?;
                let content = std::mem::take(c);
                *self = Phase::Balanced(content);
                Ok(())
            }
            other => Err(illegal(id, "balance", other.name())),
        }
    }

    /// Collapses the balanced content with `collapse` and moves to `Reduced`.
    /// Legal exactly once, and only after `balance`.
    pub fn reduce<F>(&mut self, id: &str, collapse: F) -> Result<(), StatsError>
    where
        F: FnOnce(&C) -> Result<R, StatsError>,
    {
        match self {
            Phase::Balanced(c) => {
                let reduced = collapse(c)?;
                *self = Phase::Reduced(reduced);
                Ok(())
            }
            other => Err(illegal(id, "reduce", other.name())),
        }
    }

    pub fn reduced(&self, id: &str) -> Result<&R, StatsError> {
        match self {
            Phase::Reduced(r) => Ok(r),
            other => Err(illegal(id, "read the reduced value", other.name())),
        }
    }
}

fn illegal(id: &str, operation: &'static str, phase: &'static str) -> StatsError {
    StatsError::IllegalStateError {
        id: id.to_string(),
        operation,
        phase,
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// A fully reduced value, ready to be written into one cell of the output table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Text(String),
}

impl StatValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

/// Numbers use the shortest round-trip form, so `99.0` renders as `99`.
impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for StatValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<String> for StatValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for StatValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display_drops_trailing_zero() {
        assert_eq!(StatValue::Number(99.0).to_string(), "99");
        assert_eq!(StatValue::Number(204.8).to_string(), "204.8");
        assert_eq!(StatValue::from("None").to_string(), "None");
    }
}

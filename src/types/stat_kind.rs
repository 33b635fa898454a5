//! This module defines the canonical, type-safe representation of the statistic
//! kinds a variable can be configured as, and of the tags carried by wire lines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The configured kind of a variable.
///
/// This enum replaces run-time type-name comparisons: the decoder and the
/// reduction step match on it to pick buffering and reduction strategies.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Scalar,
    Configuration,
    Vector,
    Distribution,
    Histogram,
}

impl StatKind {
    /// Every kind, in registry order.
    pub const ALL: [StatKind; 5] = [
        StatKind::Scalar,
        StatKind::Configuration,
        StatKind::Vector,
        StatKind::Distribution,
        StatKind::Histogram,
    ];

    /// The lowercase name used in configuration files and the registry.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Configuration => "configuration",
            Self::Vector => "vector",
            Self::Distribution => "distribution",
            Self::Histogram => "histogram",
        }
    }

    /// Returns `true` for kinds that hold one value assigned directly.
    pub fn is_scalar_assignable(&self) -> bool {
        matches!(self, Self::Scalar | Self::Configuration)
    }

    /// Returns `true` for kinds keyed by `base::entry` sub-identifiers.
    pub fn is_entry_indexed(&self) -> bool {
        matches!(self, Self::Vector | Self::Distribution | Self::Histogram)
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StatKind {
    type Err = String;

    /// Case-insensitive, so `"Vector"` and `"vector"` both resolve.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        StatKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| format!("unknown stat type '{}'", s))
    }
}

/// The type tag leading every wire line (`Type/Identifier/Value`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineTag {
    Scalar,
    Configuration,
    Vector,
    Distribution,
    Histogram,
    Summary,
}

impl LineTag {
    /// Parses a raw tag, ignoring case. Returns `None` for tags this crate does not know.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "scalar" => Some(Self::Scalar),
            "configuration" => Some(Self::Configuration),
            "vector" => Some(Self::Vector),
            "distribution" => Some(Self::Distribution),
            "histogram" => Some(Self::Histogram),
            "summary" => Some(Self::Summary),
            _ => None,
        }
    }

    /// Returns `true` for tags whose identifier carries a `::entry` suffix.
    pub fn is_compound(&self) -> bool {
        matches!(self, Self::Vector | Self::Distribution | Self::Histogram)
    }

    /// Decides whether a compound line with this tag may feed a variable of `kind`.
    ///
    /// The configured kind wins over the raw tag: a generic `Histogram` tag feeds
    /// any entry-indexed variable, and `Vector`-tagged summary lines
    /// (`::samples`, `::mean`) feed distributions and histograms.
    pub fn accepts(&self, kind: StatKind) -> bool {
        match self {
            Self::Histogram => kind.is_entry_indexed(),
            Self::Vector => kind.is_entry_indexed(),
            Self::Distribution => kind == StatKind::Distribution,
            Self::Scalar | Self::Configuration => kind.is_scalar_assignable(),
            Self::Summary => true,
        }
    }
}

impl fmt::Display for LineTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

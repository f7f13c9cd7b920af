use crate::ast::SourceLocation;
use crate::core::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of the detector that produced a finding.
///
/// Declaration order is the default execution order, which is also the order
/// `detectorCounts` is reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectorId {
    Reentrancy,
    OverflowUnderflow,
    UncheckedCall,
    AccessControl,
    /// Synthetic id for isolated detector faults.
    DetectorError,
}

impl DetectorId {
    pub const BUILTIN: [DetectorId; 4] = [
        DetectorId::Reentrancy,
        DetectorId::OverflowUnderflow,
        DetectorId::UncheckedCall,
        DetectorId::AccessControl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reentrancy => "reentrancy",
            Self::OverflowUnderflow => "overflow-underflow",
            Self::UncheckedCall => "unchecked-call",
            Self::AccessControl => "access-control",
            Self::DetectorError => "detector-error",
        }
    }
}

impl fmt::Display for DetectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectorId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "reentrancy" => Ok(Self::Reentrancy),
            "overflow-underflow" => Ok(Self::OverflowUnderflow),
            "unchecked-call" => Ok(Self::UncheckedCall),
            "access-control" => Ok(Self::AccessControl),
            "detector-error" => Ok(Self::DetectorError),
            other => Err(format!("unknown detector '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl From<SourceLocation> for Position {
    fn from(loc: SourceLocation) -> Self {
        Self {
            line: loc.line,
            column: loc.column,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub detector: DetectorId,

    pub severity: Severity,

    pub description: String,

    pub details: String,

    pub line: usize,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub function: Option<String>,

    /// Every state change flagged by the reentrancy detector.
    #[serde(
        rename = "stateChangesLocations",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub extra_locations: Option<Vec<Position>>,
}

impl Finding {
    pub fn new(
        detector: DetectorId,
        severity: Severity,
        description: impl Into<String>,
        details: impl Into<String>,
        line: usize,
    ) -> Self {
        Self {
            detector,
            severity,
            description: description.into(),
            details: details.into(),
            line,
            function: None,
            extra_locations: None,
        }
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    pub fn with_extra_locations(mut self, locations: Vec<Position>) -> Self {
        self.extra_locations = Some(locations);
        self
    }
}

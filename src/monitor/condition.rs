//! Threshold conditions evaluated against the latest sample.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::MonitorError;

/// Condition kind of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Holds when value >= threshold
    Over,
    /// Holds when value <= threshold
    Under,
    /// Always holds
    Any,
    /// Never holds
    #[serde(rename = "none")]
    Never,
}

impl Condition {
    /// Evaluate the condition. Comparisons are exact, with no tolerance.
    #[inline]
    pub fn evaluate(&self, value: f64, threshold: f64) -> bool {
        match self {
            Condition::Over => value >= threshold,
            Condition::Under => value <= threshold,
            Condition::Any => true,
            Condition::Never => false,
        }
    }

    /// Keyword used in configuration files.
    pub fn keyword(&self) -> &'static str {
        match self {
            Condition::Over => "over",
            Condition::Under => "under",
            Condition::Any => "any",
            Condition::Never => "none",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Condition {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "over" => Ok(Condition::Over),
            "under" => Ok(Condition::Under),
            "any" => Ok(Condition::Any),
            "none" => Ok(Condition::Never),
            other => Err(MonitorError::config_error(format!(
                "unknown condition '{}' (expected over, under, any or none)",
                other
            ))),
        }
    }
}

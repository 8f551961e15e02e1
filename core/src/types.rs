//! Shared primitive types used across the entire engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a sales agent within one snapshot.
pub type AgentId = u32;

/// Stable identifier of a customer within one snapshot.
pub type CustomerId = u32;

/// Name of a grouping key: a hub, region or country.
pub type GroupKey = String;

/// Alert severity. Declaration order is priority order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    /// Sort rank: lower ranks sort first.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::Warning  => 1,
            Self::Info     => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning  => "warning",
            Self::Info     => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum VehicleSegment {
    Sedan,
    Suv,
    Pickup,
    Hatchback,
    Premium,
}

impl VehicleSegment {
    pub const ALL: [VehicleSegment; 5] = [
        Self::Sedan,
        Self::Suv,
        Self::Pickup,
        Self::Hatchback,
        Self::Premium,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sedan     => "Sedan",
            Self::Suv       => "SUV",
            Self::Pickup    => "Pickup",
            Self::Hatchback => "Hatchback",
            Self::Premium   => "Premium",
        }
    }
}

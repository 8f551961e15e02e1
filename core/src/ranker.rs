//! Alert ranker: one deterministic order for the merged alert list.

use crate::{model::Alert, types::Severity};
use serde::{Deserialize, Serialize};

/// Critical first, then warning, then info; newest first within a
/// severity. The sort is stable, so exact ties keep emission order.
pub fn rank(mut alerts: Vec<Alert>) -> Vec<Alert> {
    alerts.sort_by(|a, b| {
        a.severity
            .rank()
            .cmp(&b.severity.rank())
            .then_with(|| b.timestamp.cmp(&a.timestamp))
    });
    alerts
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub warning:  usize,
    pub info:     usize,
}

impl SeverityCounts {
    pub fn total(&self) -> usize {
        self.critical + self.warning + self.info
    }
}

pub fn count_by_severity(alerts: &[Alert]) -> SeverityCounts {
    let mut counts = SeverityCounts::default();
    for alert in alerts {
        match alert.severity {
            Severity::Critical => counts.critical += 1,
            Severity::Warning  => counts.warning += 1,
            Severity::Info     => counts.info += 1,
        }
    }
    counts
}

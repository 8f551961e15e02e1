//! Severity ladders: sorted threshold tables replacing if/else chains.

use crate::types::Severity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Larger values are worse.
    Above,
    /// Smaller values are worse.
    Below,
}

/// A value is classified by the most extreme step it crosses.
/// Steps are kept ordered most-extreme first.
#[derive(Debug, Clone, PartialEq)]
pub struct SeverityLadder {
    direction: Direction,
    inclusive: bool,
    steps:     Vec<(f64, Severity)>,
}

impl SeverityLadder {
    /// Triggers when the value is above a step (`>=` if inclusive).
    pub fn above(inclusive: bool) -> Self {
        Self { direction: Direction::Above, inclusive, steps: Vec::new() }
    }

    /// Triggers when the value is below a step (`<=` if inclusive).
    pub fn below(inclusive: bool) -> Self {
        Self { direction: Direction::Below, inclusive, steps: Vec::new() }
    }

    pub fn step(mut self, threshold: f64, severity: Severity) -> Self {
        self.steps.push((threshold, severity));
        match self.direction {
            Direction::Above => self.steps.sort_by(|a, b| b.0.total_cmp(&a.0)),
            Direction::Below => self.steps.sort_by(|a, b| a.0.total_cmp(&b.0)),
        }
        self
    }

    fn crosses(&self, value: f64, threshold: f64) -> bool {
        match (self.direction, self.inclusive) {
            (Direction::Above, true)  => value >= threshold,
            (Direction::Above, false) => value > threshold,
            (Direction::Below, true)  => value <= threshold,
            (Direction::Below, false) => value < threshold,
        }
    }

    /// None when no step is crossed or the value is not finite.
    pub fn classify(&self, value: f64) -> Option<Severity> {
        if !value.is_finite() {
            return None;
        }
        self.steps
            .iter()
            .find(|(threshold, _)| self.crosses(value, *threshold))
            .map(|(_, severity)| *severity)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drop_ladder() -> SeverityLadder {
        SeverityLadder::below(false)
            .step(-10.0, Severity::Warning)
            .step(-20.0, Severity::Critical)
    }

    #[test]
    fn below_ladder_picks_most_extreme_step() {
        let ladder = drop_ladder();
        assert_eq!(ladder.classify(-30.0), Some(Severity::Critical));
        assert_eq!(ladder.classify(-20.0), Some(Severity::Warning));
        assert_eq!(ladder.classify(-10.5), Some(Severity::Warning));
        assert_eq!(ladder.classify(-10.0), None);
        assert_eq!(ladder.classify(5.0), None);
    }

    #[test]
    fn inclusive_above_ladder_triggers_on_boundary() {
        let ladder = SeverityLadder::above(true)
            .step(15.0, Severity::Warning)
            .step(25.0, Severity::Critical);
        assert_eq!(ladder.classify(14.0), None);
        assert_eq!(ladder.classify(15.0), Some(Severity::Warning));
        assert_eq!(ladder.classify(25.0), Some(Severity::Critical));
    }

    #[test]
    fn non_finite_values_never_classify() {
        let ladder = drop_ladder();
        assert_eq!(ladder.classify(f64::NAN), None);
        assert_eq!(ladder.classify(f64::NEG_INFINITY), None);
    }

    #[test]
    fn exhaustive_drop_grid_is_monotone() {
        let ladder = drop_ladder();
        for tenth in -500..=200 {
            let drop = f64::from(tenth) / 10.0;
            let expected = if drop < -20.0 {
                Some(Severity::Critical)
            } else if drop < -10.0 {
                Some(Severity::Warning)
            } else {
                None
            };
            assert_eq!(ladder.classify(drop), expected, "drop={drop}");
        }
    }
}

//! Rule trait, evaluation context and the rule catalog.
//!
//! RULE: Every detection rule implements AlertRule.
//! Rules are independent and stateless: each reads the context and
//! returns its alerts. Execution order does not matter because the
//! ranker re-sorts the merged output.
//!
//! RULE: A rule that cannot compute for a group (missing data,
//! zero denominator) skips that group. A rule never fails the pass.

pub mod agent;
pub mod hub;
pub mod portfolio;

use crate::{
    aggregate::{aggregate, AggregateRow, GroupBy},
    config::{ThresholdKey, Thresholds},
    model::{Alert, AlertEntity, RuleId},
    period::DateRange,
    snapshot::Snapshot,
    types::GroupKey,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which dashboard a rule feeds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// Cross-hub trends for executives.
    Strategic,
    /// Agent and stock issues for hub managers.
    Operational,
}

/// The contract every detection rule must fulfil.
pub trait AlertRule: Send + Sync {
    /// Unique stable identity of this rule.
    fn id(&self) -> RuleId;

    fn audience(&self) -> Audience;

    /// Scan the context and return zero or more alerts.
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Alert>;
}

/// Everything a rule may read during one pass.
pub struct RuleContext<'a> {
    /// Already scoped to the viewer.
    pub snapshot:   &'a Snapshot,
    pub period:     DateRange,
    /// Hub aggregates for `period`.
    pub current:    BTreeMap<GroupKey, AggregateRow>,
    /// Hub aggregates for `period.previous()`.
    pub previous:   BTreeMap<GroupKey, AggregateRow>,
    pub thresholds: &'a Thresholds,
    /// Stamp for every alert of the pass.
    pub now:        DateTime<Utc>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        snapshot: &'a Snapshot,
        period: DateRange,
        thresholds: &'a Thresholds,
        now: DateTime<Utc>,
    ) -> Self {
        let current = aggregate(&snapshot.daily_metrics, GroupBy::Hub, &period);
        let previous = aggregate(&snapshot.daily_metrics, GroupBy::Hub, &period.previous());
        Self {
            snapshot,
            period,
            current,
            previous,
            thresholds,
            now,
        }
    }

    pub fn threshold(&self, key: ThresholdKey) -> f64 {
        self.thresholds.get(key)
    }

    /// Hub entity with its country, when the snapshot knows it.
    pub fn hub_entity(&self, hub: &str) -> AlertEntity {
        let country = self
            .snapshot
            .daily_metrics
            .iter()
            .find(|r| r.hub == hub)
            .map(|r| r.country.clone());
        AlertEntity::Hub {
            country,
            hub: hub.to_string(),
        }
    }
}

/// An ordered collection of rules evaluated together.
pub struct RuleSet {
    rules: Vec<Box<dyn AlertRule>>,
}

impl RuleSet {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Every rule in the catalog.
    pub fn full() -> Self {
        let mut rules = hub::rules();
        rules.extend(agent::rules());
        rules.extend(portfolio::rules());
        Self { rules }
    }

    /// Only the rules feeding one dashboard.
    pub fn for_audience(audience: Audience) -> Self {
        let full = Self::full();
        Self {
            rules: full
                .rules
                .into_iter()
                .filter(|r| r.audience() == audience)
                .collect(),
        }
    }

    pub fn with(mut self, rule: Box<dyn AlertRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn ids(&self) -> Vec<RuleId> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule and merge the output in rule order (unranked).
    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Alert> {
        let mut alerts = Vec::new();
        for rule in &self.rules {
            let emitted = rule.evaluate(ctx);
            log::debug!("rule={} emitted={}", rule.id().as_str(), emitted.len());
            alerts.extend(emitted);
        }
        alerts
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::full()
    }
}

/// `"A, B, C and 2 more"`: the first three names plus a remainder.
pub fn list_names(names: &[String]) -> String {
    let shown = names.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
    if names.len() > 3 {
        format!("{shown} and {} more", names.len() - 3)
    } else {
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_names_truncates_after_three() {
        let names: Vec<String> = ["Ana", "Luis", "Sofía", "Diego", "Marta"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(list_names(&names), "Ana, Luis, Sofía and 2 more");
        assert_eq!(list_names(&names[..2]), "Ana, Luis");
    }

    #[test]
    fn full_set_has_unique_ids() {
        let ids = RuleSet::full().ids();
        let unique: std::collections::BTreeSet<_> = ids.iter().collect();
        assert_eq!(ids.len(), unique.len());
        assert_eq!(ids.len(), 16);
    }
}

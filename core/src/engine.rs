//! The alert engine: one detection pass over a snapshot.
//!
//! PASS ORDER (fixed):
//!   1. Scope the snapshot to the viewer
//!   2. Aggregate hubs for the current and previous window
//!   3. Run every rule in the rule set
//!   4. Rank the merged alerts
//!
//! RULES:
//!   - A pass is a pure function of (snapshot, scope, period,
//!     thresholds, clock). No state survives between passes.
//!   - One instant is read from the clock per pass; every alert in
//!     the pass carries it.

use crate::{
    clock::EvalClock,
    config::{PulseConfig, Thresholds},
    model::Alert,
    period::DateRange,
    ranker::{count_by_severity, rank, SeverityCounts},
    rules::{Audience, RuleContext, RuleSet},
    scope::VisibilityScope,
    snapshot::Snapshot,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Output of one pass.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub period:       DateRange,
    pub scope:        VisibilityScope,
    pub evaluated_at: DateTime<Utc>,
    pub counts:       SeverityCounts,
    /// Ranked, most urgent first.
    pub alerts:       Vec<Alert>,
}

pub struct AlertEngine {
    thresholds: Thresholds,
    rules:      RuleSet,
    clock:      EvalClock,
}

impl AlertEngine {
    /// Engine with the full rule catalog and the wall clock.
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            rules: RuleSet::full(),
            clock: EvalClock::System,
        }
    }

    pub fn from_config(config: &PulseConfig) -> Self {
        Self::new(config.thresholds.clone())
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn for_audience(self, audience: Audience) -> Self {
        self.with_rules(RuleSet::for_audience(audience))
    }

    pub fn with_clock(mut self, clock: EvalClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Scope, evaluate and rank.
    pub fn evaluate(
        &self,
        snapshot: &Snapshot,
        scope: &VisibilityScope,
        period: DateRange,
    ) -> EvaluationReport {
        let scoped = snapshot.scoped(scope);
        let now = self.clock.now();
        let alerts = self.evaluate_at(&scoped, period, now);
        let counts = count_by_severity(&alerts);
        log::info!(
            "period={period} scope=[{scope}] alerts={} critical={} warning={} info={}",
            counts.total(),
            counts.critical,
            counts.warning,
            counts.info
        );
        EvaluationReport {
            period,
            scope: scope.clone(),
            evaluated_at: now,
            counts,
            alerts,
        }
    }

    /// Evaluate a snapshot that is already scoped. Returns ranked alerts.
    pub fn evaluate_scoped(&self, scoped: &Snapshot, period: DateRange) -> Vec<Alert> {
        self.evaluate_at(scoped, period, self.clock.now())
    }

    fn evaluate_at(&self, scoped: &Snapshot, period: DateRange, now: DateTime<Utc>) -> Vec<Alert> {
        let ctx = RuleContext::new(scoped, period, &self.thresholds, now);
        log::debug!(
            "evaluating {} rules over {} current / {} previous hub groups",
            self.rules.len(),
            ctx.current.len(),
            ctx.previous.len()
        );
        rank(self.rules.evaluate(&ctx))
    }
}

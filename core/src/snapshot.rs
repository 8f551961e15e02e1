//! Snapshot: the full in-memory tabular dataset for one evaluation.
//!
//! A snapshot is built once (generator or JSON ingestion) and then
//! only read. Ingestion validates every record before it can reach
//! the aggregator, so downstream code never sees a non-finite number.

use crate::{
    config::ValidationConfig,
    error::{PulseError, PulseResult},
    model::{AgentPerformanceRecord, CustomerRecord, DailyMetricRecord, InventoryRecord, Transaction},
    period::DateRange,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub snapshot_id:   Uuid,
    pub generated_on:  NaiveDate,
    pub seed:          u64,
    pub daily_metrics: Vec<DailyMetricRecord>,
    pub inventory:     Vec<InventoryRecord>,
    pub agents:        Vec<AgentPerformanceRecord>,
    pub customers:     Vec<CustomerRecord>,
}

/// Tolerated data-quality findings from `Snapshot::validate`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub funnel_violations:    usize,
    pub inventory_violations: usize,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.funnel_violations == 0 && self.inventory_violations == 0
    }
}

impl Snapshot {
    /// A snapshot with no records, for hand-built fixtures.
    pub fn empty(generated_on: NaiveDate) -> Self {
        Self {
            snapshot_id:   Uuid::nil(),
            generated_on,
            seed:          0,
            daily_metrics: Vec::new(),
            inventory:     Vec::new(),
            agents:        Vec::new(),
            customers:     Vec::new(),
        }
    }

    pub fn to_json(&self) -> PulseResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate. Malformed records fail the whole load.
    pub fn from_json(json: &str, policy: &ValidationConfig) -> PulseResult<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        snapshot.validate(policy)?;
        Ok(snapshot)
    }

    /// First to last record date of the daily metrics.
    pub fn date_span(&self) -> Option<DateRange> {
        let start = self.daily_metrics.iter().map(|r| r.date).min()?;
        let end = self.daily_metrics.iter().map(|r| r.date).max()?;
        Some(DateRange { start, end })
    }

    /// Distinct hub names present in the daily metrics.
    pub fn hubs(&self) -> BTreeSet<&str> {
        self.daily_metrics.iter().map(|r| r.hub.as_str()).collect()
    }

    pub fn agent(&self, agent_id: u32) -> Option<&AgentPerformanceRecord> {
        self.agents.iter().find(|a| a.agent_id == agent_id)
    }

    pub fn customer(&self, customer_id: u32) -> Option<&CustomerRecord> {
        self.customers.iter().find(|c| c.customer_id == customer_id)
    }

    pub fn record_count(&self) -> usize {
        self.daily_metrics.len() + self.inventory.len() + self.agents.len() + self.customers.len()
    }

    /// Reject contract violations, tolerate (and count) data-quality drift.
    ///
    /// Empty location names and non-finite numbers are always errors.
    /// Funnel non-monotonicity is an error only under `strict_funnel`;
    /// inventory over-allocation is only ever logged.
    pub fn validate(&self, policy: &ValidationConfig) -> PulseResult<ValidationReport> {
        let mut report = ValidationReport::default();

        for (i, r) in self.daily_metrics.iter().enumerate() {
            require_location("daily_metric", i, &r.country, &r.hub)?;
            for (field, value) in [
                ("revenue", r.revenue),
                ("ticket_avg", r.ticket_avg),
                ("full_margin", r.full_margin),
                ("fin_ins", r.fin_ins),
                ("kt", r.kt),
                ("pc1", r.pc1),
                ("ecac", r.ecac),
                ("cost_per_lead", r.cost_per_lead),
                ("efficiency", r.efficiency),
            ] {
                require_finite("daily_metric", i, field, value)?;
            }
            for (field, value) in [
                ("nps", r.nps),
                ("nps_buyer", r.nps_buyer),
                ("nps_seller", r.nps_seller),
                ("csat", r.csat),
                ("sla_lead_to_sale", r.sla_lead_to_sale),
            ] {
                if let Some(v) = value {
                    require_finite("daily_metric", i, field, v)?;
                }
            }

            if let Some(detail) = funnel_break(r.leads, r.appointments, r.reservations, r.sales) {
                if policy.strict_funnel {
                    return Err(PulseError::FunnelViolation {
                        hub: r.hub.clone(),
                        date: r.date,
                        detail,
                    });
                }
                report.funnel_violations += 1;
            }
        }

        for (i, r) in self.inventory.iter().enumerate() {
            require_location("inventory", i, &r.country, &r.hub)?;
            for (field, value) in [
                ("avg_days_in_inventory", r.avg_days_in_inventory),
                ("sell_rate_30d", r.sell_rate_30d),
                ("sell_rate_60d", r.sell_rate_60d),
                ("readiness", r.readiness),
            ] {
                require_finite("inventory", i, field, value)?;
            }
            let allocated = u64::from(r.available) + u64::from(r.reserved) + u64::from(r.vip);
            if allocated > u64::from(r.total_inventory) {
                report.inventory_violations += 1;
            }
        }

        for (i, a) in self.agents.iter().enumerate() {
            require_location("agent", i, &a.country, &a.hub)?;
            if a.agent_name.trim().is_empty() {
                return Err(malformed("agent", i, "empty agent_name"));
            }
            for (field, value) in [
                ("conversion", a.conversion),
                ("utilization", a.utilization),
                ("opportunity_conversion_pct", a.opportunity_conversion_pct),
                ("stock_avg_age", a.stock_avg_age),
                ("stock_attractiveness", a.stock_attractiveness),
                ("lead_match_score", a.lead_match_score),
                ("ownership_score", a.ownership_score),
                ("nps", a.nps),
                ("csat", a.csat),
                ("noshow", a.noshow),
                ("revenue", a.revenue),
                ("efficiency_composite", a.efficiency_composite),
                ("points.total", a.points.total),
            ] {
                require_finite("agent", i, field, value)?;
            }

            // Agents carry no lead stage in the same window as their
            // appointments, so only the lower funnel is checked.
            if a.sales > a.reservations || a.reservations > a.appointments {
                if policy.strict_funnel {
                    return Err(PulseError::FunnelViolation {
                        hub: a.hub.clone(),
                        date: self.generated_on,
                        detail: format!(
                            "agent {} has sales={} reservations={} appointments={}",
                            a.agent_id, a.sales, a.reservations, a.appointments
                        ),
                    });
                }
                report.funnel_violations += 1;
            }
        }

        for (i, c) in self.customers.iter().enumerate() {
            require_location("customer", i, &c.country, &c.hub)?;
            for t in &c.transactions {
                let price = match t {
                    Transaction::Sale { vehicle_price, .. }
                    | Transaction::Cancellation { vehicle_price, .. } => *vehicle_price,
                };
                require_finite("customer", i, "vehicle_price", price)?;
                require_finite("customer", i, "ancillaries_total", t.ancillaries_total())?;
            }
        }

        if report.funnel_violations > 0 {
            log::warn!(
                "snapshot={} tolerated {} non-monotone funnel rows",
                self.snapshot_id,
                report.funnel_violations
            );
        }
        if report.inventory_violations > 0 {
            log::warn!(
                "snapshot={} tolerated {} inventory rows with available+reserved+vip > total",
                self.snapshot_id,
                report.inventory_violations
            );
        }
        Ok(report)
    }
}

/// Describe the first broken funnel step, if any.
fn funnel_break(leads: u32, appointments: u32, reservations: u32, sales: u32) -> Option<String> {
    if sales > reservations {
        Some(format!("sales {sales} > reservations {reservations}"))
    } else if reservations > appointments {
        Some(format!("reservations {reservations} > appointments {appointments}"))
    } else if appointments > leads {
        Some(format!("appointments {appointments} > leads {leads}"))
    } else {
        None
    }
}

fn malformed(entity: &'static str, index: usize, reason: impl Into<String>) -> PulseError {
    PulseError::MalformedRecord {
        entity,
        index,
        reason: reason.into(),
    }
}

fn require_location(entity: &'static str, index: usize, country: &str, hub: &str) -> PulseResult<()> {
    if country.trim().is_empty() {
        return Err(malformed(entity, index, "empty country"));
    }
    if hub.trim().is_empty() {
        return Err(malformed(entity, index, "empty hub"));
    }
    Ok(())
}

fn require_finite(entity: &'static str, index: usize, field: &str, value: f64) -> PulseResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(malformed(entity, index, format!("{field} is not finite ({value})")))
    }
}

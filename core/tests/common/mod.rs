//! Hand-built snapshot fixtures shared by the integration tests.
#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use showroom_pulse_core::{
    kpi::{IncentiveTier, OptimizationQuadrant, PointBreakdown},
    model::{AgentPerformanceRecord, Alert, AlertDetail, AlertEntity, DailyMetricRecord, InventoryRecord, RuleId},
    period::DateRange,
    snapshot::Snapshot,
    types::{Severity, VehicleSegment},
};

pub const COUNTRY: &str = "México";
pub const REGION: &str = "Ciudad de México";

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn at(y: i32, m: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, day, hour, 0, 0).unwrap()
}

/// 2025-03-02..=2025-03-31. Its previous window is 2025-01-31..=2025-03-01.
pub fn march() -> DateRange {
    DateRange::trailing(d(2025, 3, 31), 30)
}

/// A day of hub metrics with a monotone funnel, no cancellations and a healthy NPS.
pub fn daily(date: NaiveDate, hub: &str, leads: u32, sales: u32) -> DailyMetricRecord {
    let appointments = (leads / 2).max(sales);
    DailyMetricRecord {
        date,
        country: COUNTRY.into(),
        region: REGION.into(),
        hub: hub.into(),
        leads,
        appointments,
        reservations: (appointments + sales) / 2,
        sales,
        purchases: sales,
        cancellations: 0,
        noshow: 0,
        nps: Some(75.0),
        nps_buyer: Some(72.0),
        nps_seller: Some(78.0),
        csat: Some(85.0),
        revenue: f64::from(sales) * 15_000.0,
        ticket_avg: 15_000.0,
        full_margin: 1_000.0,
        fin_ins: 1_700.0,
        kt: 200.0,
        pc1: 2_900.0,
        ecac: 400.0,
        cost_per_lead: 80.0,
        efficiency: 0.45,
        sla_lead_to_sale: Some(7.0),
    }
}

pub fn inventory(hub: &str, total: u32, aging_60_plus: u32) -> InventoryRecord {
    InventoryRecord {
        country: COUNTRY.into(),
        region: hub.into(),
        hub: hub.into(),
        segment: VehicleSegment::Suv,
        total_inventory: total,
        available: total * 7 / 10,
        reserved: total / 10,
        vip: total / 20,
        aging_0_30: total / 2,
        aging_30_60: total.saturating_sub(total / 2 + aging_60_plus),
        aging_60_plus,
        avg_days_in_inventory: 30.0,
        sell_rate_30d: 0.4,
        sell_rate_60d: 0.7,
        readiness: 0.9,
    }
}

/// An agent that trips no operational rule.
pub fn agent(agent_id: u32, name: &str, hub: &str) -> AgentPerformanceRecord {
    AgentPerformanceRecord {
        agent_id,
        agent_name: name.into(),
        country: COUNTRY.into(),
        region: REGION.into(),
        hub: hub.into(),
        leads: 100,
        appointments: 32,
        reservations: 16,
        sales: 10,
        conversion: 0.30,
        sales_only: 7,
        sales_tradein: 2,
        purchases_pure: 8,
        purchases_total: 10,
        slots_per_week: 40,
        available_slots: 8,
        utilization: 0.80,
        capacity_for_leads: 6,
        backlog_cartera: 10,
        total_opportunities: 42,
        opportunity_conversion_pct: 23.8,
        stock_assigned: 12,
        stock_avg_age: 20.0,
        stock_attractiveness: 75.0,
        lead_match_score: 80.0,
        insurance_sold: 5,
        insurance_penetration: 50.0,
        warranty_sold: 3,
        warranty_penetration: 30.0,
        ancillary_penetration: 40.0,
        financing_sold: 4,
        financing_penetration: 40.0,
        handoffs: 1,
        ownership_score: 90.0,
        nps: 75.0,
        csat: 85.0,
        noshow: 0.10,
        revenue: 220_000.0,
        revenue_per_slot: 6_875.0,
        points: PointBreakdown::default(),
        incentive_tier: IncentiveTier::Bronze,
        efficiency_composite: 55.0,
        quadrant: OptimizationQuadrant::Saturated,
    }
}

pub fn snapshot(
    daily_metrics: Vec<DailyMetricRecord>,
    inventory: Vec<InventoryRecord>,
    agents: Vec<AgentPerformanceRecord>,
) -> Snapshot {
    Snapshot {
        daily_metrics,
        inventory,
        agents,
        ..Snapshot::empty(d(2025, 3, 31))
    }
}

pub fn alert(severity: Severity, timestamp: DateTime<Utc>, title: &str) -> Alert {
    Alert::new(
        RuleId::AggregateAgedInventory,
        severity,
        AlertEntity::Scope,
        1.0,
        AlertDetail::AgentList { agents: 0 },
        timestamp,
    )
    .with_text(title, "")
}

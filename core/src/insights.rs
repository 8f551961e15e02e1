//! Dashboard view models built from a scoped snapshot.
//!
//! These are presentation-neutral: numbers and enums only, with
//! no formatting beyond what the caller chooses to do with them.

use crate::{
    aggregate::{aggregate, aggregate_total, hub_countries, AggregateRow, GroupBy},
    compare::{display_delta, Metric},
    config::{GoalMetric, IncentiveGoal, ThresholdKey, Thresholds},
    kpi::{agent_status, funnel_rates, ratio, AgentStatus, FunnelRates, IncentiveTier, OptimizationQuadrant},
    model::{AgentPerformanceRecord, CustomerRecord, CustomerStatus, Transaction},
    period::DateRange,
    snapshot::Snapshot,
    types::{AgentId, CustomerId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Executive summary ──────────────────────────────────────────────

/// A KPI with its previous-period value and display delta.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct KpiValue {
    pub value:     f64,
    pub previous:  Option<f64>,
    /// Percentage change; None when there is no baseline or no change.
    pub delta_pct: Option<f64>,
}

impl KpiValue {
    fn of(current: Option<f64>, previous: Option<f64>) -> Option<Self> {
        let value = current?;
        Some(Self {
            value,
            previous,
            delta_pct: previous.and_then(|p| display_delta(value, p)),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnitEconomics {
    pub ticket_avg:     Option<KpiValue>,
    pub full_margin:    Option<KpiValue>,
    pub fin_ins:        Option<KpiValue>,
    pub kt:             Option<KpiValue>,
    pub pc1:            Option<KpiValue>,
    pub ecac:           Option<KpiValue>,
    pub pc1_minus_ecac: Option<KpiValue>,
    pub cost_per_lead:  Option<KpiValue>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct InventoryTotals {
    pub total:         u32,
    pub available:     u32,
    pub reserved:      u32,
    pub vip:           u32,
    pub aging_60_plus: u32,
    /// Share of units older than 60 days, in percent.
    pub aging_pct:     f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HubRanking {
    pub hub:            String,
    pub country:        String,
    pub sales:          u64,
    pub revenue:        f64,
    pub conversion_pct: Option<f64>,
    pub nps:            Option<f64>,
    pub status:         Option<AgentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutiveSummary {
    pub period:           DateRange,
    pub sales:            Option<KpiValue>,
    pub purchases:        Option<KpiValue>,
    pub revenue:          Option<KpiValue>,
    pub leads:            Option<KpiValue>,
    pub conversion_pct:   Option<KpiValue>,
    pub cancellations:    Option<KpiValue>,
    pub nps:              Option<KpiValue>,
    pub csat:             Option<KpiValue>,
    pub sla_lead_to_sale: Option<KpiValue>,
    pub unit_economics:   UnitEconomics,
    pub funnel:           FunnelRates,
    pub inventory:        InventoryTotals,
    /// Hubs by sales, best first.
    pub hub_ranking:      Vec<HubRanking>,
}

impl ExecutiveSummary {
    pub fn build(snapshot: &Snapshot, period: DateRange, thresholds: &Thresholds) -> Self {
        let current = aggregate_total(&snapshot.daily_metrics, &period).unwrap_or_default();
        let previous = aggregate_total(&snapshot.daily_metrics, &period.previous());

        let kpi = |metric: Metric| {
            KpiValue::of(
                metric.value(&current),
                previous.as_ref().and_then(|p| metric.value(p)),
            )
        };
        let margin_after_cac = |row: &AggregateRow| Some(row.pc1? - row.ecac?);

        let unit_economics = UnitEconomics {
            ticket_avg:     kpi(Metric::TicketAvg),
            full_margin:    kpi(Metric::FullMargin),
            fin_ins:        kpi(Metric::FinIns),
            kt:             kpi(Metric::Kt),
            pc1:            kpi(Metric::Pc1),
            ecac:           kpi(Metric::Ecac),
            pc1_minus_ecac: KpiValue::of(
                margin_after_cac(&current),
                previous.as_ref().and_then(margin_after_cac),
            ),
            cost_per_lead:  kpi(Metric::CostPerLead),
        };

        let funnel = funnel_rates(
            current.leads.min(u64::from(u32::MAX)) as u32,
            current.appointments.min(u64::from(u32::MAX)) as u32,
            current.reservations.min(u64::from(u32::MAX)) as u32,
            current.sales.min(u64::from(u32::MAX)) as u32,
        );

        Self {
            period,
            sales:            kpi(Metric::Sales),
            purchases:        kpi(Metric::Purchases),
            revenue:          kpi(Metric::Revenue),
            leads:            kpi(Metric::Leads),
            conversion_pct:   kpi(Metric::Conversion),
            cancellations:    kpi(Metric::Cancellations),
            nps:              kpi(Metric::Nps),
            csat:             kpi(Metric::Csat),
            sla_lead_to_sale: kpi(Metric::SlaLeadToSale),
            unit_economics,
            funnel,
            inventory: inventory_totals(snapshot),
            hub_ranking: hub_ranking(snapshot, &period, thresholds),
        }
    }
}

fn inventory_totals(snapshot: &Snapshot) -> InventoryTotals {
    let mut totals = InventoryTotals::default();
    for r in &snapshot.inventory {
        totals.total += r.total_inventory;
        totals.available += r.available;
        totals.reserved += r.reserved;
        totals.vip += r.vip;
        totals.aging_60_plus += r.aging_60_plus;
    }
    totals.aging_pct = ratio(f64::from(totals.aging_60_plus), f64::from(totals.total)) * 100.0;
    totals
}

fn hub_ranking(snapshot: &Snapshot, period: &DateRange, thresholds: &Thresholds) -> Vec<HubRanking> {
    let countries = hub_countries(&snapshot.daily_metrics);
    let mut ranking: Vec<HubRanking> = aggregate(&snapshot.daily_metrics, GroupBy::Hub, period)
        .into_iter()
        .map(|(hub, row)| {
            let conversion_pct = row.conversion_pct();
            let status = match (conversion_pct, row.nps) {
                (Some(c), Some(n)) => Some(agent_status(c / 100.0, n, thresholds)),
                _ => None,
            };
            HubRanking {
                country: countries.get(hub.as_str()).map(|c| c.to_string()).unwrap_or_default(),
                hub,
                sales: row.sales,
                revenue: row.revenue,
                conversion_pct,
                nps: row.nps,
                status,
            }
        })
        .collect();
    // Stable: equal sales keep alphabetical hub order.
    ranking.sort_by(|a, b| b.sales.cmp(&a.sales));
    ranking
}

// ── Team summary ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentHighlight {
    pub agent_id:   AgentId,
    pub agent_name: String,
    pub points:     f64,
    pub tier:       IncentiveTier,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamSummary {
    pub headcount:       usize,
    pub total_sales:     u64,
    pub total_leads:     u64,
    pub total_revenue:   f64,
    pub avg_conversion:  f64,
    pub avg_utilization: f64,
    pub avg_ownership:   f64,
    pub avg_efficiency:  f64,
    /// Agents converting above the team's 75th percentile.
    pub top_performers:  usize,
    pub quadrants:       BTreeMap<OptimizationQuadrant, usize>,
    pub tiers:           BTreeMap<IncentiveTier, usize>,
    /// Up to five agents by total points.
    pub top_agents:      Vec<AgentHighlight>,
}

impl TeamSummary {
    pub fn build(agents: &[AgentPerformanceRecord]) -> Self {
        let n = agents.len() as f64;
        let mean = |f: fn(&AgentPerformanceRecord) -> f64| ratio(agents.iter().map(f).sum(), n);

        let conversions: Vec<f64> = agents.iter().map(|a| a.conversion).collect();
        let top_performers = match quantile(&conversions, 0.75) {
            Some(q) => conversions.iter().filter(|c| **c > q).count(),
            None => 0,
        };

        let mut quadrants = BTreeMap::new();
        let mut tiers = BTreeMap::new();
        for a in agents {
            *quadrants.entry(a.quadrant).or_insert(0) += 1;
            *tiers.entry(a.incentive_tier).or_insert(0) += 1;
        }

        let mut by_points: Vec<&AgentPerformanceRecord> = agents.iter().collect();
        by_points.sort_by(|a, b| b.points.total.total_cmp(&a.points.total));
        let top_agents = by_points
            .into_iter()
            .take(5)
            .map(|a| AgentHighlight {
                agent_id:   a.agent_id,
                agent_name: a.agent_name.clone(),
                points:     a.points.total,
                tier:       a.incentive_tier,
            })
            .collect();

        Self {
            headcount:       agents.len(),
            total_sales:     agents.iter().map(|a| u64::from(a.sales)).sum(),
            total_leads:     agents.iter().map(|a| u64::from(a.leads)).sum(),
            total_revenue:   agents.iter().map(|a| a.revenue).sum(),
            avg_conversion:  mean(|a| a.conversion),
            avg_utilization: mean(|a| a.utilization),
            avg_ownership:   mean(|a| a.ownership_score),
            avg_efficiency:  mean(|a| a.efficiency_composite),
            top_performers,
            quadrants,
            tiers,
            top_agents,
        }
    }
}

/// Linear-interpolated quantile. None for an empty slice.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

// ── Recommendations ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    /// Spare slots to fill with leads.
    LowUtilization { utilization: f64, available_slots: u32 },
    /// Well used; no action.
    HighUtilization { utilization: f64 },
    WeakStock { attractiveness: f64, avg_age_days: f64 },
    LowOpportunityConversion { conversion_pct: f64 },
    HighBacklog { backlog: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentRecommendation {
    pub agent_id:   AgentId,
    pub agent_name: String,
    pub items:      Vec<Recommendation>,
}

/// Per-agent coaching hints. Agents with nothing to flag are omitted.
pub fn recommendations(agents: &[AgentPerformanceRecord], thresholds: &Thresholds) -> Vec<AgentRecommendation> {
    let util_low = thresholds.get(ThresholdKey::RecommendUtilizationLow);
    let util_high = thresholds.get(ThresholdKey::RecommendUtilizationHigh);
    let stock_min = thresholds.get(ThresholdKey::RecommendStockMin);
    let opp_min = thresholds.get(ThresholdKey::OpportunityConversionMinPct);
    let backlog_max = thresholds.get(ThresholdKey::BacklogMax);

    agents
        .iter()
        .filter_map(|a| {
            let mut items = Vec::new();
            if a.utilization < util_low {
                items.push(Recommendation::LowUtilization {
                    utilization: a.utilization,
                    available_slots: a.available_slots,
                });
            } else if a.utilization > util_high {
                items.push(Recommendation::HighUtilization { utilization: a.utilization });
            }
            if a.stock_attractiveness < stock_min {
                items.push(Recommendation::WeakStock {
                    attractiveness: a.stock_attractiveness,
                    avg_age_days: a.stock_avg_age,
                });
            }
            if a.opportunity_conversion_pct < opp_min {
                items.push(Recommendation::LowOpportunityConversion {
                    conversion_pct: a.opportunity_conversion_pct,
                });
            }
            if f64::from(a.backlog_cartera) > backlog_max {
                items.push(Recommendation::HighBacklog { backlog: a.backlog_cartera });
            }
            (!items.is_empty()).then(|| AgentRecommendation {
                agent_id: a.agent_id,
                agent_name: a.agent_name.clone(),
                items,
            })
        })
        .collect()
}

// ── Incentive goals ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalProgress {
    pub name:         String,
    pub metric:       GoalMetric,
    pub current:      f64,
    pub threshold:    f64,
    pub points:       u32,
    pub achieved:     bool,
    /// 0..=100.
    pub progress_pct: f64,
    /// Distance left to the threshold; 0 once achieved.
    pub remaining:    f64,
}

fn goal_value(agent: &AgentPerformanceRecord, metric: GoalMetric) -> f64 {
    match metric {
        GoalMetric::Conversion => agent.conversion,
        GoalMetric::Nps        => agent.nps,
        GoalMetric::Noshow     => agent.noshow,
        GoalMetric::Sales      => f64::from(agent.sales),
    }
}

pub fn goal_progress(agent: &AgentPerformanceRecord, goals: &[IncentiveGoal]) -> Vec<GoalProgress> {
    goals
        .iter()
        .map(|goal| {
            let current = goal_value(agent, goal.metric);
            let (achieved, raw_progress, gap) = if goal.inverse {
                (
                    current <= goal.threshold,
                    ratio(goal.threshold, current) * 100.0,
                    current - goal.threshold,
                )
            } else {
                (
                    current >= goal.threshold,
                    ratio(current, goal.threshold) * 100.0,
                    goal.threshold - current,
                )
            };
            GoalProgress {
                name: goal.name.clone(),
                metric: goal.metric,
                current,
                threshold: goal.threshold,
                points: goal.points,
                achieved,
                progress_pct: if achieved { 100.0 } else { raw_progress.min(100.0) },
                remaining: if achieved { 0.0 } else { gap.abs() },
            }
        })
        .collect()
}

/// Sum of points for every goal the agent has achieved.
pub fn goal_points(agent: &AgentPerformanceRecord, goals: &[IncentiveGoal]) -> u32 {
    goal_progress(agent, goals)
        .iter()
        .filter(|g| g.achieved)
        .map(|g| g.points)
        .sum()
}

// ── Lead assignment simulator ──────────────────────────────────────

const EXPECTED_CONVERSION: f64 = 0.15;
const EXPECTED_TICKET: f64 = 22_000.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMethod {
    /// Fill the most efficient agents with spare capacity first.
    Optimal,
    /// Split evenly, remainder to the first agents.
    Uniform,
    /// Split in proportion to each agent's lead capacity.
    ByCapacity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeadAssignment {
    pub agent_id:         AgentId,
    pub agent_name:       String,
    pub leads:            u32,
    pub efficiency:       f64,
    pub capacity:         u32,
    pub expected_revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeadAssignmentPlan {
    pub method:           AssignmentMethod,
    pub requested:        u32,
    pub assignments:      Vec<LeadAssignment>,
    pub unassigned:       u32,
    pub expected_revenue: f64,
}

pub fn simulate_lead_assignment(
    agents: &[AgentPerformanceRecord],
    new_leads: u32,
    method: AssignmentMethod,
) -> LeadAssignmentPlan {
    let split: Vec<(&AgentPerformanceRecord, u32)> = match method {
        AssignmentMethod::Optimal => {
            let priority = |a: &AgentPerformanceRecord| {
                a.efficiency_composite * 0.6 + (1.0 - a.utilization) * 100.0 * 0.4
            };
            let mut ranked: Vec<&AgentPerformanceRecord> = agents.iter().collect();
            ranked.sort_by(|a, b| priority(b).total_cmp(&priority(a)));

            let mut remaining = new_leads;
            let mut out = Vec::new();
            for a in ranked {
                if remaining == 0 {
                    break;
                }
                let take = a.capacity_for_leads.min(remaining);
                remaining -= take;
                out.push((a, take));
            }
            out
        }
        AssignmentMethod::Uniform => {
            let n = agents.len() as u32;
            if n == 0 {
                Vec::new()
            } else {
                let each = new_leads / n;
                let extra = new_leads % n;
                agents
                    .iter()
                    .enumerate()
                    .map(|(i, a)| (a, each + u32::from((i as u32) < extra)))
                    .collect()
            }
        }
        AssignmentMethod::ByCapacity => {
            let total: u64 = agents.iter().map(|a| u64::from(a.capacity_for_leads)).sum();
            agents
                .iter()
                .map(|a| {
                    let leads = if total > 0 {
                        (u64::from(new_leads) * u64::from(a.capacity_for_leads) / total) as u32
                    } else {
                        0
                    };
                    (a, leads)
                })
                .collect()
        }
    };

    let assignments: Vec<LeadAssignment> = split
        .into_iter()
        .filter(|(_, leads)| *leads > 0)
        .map(|(a, leads)| LeadAssignment {
            agent_id:   a.agent_id,
            agent_name: a.agent_name.clone(),
            leads,
            efficiency: a.efficiency_composite,
            capacity:   a.capacity_for_leads,
            expected_revenue: f64::from(leads)
                * EXPECTED_CONVERSION
                * EXPECTED_TICKET
                * (a.efficiency_composite / 100.0),
        })
        .collect();

    let assigned: u32 = assignments.iter().map(|a| a.leads).sum();
    LeadAssignmentPlan {
        method,
        requested: new_leads,
        expected_revenue: assignments.iter().map(|a| a.expected_revenue).sum(),
        unassigned: new_leads.saturating_sub(assigned),
        assignments,
    }
}

// ── Customer profile ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerProfile {
    pub customer_id:       CustomerId,
    pub name:              String,
    pub status:            CustomerStatus,
    pub is_vip:            bool,
    pub customer_score:    u32,
    pub sales:             usize,
    pub cancellations:     usize,
    pub financed_sales:    usize,
    pub total_revenue:     f64,
    pub ancillary_revenue: f64,
    pub last_purchase:     Option<NaiveDate>,
}

impl CustomerProfile {
    pub fn build(customer: &CustomerRecord) -> Self {
        let sales: Vec<&Transaction> = customer.transactions.iter().filter(|t| t.is_sale()).collect();
        Self {
            customer_id:       customer.customer_id,
            name:              customer.name.clone(),
            status:            customer.status,
            is_vip:            customer.is_vip,
            customer_score:    customer.customer_score,
            sales:             sales.len(),
            cancellations:     customer.transactions.len() - sales.len(),
            financed_sales:    sales
                .iter()
                .filter(|t| matches!(t, Transaction::Sale { financed: true, .. }))
                .count(),
            total_revenue:     sales.iter().map(|t| t.total_amount()).sum(),
            ancillary_revenue: sales.iter().map(|t| t.ancillaries_total()).sum(),
            last_purchase:     sales.iter().map(|t| t.date()).max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::quantile;

    #[test]
    fn quantile_interpolates_linearly() {
        let q = quantile(&[1.0, 2.0, 3.0, 4.0], 0.75).unwrap();
        assert!((q - 3.25).abs() < 1e-9);
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[7.0], 0.75), Some(7.0));
    }
}

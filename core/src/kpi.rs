//! KPI derivation: pure ratio and scoring functions.
//!
//! RULE: Every function here is total. A zero or non-finite
//! denominator yields 0.0, never NaN or infinity, so a KPI can be
//! fed straight into an Alert's numeric value.

use crate::config::{EfficiencyWeights, PointSchedule, QuadrantThresholds, ThresholdKey, Thresholds};
use serde::{Deserialize, Serialize};

// ── Ratios ─────────────────────────────────────────────────────────

/// `num / den`, or 0.0 when the quotient would not be finite.
pub fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        return 0.0;
    }
    let q = num / den;
    if q.is_finite() {
        q
    } else {
        0.0
    }
}

/// Sales over leads, as a ratio.
pub fn conversion(sales: u32, leads: u32) -> f64 {
    ratio(f64::from(sales), f64::from(leads))
}

/// Share of sales that carried a product, as a percentage.
pub fn penetration(product_sold: u32, sales: u32) -> f64 {
    ratio(f64::from(product_sold), f64::from(sales)) * 100.0
}

/// Insurance plus warranty over two opportunities per sale, as a percentage.
pub fn ancillary_penetration(insurance_sold: u32, warranty_sold: u32, sales: u32) -> f64 {
    ratio(
        f64::from(insurance_sold + warranty_sold),
        f64::from(sales) * 2.0,
    ) * 100.0
}

/// Booked appointments over weekly slot capacity.
pub fn utilization(appointments: u32, capacity: u32) -> f64 {
    ratio(f64::from(appointments), f64::from(capacity))
}

/// Percentage of sales handled start to finish without a handoff.
pub fn ownership_score(sales: u32, handoffs: u32) -> f64 {
    ratio(f64::from(sales.saturating_sub(handoffs)), f64::from(sales)) * 100.0
}

/// Sales over the agent's real opportunities (appointments + backlog), as a percentage.
pub fn opportunity_conversion_pct(sales: u32, opportunities: u32) -> f64 {
    ratio(f64::from(sales), f64::from(opportunities)) * 100.0
}

/// Stock appeal on a 0-100 scale: older stock is penalised, demand
/// and price competitiveness lift it.
pub fn stock_attractiveness(avg_age_days: f64, demand: f64, price: f64) -> f64 {
    let age_factor = (100.0 - avg_age_days * 1.2).max(0.0);
    let score = age_factor * 0.4 + demand * 0.3 + price * 0.3;
    if score.is_finite() {
        score
    } else {
        0.0
    }
}

/// Stage-to-stage conversion ratios of the sales funnel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FunnelRates {
    pub lead_to_appointment:        f64,
    pub appointment_to_reservation: f64,
    pub reservation_to_sale:        f64,
    pub lead_to_sale:               f64,
}

pub fn funnel_rates(leads: u32, appointments: u32, reservations: u32, sales: u32) -> FunnelRates {
    FunnelRates {
        lead_to_appointment:        ratio(f64::from(appointments), f64::from(leads)),
        appointment_to_reservation: ratio(f64::from(reservations), f64::from(appointments)),
        reservation_to_sale:        ratio(f64::from(sales), f64::from(reservations)),
        lead_to_sale:               ratio(f64::from(sales), f64::from(leads)),
    }
}

/// Days of available stock at the current average daily sales pace.
/// `None` when nothing sells, since the runway is then unbounded.
pub fn inventory_runway_days(available_units: f64, avg_daily_sales: f64) -> Option<f64> {
    if avg_daily_sales <= 0.0 || !avg_daily_sales.is_finite() {
        return None;
    }
    let days = available_units / avg_daily_sales;
    days.is_finite().then_some(days)
}

// ── Composite efficiency ───────────────────────────────────────────

/// Weighted blend of financing penetration, ancillary penetration,
/// ownership and NPS (capped at 100), scaled to 0-100.
pub fn efficiency_composite(
    financing_pen: f64,
    ancillary_pen: f64,
    ownership: f64,
    nps: f64,
    weights: &EfficiencyWeights,
) -> f64 {
    let score = (financing_pen / 100.0 * weights.financing
        + ancillary_pen / 100.0 * weights.ancillary
        + ownership / 100.0 * weights.ownership
        + nps.min(100.0) / 100.0 * weights.nps)
        * 100.0;
    if score.is_finite() {
        score
    } else {
        0.0
    }
}

// ── Composite points ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct PointBreakdown {
    pub base:      f64,
    pub financing: f64,
    pub warranty:  f64,
    pub insurance: f64,
    pub tradein:   f64,
    pub nps_bonus: f64,
    pub total:     f64,
    pub per_delivery: f64,
}

/// Units an agent closed in the period, as counted for points.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointInputs {
    pub sales:         u32,
    pub financing:     u32,
    pub warranty:      u32,
    pub insurance:     u32,
    pub tradein:       u32,
    pub nps:           f64,
}

pub fn composite_points(inputs: &PointInputs, schedule: &PointSchedule) -> PointBreakdown {
    let sales = f64::from(inputs.sales);
    let base = sales * schedule.per_delivery;
    let financing = f64::from(inputs.financing) * schedule.per_financed;
    let warranty = f64::from(inputs.warranty) * schedule.per_warranty;
    let insurance = f64::from(inputs.insurance) * schedule.per_insurance;
    let tradein = f64::from(inputs.tradein) * schedule.per_tradein;
    let nps_bonus = if inputs.nps >= schedule.nps_bonus_min {
        sales * schedule.nps_bonus_per_delivery
    } else {
        0.0
    };
    let total = base + financing + warranty + insurance + tradein + nps_bonus;

    PointBreakdown {
        base,
        financing,
        warranty,
        insurance,
        tradein,
        nps_bonus,
        total,
        per_delivery: ratio(total, sales),
    }
}

// ── Incentive tiers ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum IncentiveTier {
    Bronze,
    Silver,
    Gold,
    Diamond,
}

impl IncentiveTier {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bronze  => "Bronze",
            Self::Silver  => "Silver",
            Self::Gold    => "Gold",
            Self::Diamond => "Diamond",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TierBreakpoint {
    pub min_points: f64,
    pub tier:       IncentiveTier,
}

/// Sorted breakpoint table. A total resolves to the tier of the
/// highest breakpoint it reaches.
#[derive(Debug, Clone)]
pub struct IncentiveTierTable {
    breakpoints: Vec<TierBreakpoint>,
}

impl IncentiveTierTable {
    pub fn new(mut breakpoints: Vec<TierBreakpoint>) -> Self {
        breakpoints.sort_by(|a, b| a.min_points.total_cmp(&b.min_points));
        Self { breakpoints }
    }

    /// Totals below the first breakpoint (or NaN) fall in the lowest tier.
    pub fn tier_for(&self, points: f64) -> IncentiveTier {
        let reached = self.breakpoints.partition_point(|b| b.min_points <= points);
        let idx = reached.saturating_sub(1);
        self.breakpoints
            .get(idx)
            .map(|b| b.tier)
            .unwrap_or(IncentiveTier::Bronze)
    }

    pub fn breakpoints(&self) -> &[TierBreakpoint] {
        &self.breakpoints
    }

    /// The next breakpoint above `points`, if any tier is left to reach.
    pub fn next_breakpoint(&self, points: f64) -> Option<TierBreakpoint> {
        let reached = self.breakpoints.partition_point(|b| b.min_points <= points);
        self.breakpoints.get(reached).copied()
    }
}

/// Where an agent stands on the tier ladder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TierProgress {
    pub tier:     IncentiveTier,
    pub next:     Option<IncentiveTier>,
    /// Share of the next breakpoint already earned, 0.0..=1.0.
    /// 1.0 at the top tier.
    pub progress: f64,
}

impl TierProgress {
    pub fn for_points(points: f64, table: &IncentiveTierTable) -> Self {
        let tier = table.tier_for(points);
        match table.next_breakpoint(points) {
            Some(next) => Self {
                tier,
                next: Some(next.tier),
                progress: ratio(points.max(0.0), next.min_points).min(1.0),
            },
            None => Self {
                tier,
                next: None,
                progress: 1.0,
            },
        }
    }
}

// ── Optimization quadrant ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationQuadrant {
    /// Busy and efficient.
    Star,
    /// Efficient with spare capacity: route more leads here.
    Potential,
    /// Busy but inefficient.
    Saturated,
    Review,
}

impl OptimizationQuadrant {
    pub const ALL: [OptimizationQuadrant; 4] = [
        Self::Star,
        Self::Potential,
        Self::Saturated,
        Self::Review,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Star      => "Star",
            Self::Potential => "Potential",
            Self::Saturated => "Saturated",
            Self::Review    => "Review",
        }
    }
}

pub fn optimization_quadrant(
    utilization: f64,
    efficiency: f64,
    limits: &QuadrantThresholds,
) -> OptimizationQuadrant {
    let busy = utilization > limits.utilization;
    let efficient = efficiency > limits.efficiency;
    match (busy, efficient) {
        (true, true)   => OptimizationQuadrant::Star,
        (false, true)  => OptimizationQuadrant::Potential,
        (true, false)  => OptimizationQuadrant::Saturated,
        (false, false) => OptimizationQuadrant::Review,
    }
}

// ── Agent status badge ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Excellent,
    Good,
    Attention,
    Regular,
}

/// `conversion` is a ratio (0.25 = 25%).
pub fn agent_status(conversion: f64, nps: f64, thresholds: &Thresholds) -> AgentStatus {
    let conv_good = thresholds.get(ThresholdKey::ConversionGood);
    let conv_warn = thresholds.get(ThresholdKey::ConversionWarning);
    let nps_good = thresholds.get(ThresholdKey::NpsGood);
    let nps_warn = thresholds.get(ThresholdKey::NpsWarning);

    if conversion >= conv_good && nps >= nps_good {
        AgentStatus::Excellent
    } else if conversion >= conv_warn && nps >= nps_warn {
        AgentStatus::Good
    } else if conversion < conv_warn || nps < nps_warn {
        AgentStatus::Attention
    } else {
        AgentStatus::Regular
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PulseConfig;

    fn standard_table() -> IncentiveTierTable {
        IncentiveTierTable::new(PulseConfig::standard().incentives.tiers)
    }

    #[test]
    fn tier_boundaries_are_inclusive() {
        let table = standard_table();
        assert_eq!(table.tier_for(0.0), IncentiveTier::Bronze);
        assert_eq!(table.tier_for(499.9), IncentiveTier::Bronze);
        assert_eq!(table.tier_for(500.0), IncentiveTier::Silver);
        assert_eq!(table.tier_for(999.0), IncentiveTier::Silver);
        assert_eq!(table.tier_for(1000.0), IncentiveTier::Gold);
        assert_eq!(table.tier_for(1500.0), IncentiveTier::Diamond);
        assert_eq!(table.tier_for(1_000_000.0), IncentiveTier::Diamond);
    }

    #[test]
    fn tier_progress_points_at_next_breakpoint() {
        let table = standard_table();
        let p = TierProgress::for_points(750.0, &table);
        assert_eq!(p.tier, IncentiveTier::Silver);
        assert_eq!(p.next, Some(IncentiveTier::Gold));
        assert!((p.progress - 0.75).abs() < 1e-9);

        let top = TierProgress::for_points(2000.0, &table);
        assert_eq!(top.next, None);
        assert_eq!(top.progress, 1.0);
    }

    #[test]
    fn tier_for_negative_or_nan_is_lowest() {
        let table = standard_table();
        assert_eq!(table.tier_for(-10.0), IncentiveTier::Bronze);
        assert_eq!(table.tier_for(f64::NAN), IncentiveTier::Bronze);
    }

    #[test]
    fn unsorted_breakpoints_are_sorted_on_construction() {
        let table = IncentiveTierTable::new(vec![
            TierBreakpoint { min_points: 1000.0, tier: IncentiveTier::Gold },
            TierBreakpoint { min_points: 0.0,    tier: IncentiveTier::Bronze },
        ]);
        assert_eq!(table.tier_for(1200.0), IncentiveTier::Gold);
        assert_eq!(table.tier_for(800.0), IncentiveTier::Bronze);
    }

    #[test]
    fn quadrant_thresholds_are_strict() {
        let limits = QuadrantThresholds { utilization: 0.75, efficiency: 60.0 };
        assert_eq!(optimization_quadrant(0.80, 61.0, &limits), OptimizationQuadrant::Star);
        assert_eq!(optimization_quadrant(0.75, 61.0, &limits), OptimizationQuadrant::Potential);
        assert_eq!(optimization_quadrant(0.80, 60.0, &limits), OptimizationQuadrant::Saturated);
        assert_eq!(optimization_quadrant(0.75, 60.0, &limits), OptimizationQuadrant::Review);
    }

    #[test]
    fn stock_attractiveness_floors_age_factor() {
        // Age 100 days drives the age factor below zero; it clamps to 0.
        let score = stock_attractiveness(100.0, 80.0, 90.0);
        assert!((score - (80.0 * 0.3 + 90.0 * 0.3)).abs() < 1e-9);
    }
}

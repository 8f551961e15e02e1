//! KPI formulas with the standard configuration.

use showroom_pulse_core::{
    config::{PulseConfig, Thresholds},
    kpi::{
        agent_status, composite_points, conversion, efficiency_composite, funnel_rates,
        inventory_runway_days, optimization_quadrant, ownership_score, penetration, ratio,
        utilization, AgentStatus, IncentiveTier, IncentiveTierTable, OptimizationQuadrant,
        PointInputs, TierProgress,
    },
};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn zero_denominators_yield_zero() {
    assert_eq!(ratio(1.0, 0.0), 0.0);
    assert_eq!(ratio(f64::NAN, 2.0), 0.0);
    assert_eq!(conversion(5, 0), 0.0);
    assert_eq!(penetration(3, 0), 0.0);
    assert_eq!(utilization(10, 0), 0.0);
    assert_eq!(ownership_score(0, 0), 0.0);

    let rates = funnel_rates(0, 0, 0, 0);
    assert_eq!(rates.lead_to_sale, 0.0);
    assert_eq!(rates.reservation_to_sale, 0.0);
}

#[test]
fn ownership_counts_sales_without_handoff() {
    assert!(close(ownership_score(10, 2), 80.0));
    // More handoffs than sales floor at zero.
    assert_eq!(ownership_score(2, 5), 0.0);
}

#[test]
fn runway_needs_sales() {
    assert_eq!(inventory_runway_days(100.0, 0.0), None);
    assert_eq!(inventory_runway_days(100.0, 4.0), Some(25.0));
}

#[test]
fn points_add_every_component() {
    let config = PulseConfig::standard();
    let inputs = PointInputs {
        sales: 10,
        financing: 4,
        warranty: 3,
        insurance: 5,
        tradein: 2,
        nps: 85.0,
    };
    let points = composite_points(&inputs, &config.incentives.points);
    assert_eq!(points.base, 1000.0);
    assert_eq!(points.financing, 200.0);
    assert_eq!(points.warranty, 90.0);
    assert_eq!(points.insurance, 100.0);
    assert_eq!(points.tradein, 40.0);
    assert_eq!(points.nps_bonus, 250.0);
    assert_eq!(points.total, 1680.0);
    assert_eq!(points.per_delivery, 168.0);
}

#[test]
fn nps_bonus_needs_the_minimum_score() {
    let config = PulseConfig::standard();
    let inputs = PointInputs { sales: 4, nps: 79.9, ..Default::default() };
    let points = composite_points(&inputs, &config.incentives.points);
    assert_eq!(points.nps_bonus, 0.0);
    assert_eq!(points.total, 400.0);

    let idle = composite_points(&PointInputs::default(), &config.incentives.points);
    assert_eq!(idle.per_delivery, 0.0);
}

#[test]
fn tiers_follow_the_breakpoints() {
    let table = IncentiveTierTable::new(PulseConfig::standard().incentives.tiers);
    let cases = [
        (0.0, IncentiveTier::Bronze),
        (499.9, IncentiveTier::Bronze),
        (500.0, IncentiveTier::Silver),
        (1200.0, IncentiveTier::Gold),
        (1680.0, IncentiveTier::Diamond),
    ];
    for (points, tier) in cases {
        assert_eq!(table.tier_for(points), tier, "points = {points}");
    }

    let progress = TierProgress::for_points(750.0, &table);
    assert_eq!(progress.tier, IncentiveTier::Silver);
    assert_eq!(progress.next, Some(IncentiveTier::Gold));
    assert!(close(progress.progress, 0.75));

    let top = TierProgress::for_points(2000.0, &table);
    assert_eq!(top.next, None);
    assert_eq!(top.progress, 1.0);
}

#[test]
fn efficiency_blends_the_weighted_inputs() {
    let weights = PulseConfig::standard().efficiency_weights;
    let score = efficiency_composite(40.0, 40.0, 90.0, 75.0, &weights);
    assert!(close(score, 57.0), "score = {score}");

    // NPS above 100 is capped.
    let capped = efficiency_composite(0.0, 0.0, 0.0, 150.0, &weights);
    assert!(close(capped, 20.0), "capped = {capped}");
}

#[test]
fn quadrants_split_on_strict_limits() {
    let limits = PulseConfig::standard().quadrant;
    assert_eq!(optimization_quadrant(0.80, 70.0, &limits), OptimizationQuadrant::Star);
    assert_eq!(optimization_quadrant(0.50, 70.0, &limits), OptimizationQuadrant::Potential);
    assert_eq!(optimization_quadrant(0.80, 40.0, &limits), OptimizationQuadrant::Saturated);
    assert_eq!(optimization_quadrant(0.75, 60.0, &limits), OptimizationQuadrant::Review);
}

#[test]
fn status_badges_combine_conversion_and_nps() {
    let t = Thresholds::default();
    assert_eq!(agent_status(0.30, 75.0, &t), AgentStatus::Excellent);
    assert_eq!(agent_status(0.20, 60.0, &t), AgentStatus::Good);
    assert_eq!(agent_status(0.30, 60.0, &t), AgentStatus::Good);
    assert_eq!(agent_status(0.10, 90.0, &t), AgentStatus::Attention);
    assert_eq!(agent_status(0.40, 45.0, &t), AgentStatus::Attention);
}

//! Dashboard view models: executive and team summaries, coaching,
//! goals, lead assignment and customer profiles.

mod common;

use common::*;
use showroom_pulse_core::{
    config::{PulseConfig, Thresholds},
    insights::{
        goal_points, goal_progress, recommendations, simulate_lead_assignment, AssignmentMethod,
        CustomerProfile, ExecutiveSummary, Recommendation, TeamSummary,
    },
    kpi::{AgentStatus, IncentiveTier, OptimizationQuadrant},
    model::{
        AgentPerformanceRecord, AncillaryCategory, AncillaryItem, AssistantSummary, CustomerRecord,
        CustomerStatus, Sentiment, Transaction,
    },
    snapshot::Snapshot,
};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ── Executive summary ──────────────────────────────────────────────

fn two_hub_snapshot() -> Snapshot {
    snapshot(
        vec![
            daily(d(2025, 2, 20), "Hub A", 100, 20),
            daily(d(2025, 3, 20), "Hub A", 100, 30),
            daily(d(2025, 3, 20), "Hub B", 100, 10),
        ],
        vec![inventory("Hub A", 100, 10), inventory("Hub B", 50, 5)],
        vec![],
    )
}

#[test]
fn executive_kpis_carry_the_previous_period() {
    let summary = ExecutiveSummary::build(&two_hub_snapshot(), march(), &Thresholds::default());

    let sales = summary.sales.unwrap();
    assert_eq!(sales.value, 40.0);
    assert_eq!(sales.previous, Some(20.0));
    assert_eq!(sales.delta_pct, Some(100.0));

    // 40/200 and 20/100: unchanged conversion shows no delta.
    let conversion = summary.conversion_pct.unwrap();
    assert!(close(conversion.value, 20.0));
    assert_eq!(conversion.delta_pct, None);

    let pc1_minus_ecac = summary.unit_economics.pc1_minus_ecac.unwrap();
    assert!(close(pc1_minus_ecac.value, 2_500.0));
}

#[test]
fn hubs_are_ranked_by_sales() {
    let summary = ExecutiveSummary::build(&two_hub_snapshot(), march(), &Thresholds::default());
    let hubs: Vec<_> = summary.hub_ranking.iter().map(|h| h.hub.as_str()).collect();
    assert_eq!(hubs, ["Hub A", "Hub B"]);

    let best = &summary.hub_ranking[0];
    assert_eq!(best.country, COUNTRY);
    assert_eq!(best.sales, 30);
    assert_eq!(best.status, Some(AgentStatus::Excellent));
    assert_eq!(summary.hub_ranking[1].status, Some(AgentStatus::Attention));
}

#[test]
fn inventory_totals_sum_every_row() {
    let summary = ExecutiveSummary::build(&two_hub_snapshot(), march(), &Thresholds::default());
    let inv = summary.inventory;
    assert_eq!(inv.total, 150);
    assert_eq!(inv.aging_60_plus, 15);
    assert!(close(inv.aging_pct, 10.0));
}

#[test]
fn empty_snapshot_summary_has_no_means() {
    let summary = ExecutiveSummary::build(&Snapshot::empty(d(2025, 3, 31)), march(), &Thresholds::default());
    assert_eq!(summary.nps, None);
    assert_eq!(summary.sales.map(|k| k.value), Some(0.0));
    assert_eq!(summary.sales.and_then(|k| k.previous), None);
    assert!(summary.hub_ranking.is_empty());
    assert_eq!(summary.funnel.lead_to_sale, 0.0);
}

// ── Team summary ───────────────────────────────────────────────────

fn team() -> Vec<AgentPerformanceRecord> {
    [0.10, 0.20, 0.30, 0.40, 0.25, 0.15, 0.35]
        .iter()
        .enumerate()
        .map(|(i, conv)| {
            let mut a = agent(i as u32 + 1, &format!("Agent {}", i + 1), "Hub A");
            a.conversion = *conv;
            a.points.total = 100.0 * (i as f64 + 1.0);
            a
        })
        .collect()
}

#[test]
fn team_summary_counts_and_averages() {
    let summary = TeamSummary::build(&team());
    assert_eq!(summary.headcount, 7);
    assert_eq!(summary.total_sales, 70);
    assert!(close(summary.avg_conversion, 0.25));
    assert!(close(summary.avg_utilization, 0.80));
    assert_eq!(summary.quadrants.get(&OptimizationQuadrant::Saturated), Some(&7));
    assert_eq!(summary.tiers.get(&IncentiveTier::Bronze), Some(&7));
}

#[test]
fn top_performers_beat_the_upper_quartile() {
    // Sorted: .10 .15 .20 .25 .30 .35 .40; the 75th percentile is .325.
    let summary = TeamSummary::build(&team());
    assert_eq!(summary.top_performers, 2);
}

#[test]
fn top_agents_are_the_five_highest_scores() {
    let summary = TeamSummary::build(&team());
    let ids: Vec<_> = summary.top_agents.iter().map(|a| a.agent_id).collect();
    assert_eq!(ids, [7, 6, 5, 4, 3]);
}

#[test]
fn empty_team_has_zero_averages() {
    let summary = TeamSummary::build(&[]);
    assert_eq!(summary.headcount, 0);
    assert_eq!(summary.avg_conversion, 0.0);
    assert_eq!(summary.top_performers, 0);
    assert!(summary.top_agents.is_empty());
}

// ── Recommendations ────────────────────────────────────────────────

#[test]
fn healthy_agents_get_no_recommendation() {
    let agents = vec![agent(1, "Ana", "Hub A")];
    assert!(recommendations(&agents, &Thresholds::default()).is_empty());
}

#[test]
fn recommendations_list_every_issue() {
    let mut idle = agent(1, "Ana", "Hub A");
    idle.utilization = 0.5;
    idle.available_slots = 20;
    idle.backlog_cartera = 25;
    let mut busy = agent(2, "Luis", "Hub A");
    busy.utilization = 0.95;
    busy.stock_attractiveness = 62.0;
    busy.opportunity_conversion_pct = 9.0;

    let recs = recommendations(&[idle, busy, agent(3, "Sofía", "Hub A")], &Thresholds::default());
    assert_eq!(recs.len(), 2);

    assert_eq!(recs[0].agent_name, "Ana");
    assert_eq!(
        recs[0].items,
        [
            Recommendation::LowUtilization { utilization: 0.5, available_slots: 20 },
            Recommendation::HighBacklog { backlog: 25 },
        ]
    );

    assert_eq!(recs[1].agent_name, "Luis");
    assert_eq!(recs[1].items.len(), 3);
    assert!(matches!(recs[1].items[0], Recommendation::HighUtilization { .. }));
    assert!(matches!(recs[1].items[1], Recommendation::WeakStock { .. }));
    assert!(matches!(recs[1].items[2], Recommendation::LowOpportunityConversion { .. }));
}

// ── Goals ──────────────────────────────────────────────────────────

#[test]
fn goal_progress_for_the_standard_goals() {
    let goals = PulseConfig::standard().incentives.goals;
    let progress = goal_progress(&agent(1, "Ana", "Hub A"), &goals);
    assert_eq!(progress.len(), 4);

    let by_name = |name: &str| progress.iter().find(|g| g.name == name).unwrap();
    assert!(by_name("Elite Converter").achieved);
    assert!(by_name("Perfect Appointment").achieved);
    assert!(by_name("Closer").achieved);

    let nps = by_name("NPS Master");
    assert!(!nps.achieved);
    assert!(close(nps.progress_pct, 93.75));
    assert!(close(nps.remaining, 5.0));

    assert_eq!(goal_points(&agent(1, "Ana", "Hub A"), &goals), 100 + 60 + 90);
}

#[test]
fn inverse_goal_progress_shrinks_as_the_rate_grows() {
    let goals = PulseConfig::standard().incentives.goals;
    let mut a = agent(1, "Ana", "Hub A");
    a.noshow = 0.20;
    let progress = goal_progress(&a, &goals);
    let noshow = progress.iter().find(|g| g.name == "Perfect Appointment").unwrap();
    assert!(!noshow.achieved);
    assert!(close(noshow.progress_pct, 50.0));
    assert!(close(noshow.remaining, 0.10));

    a.noshow = 0.0;
    let progress = goal_progress(&a, &goals);
    let noshow = progress.iter().find(|g| g.name == "Perfect Appointment").unwrap();
    assert!(noshow.achieved);
    assert_eq!(noshow.progress_pct, 100.0);
}

// ── Lead assignment ────────────────────────────────────────────────

fn pair(cap_a: u32, cap_b: u32) -> Vec<AgentPerformanceRecord> {
    let mut a = agent(1, "Ana", "Hub A");
    a.efficiency_composite = 80.0;
    a.utilization = 0.5;
    a.capacity_for_leads = cap_a;
    let mut b = agent(2, "Luis", "Hub A");
    b.efficiency_composite = 40.0;
    b.utilization = 0.9;
    b.capacity_for_leads = cap_b;
    // Listed worst first so the optimal order has to be computed.
    vec![b, a]
}

#[test]
fn optimal_assignment_fills_the_best_agent_first() {
    let plan = simulate_lead_assignment(&pair(10, 10), 15, AssignmentMethod::Optimal);
    let split: Vec<_> = plan.assignments.iter().map(|a| (a.agent_id, a.leads)).collect();
    assert_eq!(split, [(1, 10), (2, 5)]);
    assert_eq!(plan.unassigned, 0);
    assert!(close(plan.assignments[0].expected_revenue, 26_400.0));
}

#[test]
fn leads_beyond_capacity_stay_unassigned() {
    let plan = simulate_lead_assignment(&pair(10, 10), 30, AssignmentMethod::Optimal);
    assert_eq!(plan.unassigned, 10);
    assert_eq!(plan.requested, 30);
}

#[test]
fn uniform_assignment_spreads_the_remainder() {
    let plan = simulate_lead_assignment(&pair(10, 10), 5, AssignmentMethod::Uniform);
    let split: Vec<_> = plan.assignments.iter().map(|a| (a.agent_id, a.leads)).collect();
    assert_eq!(split, [(2, 3), (1, 2)]);

    let none = simulate_lead_assignment(&[], 5, AssignmentMethod::Uniform);
    assert!(none.assignments.is_empty());
    assert_eq!(none.unassigned, 5);
}

#[test]
fn capacity_assignment_is_proportional() {
    let plan = simulate_lead_assignment(&pair(10, 30), 10, AssignmentMethod::ByCapacity);
    let split: Vec<_> = plan.assignments.iter().map(|a| (a.agent_id, a.leads)).collect();
    assert_eq!(split, [(2, 7), (1, 2)]);
    assert_eq!(plan.unassigned, 1);
}

// ── Customer profile ───────────────────────────────────────────────

fn sale(id: &str, date: chrono::NaiveDate, price: f64, financed: bool, extras: &[f64]) -> Transaction {
    Transaction::Sale {
        transaction_id: id.into(),
        date,
        vehicle: "Mazda Sedán 2021".into(),
        vehicle_price: price,
        ancillaries: extras
            .iter()
            .map(|p| AncillaryItem {
                name: "Seguro".into(),
                price: *p,
                category: AncillaryCategory::Insurance,
            })
            .collect(),
        financed,
        down_payment: price * 0.2,
    }
}

#[test]
fn customer_profile_summarises_transactions() {
    let customer = CustomerRecord {
        customer_id: 1000,
        name: "María López".into(),
        email: "maria.lopez@example.com".into(),
        phone: "+52 55 0000 0000".into(),
        country: COUNTRY.into(),
        region: REGION.into(),
        hub: "Hub A".into(),
        status: CustomerStatus::Recurring,
        is_vip: false,
        registration_date: d(2023, 5, 1),
        last_interaction: d(2025, 3, 20),
        assigned_agent_id: 1,
        customer_score: 72,
        nps_rating: Some(9),
        vehicle_interests: vec![],
        transactions: vec![
            sale("T1", d(2024, 2, 10), 200_000.0, true, &[8_000.0, 2_000.0]),
            Transaction::Cancellation {
                transaction_id: "T2".into(),
                date: d(2024, 8, 1),
                vehicle: "Kia SUV 2020".into(),
                vehicle_price: 250_000.0,
                reason: "Financiamiento rechazado".into(),
                stage: "Reserva".into(),
            },
            sale("T3", d(2025, 1, 15), 150_000.0, false, &[]),
        ],
        assistant: AssistantSummary {
            messages: 4,
            last_topic: "Financiamiento".into(),
            sentiment: Sentiment::Positive,
            financing_interest: true,
            budget_range: (150_000.0, 300_000.0),
            last_interaction: d(2025, 3, 20),
        },
    };

    let profile = CustomerProfile::build(&customer);
    assert_eq!(profile.sales, 2);
    assert_eq!(profile.cancellations, 1);
    assert_eq!(profile.financed_sales, 1);
    assert_eq!(profile.total_revenue, 360_000.0);
    assert_eq!(profile.ancillary_revenue, 10_000.0);
    assert_eq!(profile.last_purchase, Some(d(2025, 1, 15)));
}

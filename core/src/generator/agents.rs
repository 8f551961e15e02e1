//! Agent performance rows for the staffed hubs.

use super::{names::NameGenerator, scaled};
use crate::{
    config::{HubPath, PulseConfig},
    kpi::{self, IncentiveTierTable, PointInputs},
    model::AgentPerformanceRecord,
    rng::StreamRng,
};

/// Share of free slots offered to new leads.
const LEAD_CAPACITY_SHARE: f64 = 0.8;

pub fn generate(config: &PulseConfig, hubs: &[HubPath<'_>], rng: &mut StreamRng) -> Vec<AgentPerformanceRecord> {
    let tiers = IncentiveTierTable::new(config.incentives.tiers.clone());
    let mut records = Vec::new();
    let mut next_id = 1u32;

    for path in hubs {
        for _ in 0..config.generator.agents_per_hub {
            records.push(agent(config, &tiers, path, next_id, rng));
            next_id += 1;
        }
    }
    records
}

fn agent(
    config: &PulseConfig,
    tiers: &IncentiveTierTable,
    path: &HubPath<'_>,
    agent_id: u32,
    rng: &mut StreamRng,
) -> AgentPerformanceRecord {
    let agent_name = NameGenerator::full_name(rng);

    // Capacity
    let slots_per_week = config.generator.slots_per_week;
    let appointments = scaled(slots_per_week, rng.uniform(0.625, 1.0));
    let available_slots = slots_per_week.saturating_sub(appointments);
    let utilization = kpi::utilization(appointments, slots_per_week);

    // Funnel and opportunities
    let backlog_cartera = rng.uniform(15.0, 50.0) as u32;
    let leads = rng.uniform(150.0, 400.0) as u32;
    let total_opportunities = appointments + backlog_cartera;
    let reservations = scaled(appointments, rng.uniform(0.3, 0.7));
    let sales = scaled(reservations, rng.uniform(0.5, 0.9));

    // Operation split
    let sales_only = scaled(sales, rng.uniform(0.60, 0.70));
    let sales_tradein = scaled(sales, rng.uniform(0.20, 0.30));
    let purchases_total = scaled(sales, rng.uniform(0.8, 1.3));
    let purchases_pure = purchases_total.saturating_sub(sales_tradein);

    // Stock quality
    let stock_assigned = rng.uniform(8.0, 20.0) as u32;
    let stock_avg_age = rng.uniform(10.0, 65.0);
    let demand = rng.uniform(60.0, 95.0);
    let price = rng.uniform(70.0, 100.0);
    let stock_attractiveness = kpi::stock_attractiveness(stock_avg_age, demand, price);
    let lead_match_score = rng.uniform(50.0, 100.0);

    // Ancillaries and financing
    let insurance_sold = scaled(sales, rng.uniform(0.30, 0.70));
    let warranty_sold = scaled(sales, rng.uniform(0.20, 0.50));
    let financing_sold = scaled(sales, rng.uniform(0.35, 0.55));
    let financing_penetration = kpi::penetration(financing_sold, sales);
    let ancillary_penetration = kpi::ancillary_penetration(insurance_sold, warranty_sold, sales);

    // Service
    let handoffs = scaled(sales, rng.uniform(0.05, 0.25));
    let ownership_score = kpi::ownership_score(sales, handoffs);
    let nps = rng.uniform(45.0, 90.0);
    let csat = rng.uniform(65.0, 95.0);
    let noshow = rng.uniform(0.05, 0.30);

    // Economics and incentives
    let revenue = f64::from(sales) * rng.uniform(18_000.0, 28_000.0);
    let points = kpi::composite_points(
        &PointInputs {
            sales,
            financing: financing_sold,
            warranty: warranty_sold,
            insurance: insurance_sold,
            tradein: sales_tradein,
            nps,
        },
        &config.incentives.points,
    );
    let efficiency_composite = kpi::efficiency_composite(
        financing_penetration,
        ancillary_penetration,
        ownership_score,
        nps,
        &config.efficiency_weights,
    );

    AgentPerformanceRecord {
        agent_id,
        agent_name,
        country: path.country.to_string(),
        region: path.region.to_string(),
        hub: path.hub.to_string(),
        leads,
        appointments,
        reservations,
        sales,
        conversion: kpi::conversion(sales, leads),
        sales_only,
        sales_tradein,
        purchases_pure,
        purchases_total,
        slots_per_week,
        available_slots,
        utilization,
        capacity_for_leads: scaled(available_slots, LEAD_CAPACITY_SHARE),
        backlog_cartera,
        total_opportunities,
        opportunity_conversion_pct: kpi::opportunity_conversion_pct(sales, total_opportunities),
        stock_assigned,
        stock_avg_age,
        stock_attractiveness,
        lead_match_score,
        insurance_sold,
        insurance_penetration: kpi::penetration(insurance_sold, sales),
        warranty_sold,
        warranty_penetration: kpi::penetration(warranty_sold, sales),
        ancillary_penetration,
        financing_sold,
        financing_penetration,
        handoffs,
        ownership_score,
        nps,
        csat,
        noshow,
        revenue,
        revenue_per_slot: kpi::ratio(revenue, f64::from(appointments)),
        points,
        incentive_tier: tiers.tier_for(points.total),
        efficiency_composite,
        quadrant: kpi::optimization_quadrant(utilization, efficiency_composite, &config.quadrant),
    }
}

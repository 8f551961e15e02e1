//! Customers of the staffed hubs, with transaction history and
//! sales-assistant conversation metadata.

use super::names::NameGenerator;
use crate::{
    config::{HubPath, PulseConfig},
    model::{
        AgentPerformanceRecord, AncillaryCategory, AncillaryItem, AssistantSummary, CustomerRecord,
        CustomerStatus, Sentiment, Transaction,
    },
    rng::StreamRng,
    types::{AgentId, VehicleSegment},
};
use chrono::{Duration, NaiveDate};

const FIRST_CUSTOMER_ID: u32 = 1000;

/// Draw weights in `CustomerStatus::ALL` order.
const STATUS_WEIGHTS: [f64; 5] = [0.35, 0.45, 0.08, 0.10, 0.02];

const ANCILLARY_CATALOG: [(&str, f64, AncillaryCategory); 9] = [
    ("Seguro Total", 12_000.0, AncillaryCategory::Insurance),
    ("Seguro Básico", 6_000.0, AncillaryCategory::Insurance),
    ("Garantía Extendida 2 años", 15_000.0, AncillaryCategory::Warranty),
    ("Garantía Extendida 3 años", 22_000.0, AncillaryCategory::Warranty),
    ("GPS Tracking", 3_500.0, AncillaryCategory::Tech),
    ("Mantenimiento Premium", 8_000.0, AncillaryCategory::Service),
    ("Dashcam", 2_500.0, AncillaryCategory::Tech),
    ("Llantas Premium", 12_000.0, AncillaryCategory::Accessories),
    ("Polarizado", 2_000.0, AncillaryCategory::Accessories),
];

const CANCEL_REASONS: [&str; 6] = [
    "Financiamiento no aprobado",
    "Cambió de opinión",
    "Encontró mejor precio",
    "No le gustó el vehículo",
    "Problemas económicos",
    "Compró en otro lado",
];

const CANCEL_STAGES: [&str; 4] = ["Reserva", "Test Drive", "Negociación", "Documentos"];

const ASSISTANT_TOPICS: [&str; 6] = [
    "financiamiento",
    "precio",
    "garantía",
    "trade-in",
    "prueba de manejo",
    "entrega",
];

const BUDGET_RANGES: [(f64, f64); 5] = [
    (150_000.0, 200_000.0),
    (200_000.0, 250_000.0),
    (250_000.0, 300_000.0),
    (300_000.0, 350_000.0),
    (350_000.0, 450_000.0),
];

pub fn generate(
    config: &PulseConfig,
    hubs: &[HubPath<'_>],
    agents: &[AgentPerformanceRecord],
    as_of: NaiveDate,
    rng: &mut StreamRng,
) -> Vec<CustomerRecord> {
    let (lo, hi) = config.generator.customers_per_hub;
    let mut records = Vec::new();
    let mut next_id = FIRST_CUSTOMER_ID;

    for path in hubs {
        let phone_prefix = config
            .profile(path.country)
            .map(|p| p.phone_prefix.as_str())
            .unwrap_or("+52");
        let hub_agents: Vec<AgentId> = agents
            .iter()
            .filter(|a| a.hub == path.hub)
            .map(|a| a.agent_id)
            .collect();

        for _ in 0..rng.int_between(lo, hi) {
            records.push(customer(config, path, phone_prefix, &hub_agents, next_id, as_of, rng));
            next_id += 1;
        }
    }
    records
}

fn customer(
    config: &PulseConfig,
    path: &HubPath<'_>,
    phone_prefix: &str,
    hub_agents: &[AgentId],
    customer_id: u32,
    as_of: NaiveDate,
    rng: &mut StreamRng,
) -> CustomerRecord {
    let name = NameGenerator::full_name(rng);
    let phone = format!(
        "{phone_prefix} {} {}",
        rng.int_between(1000, 10_000),
        rng.int_between(1000, 10_000)
    );

    let status = CustomerStatus::ALL[rng.weighted_index(&STATUS_WEIGHTS)];
    let is_vip = status == CustomerStatus::Vip || rng.chance(0.1);

    let days_registered = rng.int_between(30, 365);
    let registration_date = as_of - Duration::days(i64::from(days_registered));

    let n_transactions = match status {
        CustomerStatus::New                            => rng.int_between(0, 2),
        CustomerStatus::Active                         => rng.int_between(1, 3),
        CustomerStatus::Vip | CustomerStatus::Recurring => rng.int_between(2, 5),
        CustomerStatus::Inactive                       => 1,
    };
    let n_sales = rng.int_between(0, n_transactions + 1);

    let transactions = (0..n_transactions)
        .map(|i| {
            let transaction_id = format!("TRX-{customer_id}-{}", i + 1);
            let date = registration_date + Duration::days(i64::from(rng.int_between(0, days_registered)));
            let vehicle = NameGenerator::vehicle(rng);
            let vehicle_price = rng.uniform(150_000.0, 350_000.0);
            if i < n_sales {
                let k = rng.int_between(1, 4) as usize;
                let ancillaries = rng
                    .sample(&ANCILLARY_CATALOG, k)
                    .into_iter()
                    .map(|(name, price, category)| AncillaryItem {
                        name: name.to_string(),
                        price,
                        category,
                    })
                    .collect();
                let financed = rng.chance(0.5);
                let down_payment = if rng.chance(0.5) {
                    vehicle_price * rng.uniform(0.15, 0.30)
                } else {
                    vehicle_price
                };
                Transaction::Sale {
                    transaction_id,
                    date,
                    vehicle,
                    vehicle_price,
                    ancillaries,
                    financed,
                    down_payment,
                }
            } else {
                Transaction::Cancellation {
                    transaction_id,
                    date,
                    vehicle,
                    vehicle_price,
                    reason: pick_str(rng, &CANCEL_REASONS),
                    stage: pick_str(rng, &CANCEL_STAGES),
                }
            }
        })
        .collect();

    let mut vehicle_interests: Vec<VehicleSegment> = (0..rng.int_between(1, 4))
        .filter_map(|_| rng.pick(&VehicleSegment::ALL).copied())
        .collect();
    vehicle_interests.sort();
    vehicle_interests.dedup();

    let assigned_agent_id = match rng.pick(hub_agents) {
        Some(id) => *id,
        None => rng.int_between(1, config.generator.agents_per_hub + 1),
    };

    let customer_score = match status {
        CustomerStatus::Vip       => rng.int_between(80, 100),
        CustomerStatus::Recurring => rng.int_between(70, 90),
        CustomerStatus::Active    => rng.int_between(50, 80),
        CustomerStatus::New       => rng.int_between(40, 70),
        CustomerStatus::Inactive  => rng.int_between(20, 50),
    };

    let nps_rating = match (n_sales > 0, is_vip) {
        (false, _)    => None,
        (true, true)  => Some(rng.int_between(8, 11) as u8),
        (true, false) => Some(rng.int_between(0, 11) as u8),
    };

    let last_interaction = as_of - Duration::days(i64::from(rng.int_between(1, 30)));
    let assistant = assistant_summary(customer_score, as_of, rng);

    CustomerRecord {
        customer_id,
        name,
        email: format!("cliente{customer_id}@email.com"),
        phone,
        country: path.country.to_string(),
        region: path.region.to_string(),
        hub: path.hub.to_string(),
        status,
        is_vip,
        registration_date,
        last_interaction,
        assigned_agent_id,
        customer_score,
        nps_rating,
        vehicle_interests,
        transactions,
        assistant,
    }
}

fn assistant_summary(score: u32, as_of: NaiveDate, rng: &mut StreamRng) -> AssistantSummary {
    let sentiment = if score >= 70 {
        Sentiment::Positive
    } else if score >= 45 {
        Sentiment::Neutral
    } else {
        Sentiment::Negative
    };
    AssistantSummary {
        messages: rng.int_between(5, 45),
        last_topic: pick_str(rng, &ASSISTANT_TOPICS),
        sentiment,
        // Four of five financing options express interest.
        financing_interest: rng.chance(0.8),
        budget_range: rng.pick(&BUDGET_RANGES).copied().unwrap_or(BUDGET_RANGES[0]),
        last_interaction: as_of - Duration::days(i64::from(rng.int_between(0, 3))),
    }
}

fn pick_str(rng: &mut StreamRng, items: &[&str]) -> String {
    rng.pick(items).map(|s| s.to_string()).unwrap_or_default()
}

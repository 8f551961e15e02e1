//! Daily hub metrics.
//!
//! Sales are drawn first; the funnel is derived backwards from them
//! so leads >= appointments >= reservations >= sales always holds.

use super::scaled;
use crate::{
    config::PulseConfig,
    model::DailyMetricRecord,
    period::DateRange,
    rng::StreamRng,
};
use chrono::{Datelike, Duration};
use std::f64::consts::PI;

/// Relative size of a hub inside its region, from its name.
fn hub_weight(hub: &str) -> f64 {
    let name = hub.to_lowercase();
    if ["cdmx", "fashion", "hq", "midtown", "palermo", "pinheiros"]
        .iter()
        .any(|k| name.contains(k))
    {
        1.5
    } else if ["aliado", "carshop", "wh"].iter().any(|k| name.contains(k)) {
        0.6
    } else {
        1.0
    }
}

pub fn generate(config: &PulseConfig, history: &DateRange, rng: &mut StreamRng) -> Vec<DailyMetricRecord> {
    let days = history.len_days().max(1);
    let mut records = Vec::new();

    for country in &config.hierarchy.countries {
        let Some(profile) = config.profile(&country.name) else {
            log::warn!("country={} has no profile, skipping daily metrics", country.name);
            continue;
        };
        for region in &country.regions {
            for hub in &region.hubs {
                let weight = hub_weight(hub);
                for offset in 0..days {
                    let date = history.start + Duration::days(offset);

                    let season = 1.0 + 0.1 * (2.0 * PI * f64::from(date.ordinal()) / 365.0).sin();
                    let trend = 1.0 + 0.02 * offset as f64 / days as f64;
                    let base = f64::from(rng.poisson(2.0)) * weight;
                    let sales = ((base * season * trend * region.volume_scale) as u32).max(1);

                    let efficiency = rng.in_range(profile.efficiency);
                    let purchases = ((f64::from(sales) / efficiency) as u32).max(1);

                    let reservations = ((f64::from(sales) / rng.uniform(0.70, 0.85)) as u32).max(sales);
                    let appointments =
                        ((f64::from(reservations) / rng.uniform(0.45, 0.55)) as u32).max(reservations);
                    let leads = ((f64::from(appointments) / rng.uniform(0.55, 0.65)) as u32).max(appointments);

                    let ticket_avg = rng.in_range(profile.ticket_avg);
                    let full_margin = rng.in_range(profile.full_margin);
                    let fin_ins = rng.in_range(profile.fin_ins);
                    let kt = rng.in_range(profile.kt);
                    let ecac = rng.in_range(profile.ecac);
                    let nps_buyer = rng.in_range(profile.nps_buyer);
                    let nps_seller = rng.in_range(profile.nps_seller);

                    let cancellations = scaled(reservations, rng.uniform(0.05, 0.12));
                    let noshow = scaled(appointments, rng.uniform(0.08, 0.18));
                    let csat = rng.uniform(75.0, 92.0);
                    let sla = rng.uniform(4.0, 12.0);

                    records.push(DailyMetricRecord {
                        date,
                        country: country.name.clone(),
                        region: region.name.clone(),
                        hub: hub.clone(),
                        leads,
                        appointments,
                        reservations,
                        sales,
                        purchases,
                        cancellations,
                        noshow,
                        nps: Some((nps_buyer + nps_seller) / 2.0),
                        nps_buyer: Some(nps_buyer),
                        nps_seller: Some(nps_seller),
                        csat: Some(csat),
                        revenue: f64::from(sales) * ticket_avg,
                        ticket_avg,
                        full_margin,
                        fin_ins,
                        kt,
                        pc1: full_margin + fin_ins + kt,
                        ecac,
                        // eCAC = CPL * leads / sales
                        cost_per_lead: ecac * f64::from(sales) / f64::from(leads),
                        efficiency,
                        sla_lead_to_sale: Some(sla),
                    });
                }
            }
        }
    }
    records
}

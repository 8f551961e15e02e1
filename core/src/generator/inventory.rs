//! Inventory per region and vehicle segment.
//!
//! Inventory is tracked per region, so every row carries the region
//! name as its hub.

use super::scaled;
use crate::{
    config::PulseConfig,
    model::InventoryRecord,
    rng::StreamRng,
    types::VehicleSegment,
};

pub fn generate(config: &PulseConfig, rng: &mut StreamRng) -> Vec<InventoryRecord> {
    let mut records = Vec::new();

    for country in &config.hierarchy.countries {
        let Some(profile) = config.profile(&country.name) else {
            log::warn!("country={} has no profile, skipping inventory", country.name);
            continue;
        };
        let health = &profile.stock_health;
        let ops = &profile.operational;

        for region in &country.regions {
            for segment in VehicleSegment::ALL {
                let total_inventory = rng.in_range(profile.inventory_per_segment) as u32;
                let reserved = scaled(total_inventory, rng.uniform(0.08, 0.18));
                let vip = scaled(total_inventory, rng.uniform(0.03, 0.10));
                let available = scaled(
                    total_inventory.saturating_sub(reserved + vip),
                    ops.readiness.min(1.0),
                );

                let young = health.aging_0_30 + rng.uniform(-0.05, 0.05);
                let middle = health.aging_30_90 + rng.uniform(-0.05, 0.05);
                let old = health.aging_90_plus + rng.uniform(-0.03, 0.03);

                records.push(InventoryRecord {
                    country: country.name.clone(),
                    region: region.name.clone(),
                    hub: region.name.clone(),
                    segment,
                    total_inventory,
                    available,
                    reserved,
                    vip,
                    aging_0_30: scaled(total_inventory, young),
                    aging_30_60: scaled(total_inventory, middle * 0.6),
                    // 60+ is roughly 40% of the 30-90 band plus everything past 90.
                    aging_60_plus: scaled(total_inventory, middle * 0.4 + old),
                    avg_days_in_inventory: rng.uniform(18.0, 55.0),
                    sell_rate_30d: ops.sell_rate_30d + rng.uniform(-0.05, 0.05),
                    sell_rate_60d: ops.sell_rate_60d + rng.uniform(-0.05, 0.05),
                    readiness: ops.readiness + rng.uniform(-0.03, 0.03),
                });
            }
        }
    }
    records
}

//! Synthetic snapshot generator.
//!
//! RULE: The generator is the only producer of randomness in the
//! crate. Each entity table draws from its own RngBank slot, so
//! resizing one table never shifts the values of another.
//!
//! RULE: Same config + same seed + same as_of = byte-identical
//! snapshot JSON. Nothing here reads the wall clock.

pub mod agents;
pub mod customers;
pub mod daily;
pub mod inventory;
pub mod names;

use crate::{
    config::{HubPath, PulseConfig},
    period::DateRange,
    rng::{GeneratorSlot, RngBank, StreamRng},
    snapshot::Snapshot,
};
use chrono::NaiveDate;
use uuid::{Builder, Uuid};

pub struct SnapshotGenerator<'a> {
    config: &'a PulseConfig,
    seed:   u64,
}

impl<'a> SnapshotGenerator<'a> {
    pub fn new(config: &'a PulseConfig, seed: u64) -> Self {
        Self { config, seed }
    }

    /// Build a snapshot whose daily history covers the `history_days`
    /// days ending on `as_of` (at least one day).
    pub fn generate(&self, as_of: NaiveDate, history_days: u32) -> Snapshot {
        let bank = RngBank::new(self.seed);
        let mut meta_rng = bank.for_slot(GeneratorSlot::Snapshot);

        let snapshot_id = snapshot_uuid(&mut meta_rng);
        let staffed = staffed_hubs(self.config, &mut meta_rng);
        let history = DateRange::trailing(as_of, history_days.max(1));

        let daily_metrics = daily::generate(
            self.config,
            &history,
            &mut bank.for_slot(GeneratorSlot::DailyMetrics),
        );
        let agents = agents::generate(self.config, &staffed, &mut bank.for_slot(GeneratorSlot::Agents));
        let inventory = inventory::generate(self.config, &mut bank.for_slot(GeneratorSlot::Inventory));
        let customers = customers::generate(
            self.config,
            &staffed,
            &agents,
            as_of,
            &mut bank.for_slot(GeneratorSlot::Customers),
        );

        log::info!(
            "snapshot generated seed={} as_of={} daily={} inventory={} agents={} customers={}",
            self.seed,
            as_of,
            daily_metrics.len(),
            inventory.len(),
            agents.len(),
            customers.len(),
        );

        Snapshot {
            snapshot_id,
            generated_on: as_of,
            seed: self.seed,
            daily_metrics,
            inventory,
            agents,
            customers,
        }
    }
}

fn snapshot_uuid(rng: &mut StreamRng) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    Builder::from_random_bytes(bytes).into_uuid()
}

/// Hubs that carry agents and customers: up to `hubs_per_region`
/// hubs drawn from each region, in draw order.
fn staffed_hubs<'c>(config: &'c PulseConfig, rng: &mut StreamRng) -> Vec<HubPath<'c>> {
    let per_region = config.generator.hubs_per_region;
    let mut out = Vec::new();
    for country in &config.hierarchy.countries {
        for region in &country.regions {
            for hub in rng.sample(&region.hubs, per_region) {
                // `sample` clones; map back to the borrowed name.
                if let Some(name) = region.hubs.iter().find(|h| **h == hub) {
                    out.push(HubPath {
                        country: &country.name,
                        region:  &region.name,
                        hub:     name,
                    });
                }
            }
        }
    }
    out
}

/// Scale a count by a ratio, truncating toward zero.
pub(crate) fn scaled(count: u32, factor: f64) -> u32 {
    let v = f64::from(count) * factor;
    if v.is_finite() && v > 0.0 {
        v as u32
    } else {
        0
    }
}

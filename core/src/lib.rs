//! showroom-pulse-core: role-scoped KPI and alert engine for a
//! used-vehicle retail network.
//!
//! A `Snapshot` (generated or ingested) is scoped to a viewer,
//! aggregated per hub and period, run through the `AlertRule`
//! catalog and ranked into an `EvaluationReport`.

pub mod aggregate;
pub mod clock;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod insights;
pub mod kpi;
pub mod ladder;
pub mod model;
pub mod period;
pub mod ranker;
pub mod rng;
pub mod rules;
pub mod scope;
pub mod snapshot;
pub mod types;

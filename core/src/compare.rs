//! Period comparator: deltas between current and previous aggregates.

use crate::aggregate::AggregateRow;
use crate::types::GroupKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A value an `AggregateRow` can be compared on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Leads,
    Appointments,
    Reservations,
    Sales,
    Purchases,
    Cancellations,
    Noshow,
    Revenue,
    Nps,
    Csat,
    SlaLeadToSale,
    TicketAvg,
    FullMargin,
    FinIns,
    Kt,
    Pc1,
    Ecac,
    CostPerLead,
    /// Sales over leads, in percent.
    Conversion,
    /// Cancellations over reservations, as a ratio.
    CancellationRate,
}

impl Metric {
    pub fn value(&self, row: &AggregateRow) -> Option<f64> {
        match self {
            Self::Leads            => Some(row.leads as f64),
            Self::Appointments     => Some(row.appointments as f64),
            Self::Reservations     => Some(row.reservations as f64),
            Self::Sales            => Some(row.sales as f64),
            Self::Purchases        => Some(row.purchases as f64),
            Self::Cancellations    => Some(row.cancellations as f64),
            Self::Noshow           => Some(row.noshow as f64),
            Self::Revenue          => Some(row.revenue),
            Self::Nps              => row.nps,
            Self::Csat             => row.csat,
            Self::SlaLeadToSale    => row.sla_lead_to_sale,
            Self::TicketAvg        => row.ticket_avg,
            Self::FullMargin       => row.full_margin,
            Self::FinIns           => row.fin_ins,
            Self::Kt               => row.kt,
            Self::Pc1              => row.pc1,
            Self::Ecac             => row.ecac,
            Self::CostPerLead      => row.cost_per_lead,
            Self::Conversion       => row.conversion_pct(),
            Self::CancellationRate => row.cancellation_rate(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Comparison {
    pub current:   f64,
    pub previous:  f64,
    pub delta_abs: f64,
    /// `(current - previous) / previous * 100`; None when previous is 0.
    pub delta_pct: Option<f64>,
}

impl Comparison {
    pub fn between(current: f64, previous: f64) -> Self {
        let delta_pct = if previous != 0.0 {
            Some((current - previous) / previous * 100.0).filter(|d| d.is_finite())
        } else {
            None
        };
        Self {
            current,
            previous,
            delta_abs: current - previous,
            delta_pct,
        }
    }
}

/// None when either side has no value for `metric`.
pub fn compare(current: &AggregateRow, previous: &AggregateRow, metric: Metric) -> Option<Comparison> {
    let cur = metric.value(current)?;
    let prev = metric.value(previous)?;
    Some(Comparison::between(cur, prev))
}

/// Compare every group present in both maps. Groups missing on
/// either side are dropped, never zero-filled.
pub fn compare_groups(
    current: &BTreeMap<GroupKey, AggregateRow>,
    previous: &BTreeMap<GroupKey, AggregateRow>,
    metric: Metric,
) -> BTreeMap<GroupKey, Comparison> {
    current
        .iter()
        .filter_map(|(key, cur)| {
            let prev = previous.get(key)?;
            compare(cur, prev, metric).map(|c| (key.clone(), c))
        })
        .collect()
}

/// Percentage change for a KPI card. None when there is nothing to
/// show: no baseline, or no change at all.
pub fn display_delta(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 || previous == current {
        return None;
    }
    Comparison::between(current, previous).delta_pct
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_baseline_has_no_percentage() {
        let c = Comparison::between(5.0, 0.0);
        assert_eq!(c.delta_abs, 5.0);
        assert!(c.delta_pct.is_none());
    }

    #[test]
    fn display_delta_hides_unchanged_values() {
        assert_eq!(display_delta(10.0, 10.0), None);
        assert_eq!(display_delta(10.0, 0.0), None);
        let d = display_delta(12.0, 10.0).unwrap();
        assert!((d - 20.0).abs() < 1e-9);
    }
}

//! Metric aggregator: per-day hub rows rolled up into period rows.
//!
//! RULE: A group with no rows in the period is absent from the
//! result. It is never present with zero or NaN placeholders, so
//! comparators can tell "no data" apart from "zero".

use crate::{
    kpi::ratio,
    model::DailyMetricRecord,
    period::DateRange,
    types::GroupKey,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Hub,
    Region,
    Country,
}

impl GroupBy {
    pub fn key<'a>(&self, record: &'a DailyMetricRecord) -> &'a str {
        match self {
            Self::Hub     => &record.hub,
            Self::Region  => &record.region,
            Self::Country => &record.country,
        }
    }
}

/// Period totals and means for one group.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AggregateRow {
    /// Distinct dates contributing rows.
    pub days: u32,
    pub rows: u32,

    pub leads:         u64,
    pub appointments:  u64,
    pub reservations:  u64,
    pub sales:         u64,
    pub purchases:     u64,
    pub cancellations: u64,
    pub noshow:        u64,
    pub revenue:       f64,

    // Means over rows carrying a finite value; None when there are none.
    pub nps:              Option<f64>,
    pub nps_buyer:        Option<f64>,
    pub nps_seller:       Option<f64>,
    pub csat:             Option<f64>,
    pub sla_lead_to_sale: Option<f64>,
    pub ticket_avg:       Option<f64>,
    pub full_margin:      Option<f64>,
    pub fin_ins:          Option<f64>,
    pub kt:               Option<f64>,
    pub pc1:              Option<f64>,
    pub ecac:             Option<f64>,
    pub cost_per_lead:    Option<f64>,
}

impl AggregateRow {
    /// Sales over leads as a percentage; None without leads.
    pub fn conversion_pct(&self) -> Option<f64> {
        (self.leads > 0).then(|| ratio(self.sales as f64, self.leads as f64) * 100.0)
    }

    /// Cancellations over reservations as a ratio; None without reservations.
    pub fn cancellation_rate(&self) -> Option<f64> {
        (self.reservations > 0).then(|| ratio(self.cancellations as f64, self.reservations as f64))
    }

    /// Average units sold per day with data.
    pub fn avg_daily_sales(&self) -> f64 {
        ratio(self.sales as f64, f64::from(self.days))
    }
}

// ── Accumulation ───────────────────────────────────────────────────

#[derive(Default)]
struct Mean {
    sum:   f64,
    count: u32,
}

impl Mean {
    fn push(&mut self, value: f64) {
        if value.is_finite() {
            self.sum += value;
            self.count += 1;
        }
    }

    fn push_opt(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.push(v);
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }
}

#[derive(Default)]
struct Accumulator {
    dates: BTreeSet<NaiveDate>,
    row:   AggregateRow,
    nps:              Mean,
    nps_buyer:        Mean,
    nps_seller:       Mean,
    csat:             Mean,
    sla_lead_to_sale: Mean,
    ticket_avg:       Mean,
    full_margin:      Mean,
    fin_ins:          Mean,
    kt:               Mean,
    pc1:              Mean,
    ecac:             Mean,
    cost_per_lead:    Mean,
}

impl Accumulator {
    fn push(&mut self, r: &DailyMetricRecord) {
        self.dates.insert(r.date);
        let row = &mut self.row;
        row.rows += 1;
        row.leads += u64::from(r.leads);
        row.appointments += u64::from(r.appointments);
        row.reservations += u64::from(r.reservations);
        row.sales += u64::from(r.sales);
        row.purchases += u64::from(r.purchases);
        row.cancellations += u64::from(r.cancellations);
        row.noshow += u64::from(r.noshow);
        if r.revenue.is_finite() {
            row.revenue += r.revenue;
        }

        self.nps.push_opt(r.nps);
        self.nps_buyer.push_opt(r.nps_buyer);
        self.nps_seller.push_opt(r.nps_seller);
        self.csat.push_opt(r.csat);
        self.sla_lead_to_sale.push_opt(r.sla_lead_to_sale);
        self.ticket_avg.push(r.ticket_avg);
        self.full_margin.push(r.full_margin);
        self.fin_ins.push(r.fin_ins);
        self.kt.push(r.kt);
        self.pc1.push(r.pc1);
        self.ecac.push(r.ecac);
        self.cost_per_lead.push(r.cost_per_lead);
    }

    fn finish(self) -> AggregateRow {
        AggregateRow {
            days:             self.dates.len() as u32,
            nps:              self.nps.value(),
            nps_buyer:        self.nps_buyer.value(),
            nps_seller:       self.nps_seller.value(),
            csat:             self.csat.value(),
            sla_lead_to_sale: self.sla_lead_to_sale.value(),
            ticket_avg:       self.ticket_avg.value(),
            full_margin:      self.full_margin.value(),
            fin_ins:          self.fin_ins.value(),
            kt:               self.kt.value(),
            pc1:              self.pc1.value(),
            ecac:             self.ecac.value(),
            cost_per_lead:    self.cost_per_lead.value(),
            ..self.row
        }
    }
}

/// Roll `records` inside `period` up by `group_by`.
pub fn aggregate(
    records: &[DailyMetricRecord],
    group_by: GroupBy,
    period: &DateRange,
) -> BTreeMap<GroupKey, AggregateRow> {
    let mut groups: BTreeMap<GroupKey, Accumulator> = BTreeMap::new();
    for r in records.iter().filter(|r| period.contains(r.date)) {
        groups
            .entry(group_by.key(r).to_string())
            .or_default()
            .push(r);
    }
    groups
        .into_iter()
        .map(|(key, acc)| (key, acc.finish()))
        .collect()
}

/// One row for every record inside `period`, regardless of location.
/// None when the period holds no rows.
pub fn aggregate_total(records: &[DailyMetricRecord], period: &DateRange) -> Option<AggregateRow> {
    let mut acc = Accumulator::default();
    for r in records.iter().filter(|r| period.contains(r.date)) {
        acc.push(r);
    }
    (acc.row.rows > 0).then(|| acc.finish())
}

/// Map each hub to the country it reports under.
pub fn hub_countries(records: &[DailyMetricRecord]) -> BTreeMap<&str, &str> {
    records
        .iter()
        .map(|r| (r.hub.as_str(), r.country.as_str()))
        .collect()
}

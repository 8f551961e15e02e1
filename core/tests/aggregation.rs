//! Metric aggregation and period comparison over hand-built rows.

mod common;

use common::*;
use showroom_pulse_core::{
    aggregate::{aggregate, aggregate_total, GroupBy},
    compare::{compare, compare_groups, display_delta, Metric},
    period::DateRange,
};

#[test]
fn empty_input_yields_empty_groups() {
    assert!(aggregate(&[], GroupBy::Hub, &march()).is_empty());
    assert!(aggregate_total(&[], &march()).is_none());
}

#[test]
fn period_bounds_are_inclusive() {
    let records = vec![
        daily(d(2025, 3, 1), "Hub A", 10, 1),
        daily(d(2025, 3, 2), "Hub A", 10, 2),
        daily(d(2025, 3, 31), "Hub A", 10, 3),
        daily(d(2025, 4, 1), "Hub A", 10, 4),
    ];
    let rows = aggregate(&records, GroupBy::Hub, &march());
    let hub = &rows["Hub A"];
    assert_eq!(hub.sales, 5);
    assert_eq!(hub.days, 2);
}

#[test]
fn rows_roll_up_by_region_and_country() {
    let mut other = daily(d(2025, 3, 10), "MTY Valle", 50, 5);
    other.region = "Monterrey".into();
    let records = vec![
        daily(d(2025, 3, 10), "CDMX Norte", 100, 10),
        daily(d(2025, 3, 10), "CDMX Sur", 100, 20),
        other,
    ];

    let by_region = aggregate(&records, GroupBy::Region, &march());
    assert_eq!(by_region.len(), 2);
    assert_eq!(by_region[REGION].sales, 30);
    assert_eq!(by_region[REGION].leads, 200);
    assert_eq!(by_region["Monterrey"].sales, 5);

    let by_country = aggregate(&records, GroupBy::Country, &march());
    assert_eq!(by_country.len(), 1);
    assert_eq!(by_country[COUNTRY].sales, 35);
    assert_eq!(by_country[COUNTRY].rows, 3);
    assert_eq!(by_country[COUNTRY].days, 1);
}

#[test]
fn means_skip_missing_values() {
    let mut silent = daily(d(2025, 3, 11), "Hub A", 10, 1);
    silent.nps = None;
    let mut loud = daily(d(2025, 3, 12), "Hub A", 10, 1);
    loud.nps = Some(60.0);
    let records = vec![daily(d(2025, 3, 10), "Hub A", 10, 1), silent, loud];

    let total = aggregate_total(&records, &march()).unwrap();
    assert_eq!(total.nps, Some(67.5));
    assert_eq!(total.rows, 3);
}

#[test]
fn hub_with_only_missing_nps_has_no_mean() {
    let mut r = daily(d(2025, 3, 10), "Hub A", 10, 1);
    r.nps = None;
    let total = aggregate_total(&[r], &march()).unwrap();
    assert_eq!(total.nps, None);
}

#[test]
fn derived_rates_need_denominators() {
    let total = aggregate_total(&[daily(d(2025, 3, 10), "Hub A", 0, 0)], &march()).unwrap();
    assert_eq!(total.conversion_pct(), None);
    assert_eq!(total.cancellation_rate(), None);

    let total = aggregate_total(&[daily(d(2025, 3, 10), "Hub A", 200, 50)], &march()).unwrap();
    assert_eq!(total.conversion_pct(), Some(25.0));
}

#[test]
fn average_daily_sales_counts_days_with_data() {
    let records = vec![
        daily(d(2025, 3, 10), "Hub A", 20, 4),
        daily(d(2025, 3, 10), "Hub B", 20, 2),
        daily(d(2025, 3, 20), "Hub A", 20, 6),
    ];
    let total = aggregate_total(&records, &march()).unwrap();
    assert_eq!(total.days, 2);
    assert_eq!(total.avg_daily_sales(), 6.0);
}

// ── Comparison ─────────────────────────────────────────────────────

#[test]
fn comparison_reports_absolute_and_relative_change() {
    let period = march();
    let records = vec![
        daily(d(2025, 2, 20), "Hub A", 100, 20),
        daily(d(2025, 3, 20), "Hub A", 100, 25),
    ];
    let cur = aggregate_total(&records, &period).unwrap();
    let prev = aggregate_total(&records, &period.previous()).unwrap();

    let sales = compare(&cur, &prev, Metric::Sales).unwrap();
    assert_eq!(sales.delta_abs, 5.0);
    assert_eq!(sales.delta_pct, Some(25.0));
}

#[test]
fn zero_baseline_has_no_percentage() {
    let period = march();
    let records = vec![
        daily(d(2025, 2, 20), "Hub A", 100, 0),
        daily(d(2025, 3, 20), "Hub A", 100, 5),
    ];
    let cur = aggregate_total(&records, &period).unwrap();
    let prev = aggregate_total(&records, &period.previous()).unwrap();

    let sales = compare(&cur, &prev, Metric::Sales).unwrap();
    assert_eq!(sales.delta_abs, 5.0);
    assert_eq!(sales.delta_pct, None);
    assert_eq!(display_delta(5.0, 0.0), None);
    assert_eq!(display_delta(5.0, 5.0), None);
}

#[test]
fn metric_without_values_is_not_compared() {
    let period = march();
    let mut a = daily(d(2025, 2, 20), "Hub A", 100, 10);
    a.nps = None;
    let b = daily(d(2025, 3, 20), "Hub A", 100, 10);
    let records = vec![a, b];
    let cur = aggregate_total(&records, &period).unwrap();
    let prev = aggregate_total(&records, &period.previous()).unwrap();
    assert!(compare(&cur, &prev, Metric::Nps).is_none());
}

#[test]
fn groups_missing_a_side_are_dropped() {
    let period = march();
    let records = vec![
        daily(d(2025, 2, 20), "Hub A", 100, 20),
        daily(d(2025, 3, 20), "Hub A", 100, 10),
        daily(d(2025, 3, 20), "Hub New", 100, 10),
        daily(d(2025, 2, 20), "Hub Closed", 100, 10),
    ];
    let cur = aggregate(&records, GroupBy::Hub, &period);
    let prev = aggregate(&records, GroupBy::Hub, &period.previous());

    let deltas = compare_groups(&cur, &prev, Metric::Conversion);
    assert_eq!(deltas.keys().collect::<Vec<_>>(), ["Hub A"]);
    let pct = deltas["Hub A"].delta_pct.unwrap();
    assert!((pct + 50.0).abs() < 1e-9, "delta_pct = {pct}");
}

#[test]
fn previous_window_abuts_the_current_one() {
    let period = march();
    let prev = period.previous();
    assert_eq!(prev.end, d(2025, 3, 1));
    assert_eq!(prev.start, d(2025, 1, 31));
    assert_eq!(prev.len_days(), period.len_days());
    assert!(DateRange::new(d(2025, 3, 2), d(2025, 3, 1)).is_err());
}

//! Ranking of merged alert lists.

mod common;

use common::*;
use showroom_pulse_core::{
    ranker::{count_by_severity, rank},
    types::Severity,
};

#[test]
fn severity_outranks_recency() {
    let t0 = at(2025, 3, 31, 8);
    let t1 = at(2025, 3, 31, 9);
    let t2 = at(2025, 3, 31, 10);
    let ranked = rank(vec![
        alert(Severity::Warning, t1, "w"),
        alert(Severity::Critical, t0, "c"),
        alert(Severity::Info, t2, "i"),
    ]);
    let order: Vec<_> = ranked.iter().map(|a| a.severity).collect();
    assert_eq!(order, [Severity::Critical, Severity::Warning, Severity::Info]);
}

#[test]
fn newest_first_within_a_severity() {
    let ranked = rank(vec![
        alert(Severity::Warning, at(2025, 3, 30, 8), "old"),
        alert(Severity::Warning, at(2025, 3, 31, 8), "new"),
        alert(Severity::Critical, at(2025, 3, 29, 8), "oldest"),
    ]);
    let titles: Vec<_> = ranked.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, ["oldest", "new", "old"]);
}

#[test]
fn exact_ties_keep_emission_order() {
    let t = at(2025, 3, 31, 8);
    let ranked = rank(vec![
        alert(Severity::Info, t, "first"),
        alert(Severity::Info, t, "second"),
        alert(Severity::Info, t, "third"),
    ]);
    let titles: Vec<_> = ranked.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, ["first", "second", "third"]);
}

#[test]
fn ranking_is_idempotent() {
    let alerts = vec![
        alert(Severity::Info, at(2025, 3, 31, 8), "a"),
        alert(Severity::Critical, at(2025, 3, 30, 8), "b"),
        alert(Severity::Warning, at(2025, 3, 31, 9), "c"),
        alert(Severity::Critical, at(2025, 3, 31, 8), "d"),
    ];
    let once = rank(alerts);
    let twice = rank(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn counts_cover_every_alert() {
    let t = at(2025, 3, 31, 8);
    let alerts = vec![
        alert(Severity::Critical, t, "a"),
        alert(Severity::Warning, t, "b"),
        alert(Severity::Warning, t, "c"),
    ];
    let counts = count_by_severity(&alerts);
    assert_eq!((counts.critical, counts.warning, counts.info), (1, 2, 0));
    assert_eq!(counts.total(), alerts.len());
    assert_eq!(count_by_severity(&[]).total(), 0);
}

//! pulse-runner: headless alert pass over a synthetic snapshot.
//!
//! Usage:
//!   pulse-runner --seed 42 --days 90 --period 30
//!   pulse-runner --seed 42 --country México --hub "MTY - Valle Oriente" --json
//!   pulse-runner --seed 7 --as-of 2025-06-30 --export snapshot.json

use anyhow::{Context, Result};
use chrono::NaiveDate;
use showroom_pulse_core::{
    clock::EvalClock,
    config::PulseConfig,
    engine::{AlertEngine, EvaluationReport},
    generator::SnapshotGenerator,
    insights::{ExecutiveSummary, KpiValue, TeamSummary},
    period::DateRange,
    scope::{ScopeFilter, VisibilityScope},
};
use std::env;

#[derive(serde::Serialize)]
struct RunOutput<'a> {
    seed:      u64,
    report:    &'a EvaluationReport,
    executive: &'a ExecutiveSummary,
    team:      &'a TeamSummary,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let days = parse_arg(&args, "--days", 90u32);
    let period_days = parse_arg(&args, "--period", 30u32);
    let json = args.iter().any(|a| a == "--json");
    let data_dir = arg_str(&args, "--data-dir").unwrap_or("./data");
    let export = arg_str(&args, "--export");

    let (as_of, clock) = match arg_str(&args, "--as-of") {
        Some(raw) => {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .with_context(|| format!("--as-of expects YYYY-MM-DD, got '{raw}'"))?;
            (date, EvalClock::fixed_on(date))
        }
        None => (EvalClock::System.today(), EvalClock::System),
    };

    let scope = VisibilityScope {
        country: ScopeFilter::parse(arg_str(&args, "--country").unwrap_or("all")),
        region:  ScopeFilter::parse(arg_str(&args, "--region").unwrap_or("all")),
        hub:     ScopeFilter::parse(arg_str(&args, "--hub").unwrap_or("all")),
    };

    let config = PulseConfig::load(data_dir)?;
    let snapshot = SnapshotGenerator::new(&config, seed).generate(as_of, days);
    let findings = snapshot.validate(&config.validation)?;
    if !findings.is_clean() {
        log::warn!(
            "snapshot has funnel_violations={} inventory_violations={}",
            findings.funnel_violations,
            findings.inventory_violations
        );
    }

    if let Some(path) = export {
        std::fs::write(path, snapshot.to_json()?)
            .with_context(|| format!("Cannot write {path}"))?;
        log::info!("snapshot exported to {path}");
    }

    let period = DateRange::trailing(as_of, period_days.max(1));
    let engine = AlertEngine::from_config(&config).with_clock(clock);
    let report = engine.evaluate(&snapshot, &scope, period);

    let scoped = snapshot.scoped(&scope);
    let executive = ExecutiveSummary::build(&scoped, period, &config.thresholds);
    let team = TeamSummary::build(&scoped.agents);

    if json {
        let out = RunOutput {
            seed,
            report: &report,
            executive: &executive,
            team: &team,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Showroom Pulse - pulse-runner");
        println!("  seed:      {seed}");
        println!("  as_of:     {as_of}");
        println!("  history:   {days} days");
        println!("  period:    {period}");
        println!("  scope:     {scope}");
        println!("  data_dir:  {data_dir}");
        println!();
        print_alerts(&report);
        println!();
        print_summary(&executive, &team);
    }

    Ok(())
}

fn print_alerts(report: &EvaluationReport) {
    println!("=== ALERTS ===");
    println!(
        "  critical: {}  warning: {}  info: {}",
        report.counts.critical, report.counts.warning, report.counts.info
    );
    if report.alerts.is_empty() {
        println!("  (No alerts for this scope and period)");
    }
    for alert in &report.alerts {
        println!("  [{:<8}] {} | {}", alert.severity.as_str(), alert.title, alert.description);
    }
}

fn print_summary(exec: &ExecutiveSummary, team: &TeamSummary) {
    println!("=== EXECUTIVE SUMMARY ===");
    let line = |label: &str, kpi: Option<KpiValue>| match kpi {
        Some(k) => match k.delta_pct {
            Some(d) => println!("  {label:<16} {:>14.1} ({d:+.1}%)", k.value),
            None => println!("  {label:<16} {:>14.1}", k.value),
        },
        None => println!("  {label:<16} {:>14}", "-"),
    };
    line("sales", exec.sales);
    line("revenue", exec.revenue);
    line("leads", exec.leads);
    line("conversion %", exec.conversion_pct);
    line("nps", exec.nps);
    line("cancellations", exec.cancellations);
    line("pc1 - ecac", exec.unit_economics.pc1_minus_ecac);
    println!(
        "  inventory:       {} units, {} available, {:.1}% aged 60+",
        exec.inventory.total, exec.inventory.available, exec.inventory.aging_pct
    );

    println!();
    println!("=== TOP HUBS ===");
    for hub in exec.hub_ranking.iter().take(5) {
        println!(
            "  {:<36} sales: {:>5} | revenue: ${:.0}",
            hub.hub, hub.sales, hub.revenue
        );
    }

    println!();
    println!("=== TEAM ===");
    println!("  agents:          {}", team.headcount);
    println!("  avg conversion:  {:.1}%", team.avg_conversion * 100.0);
    println!("  avg utilization: {:.1}%", team.avg_utilization * 100.0);
    for (quadrant, n) in &team.quadrants {
        println!("  {:<16} {n}", quadrant.label());
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn arg_str<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

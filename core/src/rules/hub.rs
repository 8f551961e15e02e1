//! Strategic per-hub rules: period-over-period trends and stock aging.

use super::{AlertRule, Audience, RuleContext};
use crate::{
    config::ThresholdKey,
    kpi::ratio,
    ladder::SeverityLadder,
    model::{Alert, AlertDetail, AlertEntity, RuleId},
    period::{week_start, DateRange},
    types::Severity,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub fn rules() -> Vec<Box<dyn AlertRule>> {
    vec![
        Box::new(ConversionDrop),
        Box::new(CriticalInventoryAging),
        Box::new(NpsDecline),
        Box::new(CancellationSpike),
        Box::new(ConversionVolatility),
    ]
}

// ── Conversion drop ────────────────────────────────────────────────

/// Relative change of hub conversion against the previous window.
pub struct ConversionDrop;

impl AlertRule for ConversionDrop {
    fn id(&self) -> RuleId { RuleId::ConversionDrop }
    fn audience(&self) -> Audience { Audience::Strategic }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Alert> {
        let ladder = SeverityLadder::below(false)
            .step(-ctx.threshold(ThresholdKey::ConversionDropWarningPct), Severity::Warning)
            .step(-ctx.threshold(ThresholdKey::ConversionDropCriticalPct), Severity::Critical);

        let mut alerts = Vec::new();
        for (hub, current) in &ctx.current {
            let Some(previous) = ctx.previous.get(hub) else {
                log::debug!("conversion_drop skips hub={hub}: no previous data");
                continue;
            };
            let (Some(cur), Some(prev)) = (current.conversion_pct(), previous.conversion_pct()) else {
                continue;
            };
            if prev <= 0.0 {
                continue;
            }
            let drop_pct = (cur - prev) / prev * 100.0;
            let Some(severity) = ladder.classify(drop_pct) else {
                continue;
            };
            alerts.push(
                Alert::new(
                    self.id(),
                    severity,
                    ctx.hub_entity(hub),
                    drop_pct,
                    AlertDetail::ConversionDrop {
                        current_pct: cur,
                        previous_pct: prev,
                        drop_pct,
                    },
                    ctx.now,
                )
                .with_text(
                    format!("Conversion drop - {hub}"),
                    format!(
                        "Conversion fell {:.1}% vs previous period ({prev:.1}% -> {cur:.1}%)",
                        drop_pct.abs()
                    ),
                ),
            );
        }
        alerts
    }
}

// ── Critical inventory aging ───────────────────────────────────────

/// Units older than 60 days, summed per (country, hub).
pub struct CriticalInventoryAging;

impl AlertRule for CriticalInventoryAging {
    fn id(&self) -> RuleId { RuleId::CriticalInventoryAging }
    fn audience(&self) -> Audience { Audience::Strategic }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Alert> {
        let ladder = SeverityLadder::above(true)
            .step(ctx.threshold(ThresholdKey::InventoryAgingWarningUnits), Severity::Warning)
            .step(ctx.threshold(ThresholdKey::InventoryAgingCriticalUnits), Severity::Critical);

        let mut by_hub: BTreeMap<(&str, &str), (u32, u32)> = BTreeMap::new();
        for r in &ctx.snapshot.inventory {
            let entry = by_hub.entry((r.country.as_str(), r.hub.as_str())).or_default();
            entry.0 += r.aging_60_plus;
            entry.1 += r.total_inventory;
        }

        let mut alerts = Vec::new();
        for ((country, hub), (aging, total)) in by_hub {
            let Some(severity) = ladder.classify(f64::from(aging)) else {
                continue;
            };
            let aging_pct = ratio(f64::from(aging), f64::from(total)) * 100.0;
            alerts.push(
                Alert::new(
                    self.id(),
                    severity,
                    AlertEntity::Hub {
                        country: Some(country.to_string()),
                        hub: hub.to_string(),
                    },
                    f64::from(aging),
                    AlertDetail::InventoryAging {
                        aging_count: aging,
                        aging_pct,
                    },
                    ctx.now,
                )
                .with_text(
                    format!("Aged inventory - {hub}"),
                    format!("{aging} vehicles over 60 days in stock ({aging_pct:.0}% of total)"),
                ),
            );
        }
        alerts
    }
}

// ── NPS decline ────────────────────────────────────────────────────

/// Low hub NPS, or a sharp drop against the previous window.
/// A low-NPS alert supersedes the drop alert for the same hub.
pub struct NpsDecline;

impl AlertRule for NpsDecline {
    fn id(&self) -> RuleId { RuleId::NpsDecline }
    fn audience(&self) -> Audience { Audience::Strategic }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Alert> {
        let warning = ctx.threshold(ThresholdKey::NpsWarning);
        let margin = ctx.threshold(ThresholdKey::NpsCriticalMargin);
        let drop_points = ctx.threshold(ThresholdKey::NpsDropPoints);
        let ladder = SeverityLadder::below(false)
            .step(warning, Severity::Warning)
            .step(warning - margin, Severity::Critical);

        let mut alerts = Vec::new();
        for (hub, current) in &ctx.current {
            let Some(previous) = ctx.previous.get(hub) else {
                continue;
            };
            let Some(cur) = current.nps else {
                continue;
            };
            let prev = previous.nps;

            if let Some(severity) = ladder.classify(cur) {
                alerts.push(
                    Alert::new(
                        self.id(),
                        severity,
                        ctx.hub_entity(hub),
                        cur,
                        AlertDetail::Nps {
                            current_nps: cur,
                            previous_nps: prev,
                            drop_points: None,
                        },
                        ctx.now,
                    )
                    .with_text(
                        format!("Low NPS - {hub}"),
                        format!("Current NPS: {cur:.0} (threshold: {warning:.0})"),
                    ),
                );
            } else if let Some(prev) = prev.filter(|p| p - cur > drop_points) {
                let drop = prev - cur;
                alerts.push(
                    Alert::new(
                        self.id(),
                        Severity::Warning,
                        ctx.hub_entity(hub),
                        -drop,
                        AlertDetail::Nps {
                            current_nps: cur,
                            previous_nps: Some(prev),
                            drop_points: Some(drop),
                        },
                        ctx.now,
                    )
                    .with_text(
                        format!("NPS drop - {hub}"),
                        format!("NPS fell {drop:.0} points vs previous period ({prev:.0} -> {cur:.0})"),
                    ),
                );
            }
        }
        alerts
    }
}

// ── Cancellation spike ─────────────────────────────────────────────

pub struct CancellationSpike;

impl AlertRule for CancellationSpike {
    fn id(&self) -> RuleId { RuleId::CancellationSpike }
    fn audience(&self) -> Audience { Audience::Strategic }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Alert> {
        let ladder = SeverityLadder::above(false)
            .step(ctx.threshold(ThresholdKey::CancellationSpikeWarningPct), Severity::Warning)
            .step(ctx.threshold(ThresholdKey::CancellationSpikeCriticalPct), Severity::Critical);

        let mut alerts = Vec::new();
        for (hub, current) in &ctx.current {
            let Some(previous) = ctx.previous.get(hub) else {
                continue;
            };
            if previous.cancellations == 0 {
                log::debug!("cancellation_spike skips hub={hub}: previous cancellations are zero");
                continue;
            }
            let cur = current.cancellations as f64;
            let prev = previous.cancellations as f64;
            let increase_pct = (cur - prev) / prev * 100.0;
            let Some(severity) = ladder.classify(increase_pct) else {
                continue;
            };
            alerts.push(
                Alert::new(
                    self.id(),
                    severity,
                    ctx.hub_entity(hub),
                    increase_pct,
                    AlertDetail::CancellationSpike {
                        current: current.cancellations,
                        previous: previous.cancellations,
                        increase_pct,
                    },
                    ctx.now,
                )
                .with_text(
                    format!("Cancellation spike - {hub}"),
                    format!(
                        "Cancellations rose {increase_pct:.0}% vs previous period ({prev:.0} -> {cur:.0})"
                    ),
                ),
            );
        }
        alerts
    }
}

// ── Conversion volatility ──────────────────────────────────────────

/// Coefficient of variation of weekly hub conversion over the
/// lookback window ending with the current period.
pub struct ConversionVolatility;

/// Weekly conversion percentages per hub, weeks starting Monday.
/// Weeks without leads carry no conversion and are left out.
pub fn weekly_conversion(ctx: &RuleContext<'_>, window: &DateRange) -> BTreeMap<String, Vec<f64>> {
    let mut weeks: BTreeMap<(&str, NaiveDate), (u64, u64)> = BTreeMap::new();
    for r in ctx.snapshot.daily_metrics.iter().filter(|r| window.contains(r.date)) {
        let entry = weeks.entry((r.hub.as_str(), week_start(r.date))).or_default();
        entry.0 += u64::from(r.sales);
        entry.1 += u64::from(r.leads);
    }

    let mut series: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for ((hub, _week), (sales, leads)) in weeks {
        if leads == 0 {
            continue;
        }
        series
            .entry(hub.to_string())
            .or_default()
            .push(ratio(sales as f64, leads as f64) * 100.0);
    }
    series
}

/// Sample standard deviation over mean. None below two samples or
/// with a non-positive mean.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return None;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let cv = variance.sqrt() / mean;
    cv.is_finite().then_some(cv)
}

impl AlertRule for ConversionVolatility {
    fn id(&self) -> RuleId { RuleId::ConversionVolatility }
    fn audience(&self) -> Audience { Audience::Strategic }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Alert> {
        let limit = ctx.threshold(ThresholdKey::ConversionVolatilityCv);
        let ladder = SeverityLadder::above(false).step(limit, Severity::Warning);
        let lookback = ctx.thresholds.days(ThresholdKey::VolatilityLookbackDays);
        let window = DateRange::trailing(ctx.period.end, lookback);

        let mut alerts = Vec::new();
        for (hub, series) in weekly_conversion(ctx, &window) {
            let Some(cv) = coefficient_of_variation(&series) else {
                continue;
            };
            let Some(severity) = ladder.classify(cv) else {
                continue;
            };
            alerts.push(
                Alert::new(
                    self.id(),
                    severity,
                    ctx.hub_entity(&hub),
                    cv,
                    AlertDetail::Volatility {
                        cv,
                        weeks: series.len(),
                    },
                    ctx.now,
                )
                .with_text(
                    format!("Volatile conversion - {hub}"),
                    format!(
                        "Weekly conversion is unstable (CV: {:.1}%). Review operational consistency.",
                        cv * 100.0
                    ),
                ),
            );
        }
        alerts
    }
}

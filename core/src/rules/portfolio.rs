//! Operational rules over the whole visible scope rather than
//! individual hubs or agents.

use super::{AlertRule, Audience, RuleContext};
use crate::{
    aggregate::aggregate_total,
    config::ThresholdKey,
    kpi::{inventory_runway_days, ratio},
    ladder::SeverityLadder,
    model::{Alert, AlertDetail, AlertEntity, RuleId},
    period::DateRange,
    types::Severity,
};

pub fn rules() -> Vec<Box<dyn AlertRule>> {
    vec![
        Box::new(AggregateAgedInventory),
        Box::new(LowInventoryRunway),
        Box::new(HighCancellationRate),
        Box::new(RecentLowNps),
    ]
}

pub struct AggregateAgedInventory;

impl AlertRule for AggregateAgedInventory {
    fn id(&self) -> RuleId { RuleId::AggregateAgedInventory }
    fn audience(&self) -> Audience { Audience::Operational }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Alert> {
        let inventory = &ctx.snapshot.inventory;
        if inventory.is_empty() {
            return Vec::new();
        }
        let ladder = SeverityLadder::above(false)
            .step(ctx.threshold(ThresholdKey::AggregateAgingWarningUnits), Severity::Warning)
            .step(ctx.threshold(ThresholdKey::AggregateAgingCriticalUnits), Severity::Critical);

        let aged: u32 = inventory.iter().map(|r| r.aging_60_plus).sum();
        let total: u32 = inventory.iter().map(|r| r.total_inventory).sum();
        let Some(severity) = ladder.classify(f64::from(aged)) else {
            return Vec::new();
        };
        let aging_pct = ratio(f64::from(aged), f64::from(total)) * 100.0;
        vec![Alert::new(
            self.id(),
            severity,
            AlertEntity::Scope,
            f64::from(aged),
            AlertDetail::InventoryAging {
                aging_count: aged,
                aging_pct,
            },
            ctx.now,
        )
        .with_text(
            format!("Aged inventory: {aged} vehicles"),
            format!("{aging_pct:.0}% of inventory is over 60 days old. Consider price adjustments or promotions."),
        )]
    }
}

/// Available units over average daily sales of the current period.
/// Skipped when nothing sold, since the runway is then unbounded.
pub struct LowInventoryRunway;

impl AlertRule for LowInventoryRunway {
    fn id(&self) -> RuleId { RuleId::LowInventoryRunway }
    fn audience(&self) -> Audience { Audience::Operational }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Alert> {
        if ctx.snapshot.inventory.is_empty() {
            return Vec::new();
        }
        let Some(totals) = aggregate_total(&ctx.snapshot.daily_metrics, &ctx.period) else {
            return Vec::new();
        };
        let available: u32 = ctx.snapshot.inventory.iter().map(|r| r.available).sum();
        let avg_daily_sales = totals.avg_daily_sales();
        let Some(days) = inventory_runway_days(f64::from(available), avg_daily_sales) else {
            log::debug!("low_inventory_runway skipped: no sales in {}", ctx.period);
            return Vec::new();
        };
        if days >= ctx.threshold(ThresholdKey::InventoryRunwayMinDays) {
            return Vec::new();
        }
        vec![Alert::new(
            self.id(),
            Severity::Warning,
            AlertEntity::Scope,
            days,
            AlertDetail::InventoryRunway {
                days_of_inventory: days,
                available_units: available,
                avg_daily_sales,
            },
            ctx.now,
        )
        .with_text(
            "Low inventory",
            format!("Only {days:.0} days of available inventory. Consider restocking."),
        )]
    }
}

pub struct HighCancellationRate;

impl AlertRule for HighCancellationRate {
    fn id(&self) -> RuleId { RuleId::HighCancellationRate }
    fn audience(&self) -> Audience { Audience::Operational }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Alert> {
        let Some(totals) = aggregate_total(&ctx.snapshot.daily_metrics, &ctx.period) else {
            return Vec::new();
        };
        let Some(rate) = totals.cancellation_rate() else {
            return Vec::new();
        };
        let ladder = SeverityLadder::above(false)
            .step(ctx.threshold(ThresholdKey::CancellationRateWarning), Severity::Warning)
            .step(ctx.threshold(ThresholdKey::CancellationRateCritical), Severity::Critical);
        let Some(severity) = ladder.classify(rate) else {
            return Vec::new();
        };
        vec![Alert::new(
            self.id(),
            severity,
            AlertEntity::Scope,
            rate,
            AlertDetail::CancellationRate {
                cancellation_rate: rate,
                cancellations: totals.cancellations,
                reservations: totals.reservations,
            },
            ctx.now,
        )
        .with_text(
            "High cancellation rate",
            format!("{:.0}% of reservations are cancelled. Review the closing process.", rate * 100.0),
        )]
    }
}

/// Mean NPS over the most recent days of the current period.
pub struct RecentLowNps;

impl AlertRule for RecentLowNps {
    fn id(&self) -> RuleId { RuleId::RecentLowNps }
    fn audience(&self) -> Audience { Audience::Operational }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Alert> {
        let window_days = ctx.thresholds.days(ThresholdKey::RecentNpsWindowDays);
        let window = DateRange::trailing(ctx.period.end, window_days);
        let Some(mean_nps) = aggregate_total(&ctx.snapshot.daily_metrics, &window).and_then(|t| t.nps) else {
            return Vec::new();
        };
        let warning = ctx.threshold(ThresholdKey::NpsWarning);
        let ladder = SeverityLadder::below(false)
            .step(warning, Severity::Warning)
            .step(warning - ctx.threshold(ThresholdKey::NpsCriticalMargin), Severity::Critical);
        let Some(severity) = ladder.classify(mean_nps) else {
            return Vec::new();
        };
        vec![Alert::new(
            self.id(),
            severity,
            AlertEntity::Scope,
            mean_nps,
            AlertDetail::RecentNps {
                mean_nps,
                window_days,
            },
            ctx.now,
        )
        .with_text(
            "NPS below threshold",
            format!(
                "Average NPS over the last {window_days} days: {mean_nps:.0} (threshold: {warning:.0}). Review customer experience."
            ),
        )]
    }
}

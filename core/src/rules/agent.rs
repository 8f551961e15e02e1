//! Operational per-agent rules. Each emits at most one alert that
//! lists every offending agent in the scope.

use super::{list_names, AlertRule, Audience, RuleContext};
use crate::{
    config::ThresholdKey,
    model::{AgentPerformanceRecord, Alert, AlertDetail, AlertEntity, RuleId},
    types::Severity,
};

pub fn rules() -> Vec<Box<dyn AlertRule>> {
    vec![
        Box::new(AgentUnderutilization),
        Box::new(LowQualityStock),
        Box::new(HighBacklogLowCapacity),
        Box::new(LowOpportunityConversion),
        Box::new(StockLeadMismatch),
        Box::new(LowAgentConversion),
        Box::new(HighNoshow),
    ]
}

fn offenders<'a, F>(ctx: &RuleContext<'a>, predicate: F) -> Vec<&'a AgentPerformanceRecord>
where
    F: Fn(&AgentPerformanceRecord) -> bool,
{
    ctx.snapshot.agents.iter().filter(|a| predicate(*a)).collect()
}

fn names(agents: &[&AgentPerformanceRecord]) -> Vec<String> {
    agents.iter().map(|a| a.agent_name.clone()).collect()
}

/// Build the single list alert for `agents`; the caller guarantees
/// the list is non-empty.
#[allow(clippy::too_many_arguments)]
fn list_alert(
    ctx: &RuleContext<'_>,
    rule: RuleId,
    severity: Severity,
    agents: &[&AgentPerformanceRecord],
    value: f64,
    detail: AlertDetail,
    title: String,
    lead: String,
    advice: &str,
) -> Alert {
    let names = names(agents);
    let description = format!("{lead}Agents: {}. {advice}", list_names(&names));
    Alert::new(rule, severity, AlertEntity::Agents { names }, value, detail, ctx.now)
        .with_text(title, description)
}

// ── Capacity ───────────────────────────────────────────────────────

pub struct AgentUnderutilization;

impl AlertRule for AgentUnderutilization {
    fn id(&self) -> RuleId { RuleId::AgentUnderutilization }
    fn audience(&self) -> Audience { Audience::Operational }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Alert> {
        let min = ctx.threshold(ThresholdKey::AgentUtilizationMin);
        let agents = offenders(ctx, |a| a.utilization < min);
        if agents.is_empty() {
            return Vec::new();
        }
        let slots: u32 = agents.iter().map(|a| a.available_slots).sum();
        vec![list_alert(
            ctx,
            self.id(),
            Severity::Warning,
            &agents,
            f64::from(slots),
            AlertDetail::Underutilization {
                agents: agents.len(),
                total_available_slots: slots,
            },
            format!("{} underutilized agent(s)", agents.len()),
            format!("{slots} unused slots available. "),
            "Assign more leads.",
        )]
    }
}

pub struct HighBacklogLowCapacity;

impl AlertRule for HighBacklogLowCapacity {
    fn id(&self) -> RuleId { RuleId::HighBacklogLowCapacity }
    fn audience(&self) -> Audience { Audience::Operational }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Alert> {
        let backlog_max = ctx.threshold(ThresholdKey::BacklogMax);
        let slots_min = ctx.threshold(ThresholdKey::BacklogMinAvailableSlots);
        let agents = offenders(ctx, |a| {
            f64::from(a.backlog_cartera) > backlog_max && f64::from(a.available_slots) < slots_min
        });
        if agents.is_empty() {
            return Vec::new();
        }
        vec![list_alert(
            ctx,
            self.id(),
            Severity::Warning,
            &agents,
            agents.len() as f64,
            AlertDetail::AgentList { agents: agents.len() },
            format!("{} agent(s) with high backlog and little capacity", agents.len()),
            String::new(),
            "Redistribute the portfolio or add capacity.",
        )]
    }
}

// ── Stock ──────────────────────────────────────────────────────────

pub struct LowQualityStock;

impl AlertRule for LowQualityStock {
    fn id(&self) -> RuleId { RuleId::LowQualityStock }
    fn audience(&self) -> Audience { Audience::Operational }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Alert> {
        let min = ctx.threshold(ThresholdKey::StockAttractivenessMin);
        let agents = offenders(ctx, |a| a.stock_attractiveness < min);
        if agents.is_empty() {
            return Vec::new();
        }
        let avg_age = agents.iter().map(|a| a.stock_avg_age).sum::<f64>() / agents.len() as f64;
        vec![list_alert(
            ctx,
            self.id(),
            Severity::Critical,
            &agents,
            avg_age,
            AlertDetail::LowQualityStock {
                agents: agents.len(),
                avg_stock_age: avg_age,
            },
            format!("{} agent(s) with unattractive stock", agents.len()),
            format!("Aged stock (average {avg_age:.0} days) hurts conversion. "),
            "Refresh assigned inventory.",
        )]
    }
}

pub struct StockLeadMismatch;

impl AlertRule for StockLeadMismatch {
    fn id(&self) -> RuleId { RuleId::StockLeadMismatch }
    fn audience(&self) -> Audience { Audience::Operational }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Alert> {
        let min = ctx.threshold(ThresholdKey::LeadMatchMin);
        let agents = offenders(ctx, |a| a.lead_match_score < min);
        if agents.is_empty() {
            return Vec::new();
        }
        vec![list_alert(
            ctx,
            self.id(),
            Severity::Info,
            &agents,
            agents.len() as f64,
            AlertDetail::AgentList { agents: agents.len() },
            format!("{} agent(s) with poor stock-lead match", agents.len()),
            "Assigned inventory does not match what leads are looking for. ".to_string(),
            "Reassign stock.",
        )]
    }
}

// ── Conversion ─────────────────────────────────────────────────────

/// Agents with no opportunities are skipped rather than counted as 0%.
pub struct LowOpportunityConversion;

impl AlertRule for LowOpportunityConversion {
    fn id(&self) -> RuleId { RuleId::LowOpportunityConversion }
    fn audience(&self) -> Audience { Audience::Operational }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Alert> {
        let min = ctx.threshold(ThresholdKey::OpportunityConversionMinPct);
        let agents = offenders(ctx, |a| {
            a.total_opportunities > 0 && a.opportunity_conversion_pct < min
        });
        if agents.is_empty() {
            return Vec::new();
        }
        vec![list_alert(
            ctx,
            self.id(),
            Severity::Warning,
            &agents,
            agents.len() as f64,
            AlertDetail::AgentList { agents: agents.len() },
            format!("{} agent(s) converting few opportunities", agents.len()),
            format!("Under {min:.0}% of opportunities converted. "),
            "Review lead quality or coaching.",
        )]
    }
}

pub struct LowAgentConversion;

impl AlertRule for LowAgentConversion {
    fn id(&self) -> RuleId { RuleId::LowAgentConversion }
    fn audience(&self) -> Audience { Audience::Operational }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Alert> {
        let min = ctx.threshold(ThresholdKey::ConversionWarning);
        let agents = offenders(ctx, |a| a.conversion < min);
        if agents.is_empty() {
            return Vec::new();
        }
        vec![list_alert(
            ctx,
            self.id(),
            Severity::Warning,
            &agents,
            agents.len() as f64,
            AlertDetail::AgentList { agents: agents.len() },
            format!("{} agent(s) with low conversion", agents.len()),
            String::new(),
            &format!("Conversion < {:.0}%.", min * 100.0),
        )]
    }
}

// ── Appointments ───────────────────────────────────────────────────

pub struct HighNoshow;

impl AlertRule for HighNoshow {
    fn id(&self) -> RuleId { RuleId::HighNoshow }
    fn audience(&self) -> Audience { Audience::Operational }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Alert> {
        let max = ctx.threshold(ThresholdKey::NoshowWarning);
        let critical = ctx.threshold(ThresholdKey::NoshowCritical);
        let agents = offenders(ctx, |a| a.noshow > max);
        if agents.is_empty() {
            return Vec::new();
        }
        let severity = if agents.iter().any(|a| a.noshow > critical) {
            Severity::Critical
        } else {
            Severity::Warning
        };
        vec![list_alert(
            ctx,
            self.id(),
            severity,
            &agents,
            agents.len() as f64,
            AlertDetail::AgentList { agents: agents.len() },
            format!("{} agent(s) with a high no-show rate", agents.len()),
            String::new(),
            "Review the appointment confirmation process.",
        )]
    }
}

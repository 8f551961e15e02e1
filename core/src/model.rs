//! Typed records of one analytics snapshot, and the Alert they produce.
//!
//! RULE: Records are immutable once a snapshot is built. A new
//! snapshot is generated wholesale; nothing is patched in place.

use crate::kpi::{IncentiveTier, OptimizationQuadrant, PointBreakdown};
use crate::types::{AgentId, CustomerId, Severity, VehicleSegment};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ── Daily hub metrics ──────────────────────────────────────────────

/// One row per (date, hub).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyMetricRecord {
    pub date:    NaiveDate,
    pub country: String,
    pub region:  String,
    pub hub:     String,

    pub leads:         u32,
    pub appointments:  u32,
    pub reservations:  u32,
    pub sales:         u32,
    pub purchases:     u32,
    pub cancellations: u32,
    pub noshow:        u32,

    pub nps:        Option<f64>,
    pub nps_buyer:  Option<f64>,
    pub nps_seller: Option<f64>,
    pub csat:       Option<f64>,

    pub revenue:       f64,
    pub ticket_avg:    f64,
    pub full_margin:   f64,
    pub fin_ins:       f64,
    pub kt:            f64,
    pub pc1:           f64,
    pub ecac:          f64,
    pub cost_per_lead: f64,
    /// Sales over purchases.
    pub efficiency:    f64,

    /// Days from lead to sale.
    pub sla_lead_to_sale: Option<f64>,
}

// ── Inventory ──────────────────────────────────────────────────────

/// Stock of one vehicle segment in one region. The region doubles as
/// the hub key, so `hub == region` for inventory rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryRecord {
    pub country: String,
    pub region:  String,
    pub hub:     String,
    pub segment: VehicleSegment,

    pub total_inventory: u32,
    pub available:       u32,
    pub reserved:        u32,
    pub vip:             u32,
    pub aging_0_30:      u32,
    pub aging_30_60:     u32,
    pub aging_60_plus:   u32,

    pub avg_days_in_inventory: f64,
    pub sell_rate_30d:         f64,
    pub sell_rate_60d:         f64,
    pub readiness:             f64,
}

// ── Agents ─────────────────────────────────────────────────────────

/// One row per agent per snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentPerformanceRecord {
    pub agent_id:   AgentId,
    pub agent_name: String,
    pub country:    String,
    pub region:     String,
    pub hub:        String,

    // Funnel
    pub leads:        u32,
    pub appointments: u32,
    pub reservations: u32,
    pub sales:        u32,
    /// Sales over leads (ratio).
    pub conversion:   f64,

    // Operation split
    pub sales_only:      u32,
    pub sales_tradein:   u32,
    pub purchases_pure:  u32,
    pub purchases_total: u32,

    // Capacity
    pub slots_per_week:  u32,
    pub available_slots: u32,
    pub utilization:     f64,
    pub capacity_for_leads: u32,

    // Opportunities
    pub backlog_cartera:     u32,
    pub total_opportunities: u32,
    pub opportunity_conversion_pct: f64,

    // Stock quality
    pub stock_assigned:       u32,
    pub stock_avg_age:        f64,
    pub stock_attractiveness: f64,
    pub lead_match_score:     f64,

    // Ancillaries and financing
    pub insurance_sold:        u32,
    pub insurance_penetration: f64,
    pub warranty_sold:         u32,
    pub warranty_penetration:  f64,
    pub ancillary_penetration: f64,
    pub financing_sold:        u32,
    pub financing_penetration: f64,

    // Service quality
    pub handoffs:        u32,
    pub ownership_score: f64,
    pub nps:             f64,
    pub csat:            f64,
    /// No-show rate (ratio of booked appointments).
    pub noshow:          f64,

    // Economics and incentives
    pub revenue:              f64,
    pub revenue_per_slot:     f64,
    pub points:               PointBreakdown,
    pub incentive_tier:       IncentiveTier,
    pub efficiency_composite: f64,
    pub quadrant:             OptimizationQuadrant,
}

// ── Customers ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    New,
    Active,
    Vip,
    Recurring,
    Inactive,
}

impl CustomerStatus {
    pub const ALL: [CustomerStatus; 5] = [
        Self::New,
        Self::Active,
        Self::Vip,
        Self::Recurring,
        Self::Inactive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::New       => "Nuevo",
            Self::Active    => "Activo",
            Self::Vip       => "VIP",
            Self::Recurring => "Recurrente",
            Self::Inactive  => "Inactivo",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AncillaryCategory {
    Insurance,
    Warranty,
    Tech,
    Service,
    Accessories,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AncillaryItem {
    pub name:     String,
    pub price:    f64,
    pub category: AncillaryCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transaction {
    Sale {
        transaction_id: String,
        date:           NaiveDate,
        vehicle:        String,
        vehicle_price:  f64,
        ancillaries:    Vec<AncillaryItem>,
        financed:       bool,
        down_payment:   f64,
    },
    Cancellation {
        transaction_id: String,
        date:           NaiveDate,
        vehicle:        String,
        vehicle_price:  f64,
        reason:         String,
        stage:          String,
    },
}

impl Transaction {
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Sale { date, .. } | Self::Cancellation { date, .. } => *date,
        }
    }

    pub fn is_sale(&self) -> bool {
        matches!(self, Self::Sale { .. })
    }

    pub fn ancillaries_total(&self) -> f64 {
        match self {
            Self::Sale { ancillaries, .. } => ancillaries.iter().map(|a| a.price).sum(),
            Self::Cancellation { .. }      => 0.0,
        }
    }

    /// Vehicle plus ancillaries for a sale; cancellations bring in nothing.
    pub fn total_amount(&self) -> f64 {
        match self {
            Self::Sale { vehicle_price, .. } => vehicle_price + self.ancillaries_total(),
            Self::Cancellation { .. }        => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// Metadata of the customer's conversations with the sales assistant.
/// Message text itself is not part of the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantSummary {
    pub messages:           u32,
    pub last_topic:         String,
    pub sentiment:          Sentiment,
    pub financing_interest: bool,
    pub budget_range:       (f64, f64),
    pub last_interaction:   NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerRecord {
    pub customer_id: CustomerId,
    pub name:        String,
    pub email:       String,
    pub phone:       String,
    pub country:     String,
    pub region:      String,
    pub hub:         String,
    pub status:      CustomerStatus,
    pub is_vip:      bool,

    pub registration_date: NaiveDate,
    pub last_interaction:  NaiveDate,
    /// Soft reference; the agent may not exist in the snapshot.
    pub assigned_agent_id: AgentId,
    pub customer_score:    u32,
    pub nps_rating:        Option<u8>,
    pub vehicle_interests: Vec<VehicleSegment>,
    pub transactions:      Vec<Transaction>,
    pub assistant:         AssistantSummary,
}

// ── Alerts ─────────────────────────────────────────────────────────

/// Stable identity of each detection rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    ConversionDrop,
    CriticalInventoryAging,
    NpsDecline,
    CancellationSpike,
    ConversionVolatility,
    AgentUnderutilization,
    LowQualityStock,
    HighBacklogLowCapacity,
    LowOpportunityConversion,
    StockLeadMismatch,
    LowAgentConversion,
    AggregateAgedInventory,
    HighNoshow,
    LowInventoryRunway,
    HighCancellationRate,
    RecentLowNps,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConversionDrop           => "conversion_drop",
            Self::CriticalInventoryAging   => "critical_inventory_aging",
            Self::NpsDecline               => "nps_decline",
            Self::CancellationSpike        => "cancellation_spike",
            Self::ConversionVolatility     => "conversion_volatility",
            Self::AgentUnderutilization    => "agent_underutilization",
            Self::LowQualityStock          => "low_quality_stock",
            Self::HighBacklogLowCapacity   => "high_backlog_low_capacity",
            Self::LowOpportunityConversion => "low_opportunity_conversion",
            Self::StockLeadMismatch        => "stock_lead_mismatch",
            Self::LowAgentConversion       => "low_agent_conversion",
            Self::AggregateAgedInventory   => "aggregate_aged_inventory",
            Self::HighNoshow               => "high_noshow",
            Self::LowInventoryRunway       => "low_inventory_runway",
            Self::HighCancellationRate     => "high_cancellation_rate",
            Self::RecentLowNps             => "recent_low_nps",
        }
    }

    /// The metric an alert from this rule is tagged with.
    pub fn metric(&self) -> MetricTag {
        match self {
            Self::ConversionDrop           => MetricTag::Conversion,
            Self::CriticalInventoryAging   => MetricTag::InventoryAging,
            Self::NpsDecline               => MetricTag::Nps,
            Self::CancellationSpike        => MetricTag::Cancellations,
            Self::ConversionVolatility     => MetricTag::ConversionVolatility,
            Self::AgentUnderutilization    => MetricTag::AgentUtilization,
            Self::LowQualityStock          => MetricTag::StockQuality,
            Self::HighBacklogLowCapacity   => MetricTag::BacklogCapacity,
            Self::LowOpportunityConversion => MetricTag::OpportunityConversion,
            Self::StockLeadMismatch        => MetricTag::LeadMatch,
            Self::LowAgentConversion       => MetricTag::Conversion,
            Self::AggregateAgedInventory   => MetricTag::InventoryAging,
            Self::HighNoshow               => MetricTag::Noshow,
            Self::LowInventoryRunway       => MetricTag::InventoryRunway,
            Self::HighCancellationRate     => MetricTag::CancellationRate,
            Self::RecentLowNps             => MetricTag::Nps,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MetricTag {
    Conversion,
    InventoryAging,
    Nps,
    Cancellations,
    ConversionVolatility,
    AgentUtilization,
    StockQuality,
    BacklogCapacity,
    OpportunityConversion,
    LeadMatch,
    Noshow,
    InventoryRunway,
    CancellationRate,
}

/// What an alert is about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertEntity {
    Hub {
        country: Option<String>,
        hub:     String,
    },
    Agents {
        names: Vec<String>,
    },
    /// The whole visible scope.
    Scope,
}

/// Rule-specific output fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertDetail {
    ConversionDrop {
        current_pct:  f64,
        previous_pct: f64,
        drop_pct:     f64,
    },
    InventoryAging {
        aging_count: u32,
        aging_pct:   f64,
    },
    Nps {
        current_nps:  f64,
        previous_nps: Option<f64>,
        drop_points:  Option<f64>,
    },
    CancellationSpike {
        current:      u64,
        previous:     u64,
        increase_pct: f64,
    },
    Volatility {
        cv:    f64,
        weeks: usize,
    },
    Underutilization {
        agents:                usize,
        total_available_slots: u32,
    },
    LowQualityStock {
        agents:        usize,
        avg_stock_age: f64,
    },
    AgentList {
        agents: usize,
    },
    InventoryRunway {
        days_of_inventory: f64,
        available_units:   u32,
        avg_daily_sales:   f64,
    },
    CancellationRate {
        cancellation_rate: f64,
        cancellations:     u64,
        reservations:      u64,
    },
    RecentNps {
        mean_nps:    f64,
        window_days: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub rule:        RuleId,
    pub severity:    Severity,
    pub title:       String,
    pub description: String,
    pub timestamp:   DateTime<Utc>,
    pub metric:      MetricTag,
    pub entity:      AlertEntity,
    /// Headline number. Always finite.
    pub value:       f64,
    pub detail:      AlertDetail,
}

impl Alert {
    pub fn new(
        rule: RuleId,
        severity: Severity,
        entity: AlertEntity,
        value: f64,
        detail: AlertDetail,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            rule,
            severity,
            title: String::new(),
            description: String::new(),
            timestamp: at,
            metric: rule.metric(),
            entity,
            value: if value.is_finite() { value } else { 0.0 },
            detail,
        }
    }

    pub fn with_text(mut self, title: impl Into<String>, description: impl Into<String>) -> Self {
        self.title = title.into();
        self.description = description.into();
        self
    }

    /// The hub this alert names, if any.
    pub fn hub(&self) -> Option<&str> {
        match &self.entity {
            AlertEntity::Hub { hub, .. } => Some(hub),
            _ => None,
        }
    }

    /// Agent names listed by an agent-list alert.
    pub fn agent_names(&self) -> &[String] {
        match &self.entity {
            AlertEntity::Agents { names } => names,
            _ => &[],
        }
    }
}

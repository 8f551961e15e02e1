//! Role-based visibility scope applied to a snapshot before aggregation.
//!
//! RULE: Scope is applied exactly once, upstream of the aggregator.
//! Nothing downstream re-checks visibility.

use crate::{
    error::{PulseError, PulseResult},
    snapshot::Snapshot,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeFilter {
    #[default]
    All,
    Only(String),
}

impl ScopeFilter {
    /// `"all"` (any case) or an empty string means no filter.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(trimmed.to_string())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::All       => true,
            Self::Only(v)   => v == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// True when everything `other` admits is also admitted here.
    pub fn covers(&self, other: &ScopeFilter) -> bool {
        match (self, other) {
            (Self::All, _)                 => true,
            (Self::Only(_), Self::All)     => false,
            (Self::Only(a), Self::Only(b)) => a == b,
        }
    }
}

impl fmt::Display for ScopeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All     => f.write_str("all"),
            Self::Only(v) => f.write_str(v),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisibilityScope {
    pub country: ScopeFilter,
    pub region:  ScopeFilter,
    pub hub:     ScopeFilter,
}

impl VisibilityScope {
    pub fn all() -> Self {
        Self::default()
    }

    /// The `{country, hub}` pair handed over by the login layer.
    pub fn new(country: ScopeFilter, hub: ScopeFilter) -> Self {
        Self {
            country,
            region: ScopeFilter::All,
            hub,
        }
    }

    pub fn country(country: &str) -> Self {
        Self::new(ScopeFilter::parse(country), ScopeFilter::All)
    }

    pub fn hub(country: &str, hub: &str) -> Self {
        Self::new(ScopeFilter::parse(country), ScopeFilter::parse(hub))
    }

    pub fn with_region(mut self, region: &str) -> Self {
        self.region = ScopeFilter::parse(region);
        self
    }

    pub fn matches(&self, country: &str, region: &str, hub: &str) -> bool {
        self.country.matches(country) && self.region.matches(region) && self.hub.matches(hub)
    }

    pub fn covers(&self, other: &VisibilityScope) -> bool {
        self.country.covers(&other.country)
            && self.region.covers(&other.region)
            && self.hub.covers(&other.hub)
    }
}

impl fmt::Display for VisibilityScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "country={} region={} hub={}",
            self.country, self.region, self.hub
        )
    }
}

// ── Roles ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Executive,
    RegionalDirector,
    CityManager,
    Agent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Executive        => "executive",
            Self::RegionalDirector => "regional_director",
            Self::CityManager      => "city_manager",
            Self::Agent            => "agent",
        }
    }

    /// Widest scope the role may see from its home location.
    /// Executives see everything; directors their country; city
    /// managers and agents their own hub.
    pub fn default_scope(&self, home_country: &str, home_hub: &str) -> VisibilityScope {
        match self {
            Self::Executive => VisibilityScope::all(),
            Self::RegionalDirector => VisibilityScope::country(home_country),
            Self::CityManager | Self::Agent => VisibilityScope::hub(home_country, home_hub),
        }
    }

    /// Accept `requested` only if it stays inside the role's home scope.
    pub fn narrow(
        &self,
        home_country: &str,
        home_hub: &str,
        requested: VisibilityScope,
    ) -> PulseResult<VisibilityScope> {
        let home = self.default_scope(home_country, home_hub);
        if home.covers(&requested) {
            Ok(requested)
        } else {
            Err(PulseError::ScopeNotPermitted {
                role: self.as_str().to_string(),
                requested: requested.to_string(),
            })
        }
    }
}

// ── Snapshot filtering ─────────────────────────────────────────────

impl Snapshot {
    /// A filtered copy holding only rows visible under `scope`.
    ///
    /// Inventory is keyed by region, so a hub filter keeps the
    /// inventory of the region(s) that hub belongs to.
    pub fn scoped(&self, scope: &VisibilityScope) -> Snapshot {
        let daily_metrics: Vec<_> = self
            .daily_metrics
            .iter()
            .filter(|r| scope.matches(&r.country, &r.region, &r.hub))
            .cloned()
            .collect();

        let agents: Vec<_> = self
            .agents
            .iter()
            .filter(|a| scope.matches(&a.country, &a.region, &a.hub))
            .cloned()
            .collect();

        let customers: Vec<_> = self
            .customers
            .iter()
            .filter(|c| scope.matches(&c.country, &c.region, &c.hub))
            .cloned()
            .collect();

        let inventory: Vec<_> = match &scope.hub {
            ScopeFilter::All => self
                .inventory
                .iter()
                .filter(|r| scope.country.matches(&r.country) && scope.region.matches(&r.region))
                .cloned()
                .collect(),
            ScopeFilter::Only(hub) => {
                let regions: BTreeSet<&str> = self
                    .daily_metrics
                    .iter()
                    .filter(|r| &r.hub == hub)
                    .map(|r| r.region.as_str())
                    .chain(
                        self.agents
                            .iter()
                            .filter(|a| &a.hub == hub)
                            .map(|a| a.region.as_str()),
                    )
                    .collect();
                self.inventory
                    .iter()
                    .filter(|r| {
                        scope.country.matches(&r.country)
                            && scope.region.matches(&r.region)
                            && (regions.contains(r.region.as_str()) || &r.hub == hub)
                    })
                    .cloned()
                    .collect()
            }
        };

        log::debug!(
            "scope [{scope}] keeps daily={} inventory={} agents={} customers={}",
            daily_metrics.len(),
            inventory.len(),
            agents.len(),
            customers.len()
        );

        Snapshot {
            snapshot_id: self.snapshot_id,
            generated_on: self.generated_on,
            seed: self.seed,
            daily_metrics,
            inventory,
            agents,
            customers,
        }
    }
}

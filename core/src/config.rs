use crate::kpi::{IncentiveTier, TierBreakpoint};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Threshold lookup table ─────────────────────────────────────────

/// Every numeric threshold consumed by the rule catalog and the
/// insight views. Rules look values up by key; no rule body carries
/// a literal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdKey {
    ConversionDropWarningPct,
    ConversionDropCriticalPct,
    InventoryAgingWarningUnits,
    InventoryAgingCriticalUnits,
    NpsGood,
    NpsWarning,
    NpsCriticalMargin,
    NpsDropPoints,
    CancellationSpikeWarningPct,
    CancellationSpikeCriticalPct,
    ConversionVolatilityCv,
    VolatilityLookbackDays,
    AgentUtilizationMin,
    StockAttractivenessMin,
    BacklogMax,
    BacklogMinAvailableSlots,
    OpportunityConversionMinPct,
    LeadMatchMin,
    ConversionGood,
    ConversionWarning,
    AggregateAgingWarningUnits,
    AggregateAgingCriticalUnits,
    NoshowWarning,
    NoshowCritical,
    InventoryRunwayMinDays,
    CancellationRateWarning,
    CancellationRateCritical,
    RecentNpsWindowDays,
    RecommendUtilizationLow,
    RecommendUtilizationHigh,
    RecommendStockMin,
}

impl ThresholdKey {
    pub const ALL: [ThresholdKey; 31] = [
        Self::ConversionDropWarningPct,
        Self::ConversionDropCriticalPct,
        Self::InventoryAgingWarningUnits,
        Self::InventoryAgingCriticalUnits,
        Self::NpsGood,
        Self::NpsWarning,
        Self::NpsCriticalMargin,
        Self::NpsDropPoints,
        Self::CancellationSpikeWarningPct,
        Self::CancellationSpikeCriticalPct,
        Self::ConversionVolatilityCv,
        Self::VolatilityLookbackDays,
        Self::AgentUtilizationMin,
        Self::StockAttractivenessMin,
        Self::BacklogMax,
        Self::BacklogMinAvailableSlots,
        Self::OpportunityConversionMinPct,
        Self::LeadMatchMin,
        Self::ConversionGood,
        Self::ConversionWarning,
        Self::AggregateAgingWarningUnits,
        Self::AggregateAgingCriticalUnits,
        Self::NoshowWarning,
        Self::NoshowCritical,
        Self::InventoryRunwayMinDays,
        Self::CancellationRateWarning,
        Self::CancellationRateCritical,
        Self::RecentNpsWindowDays,
        Self::RecommendUtilizationLow,
        Self::RecommendUtilizationHigh,
        Self::RecommendStockMin,
    ];

    /// Built-in value used when a loaded table omits the key.
    pub fn default_value(&self) -> f64 {
        match self {
            Self::ConversionDropWarningPct     => 10.0,
            Self::ConversionDropCriticalPct    => 20.0,
            Self::InventoryAgingWarningUnits   => 15.0,
            Self::InventoryAgingCriticalUnits  => 25.0,
            Self::NpsGood                      => 70.0,
            Self::NpsWarning                   => 50.0,
            Self::NpsCriticalMargin            => 10.0,
            Self::NpsDropPoints                => 5.0,
            Self::CancellationSpikeWarningPct  => 25.0,
            Self::CancellationSpikeCriticalPct => 50.0,
            Self::ConversionVolatilityCv       => 0.30,
            Self::VolatilityLookbackDays       => 30.0,
            Self::AgentUtilizationMin          => 0.60,
            Self::StockAttractivenessMin       => 60.0,
            Self::BacklogMax                   => 20.0,
            Self::BacklogMinAvailableSlots     => 5.0,
            Self::OpportunityConversionMinPct  => 15.0,
            Self::LeadMatchMin                 => 60.0,
            Self::ConversionGood               => 0.25,
            Self::ConversionWarning            => 0.15,
            Self::AggregateAgingWarningUnits   => 20.0,
            Self::AggregateAgingCriticalUnits  => 30.0,
            Self::NoshowWarning                => 0.20,
            Self::NoshowCritical               => 0.30,
            Self::InventoryRunwayMinDays       => 15.0,
            Self::CancellationRateWarning      => 0.15,
            Self::CancellationRateCritical     => 0.20,
            Self::RecentNpsWindowDays          => 7.0,
            Self::RecommendUtilizationLow      => 0.70,
            Self::RecommendUtilizationHigh     => 0.90,
            Self::RecommendStockMin            => 65.0,
        }
    }
}

/// Key → value threshold table. Always complete: keys missing from a
/// loaded file are filled from `ThresholdKey::default_value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<ThresholdKey, f64>", into = "BTreeMap<ThresholdKey, f64>")]
pub struct Thresholds {
    values: BTreeMap<ThresholdKey, f64>,
}

impl Thresholds {
    pub fn get(&self, key: ThresholdKey) -> f64 {
        self.values
            .get(&key)
            .copied()
            .unwrap_or_else(|| key.default_value())
    }

    /// Window lengths are stored as floats; read them back as whole days.
    pub fn days(&self, key: ThresholdKey) -> u32 {
        self.get(key).max(1.0).round() as u32
    }

    pub fn set(&mut self, key: ThresholdKey, value: f64) {
        self.values.insert(key, value);
    }

    pub fn with(mut self, key: ThresholdKey, value: f64) -> Self {
        self.set(key, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (ThresholdKey, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from(BTreeMap::new())
    }
}

impl From<BTreeMap<ThresholdKey, f64>> for Thresholds {
    fn from(mut overrides: BTreeMap<ThresholdKey, f64>) -> Self {
        for key in ThresholdKey::ALL {
            overrides.entry(key).or_insert_with(|| key.default_value());
        }
        Self { values: overrides }
    }
}

impl From<Thresholds> for BTreeMap<ThresholdKey, f64> {
    fn from(t: Thresholds) -> Self {
        t.values
    }
}

// ── Country → region → hub hierarchy ───────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionNode {
    pub name: String,
    pub hubs: Vec<String>,
    /// Relative daily sales volume of the whole region.
    pub volume_scale: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryNode {
    pub name: String,
    pub regions: Vec<RegionNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hierarchy {
    pub countries: Vec<CountryNode>,
}

/// One leaf of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubPath<'a> {
    pub country: &'a str,
    pub region:  &'a str,
    pub hub:     &'a str,
}

impl Hierarchy {
    pub fn country(&self, name: &str) -> Option<&CountryNode> {
        self.countries.iter().find(|c| c.name == name)
    }

    pub fn country_of_region(&self, region: &str) -> Option<&str> {
        self.countries
            .iter()
            .find(|c| c.regions.iter().any(|r| r.name == region))
            .map(|c| c.name.as_str())
    }

    /// Every hub in declaration order.
    pub fn hubs(&self) -> Vec<HubPath<'_>> {
        let mut out = Vec::new();
        for country in &self.countries {
            for region in &country.regions {
                for hub in &region.hubs {
                    out.push(HubPath {
                        country: &country.name,
                        region:  &region.name,
                        hub,
                    });
                }
            }
        }
        out
    }

    pub fn locate_hub(&self, hub: &str) -> Option<HubPath<'_>> {
        self.hubs().into_iter().find(|p| p.hub == hub)
    }
}

// ── Synthetic generator profiles ───────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockHealth {
    pub aging_0_30: f64,
    pub aging_30_90: f64,
    pub aging_90_plus: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationalProfile {
    pub readiness: f64,
    pub sell_rate_30d: f64,
    pub sell_rate_60d: f64,
}

/// Per-country ranges the generator samples from (USD, NPS points, ratios).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryProfile {
    pub country: String,
    pub full_margin: (f64, f64),
    pub fin_ins: (f64, f64),
    pub kt: (f64, f64),
    pub ecac: (f64, f64),
    pub ticket_avg: (f64, f64),
    pub nps_buyer: (f64, f64),
    pub nps_seller: (f64, f64),
    pub efficiency: (f64, f64),
    pub inventory_per_segment: (f64, f64),
    pub stock_health: StockHealth,
    pub operational: OperationalProfile,
    pub phone_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CountryProfilesFile {
    profiles: Vec<CountryProfile>,
}

// ── Incentives ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointSchedule {
    pub per_delivery: f64,
    pub per_financed: f64,
    pub per_warranty: f64,
    pub per_insurance: f64,
    pub per_tradein: f64,
    pub nps_bonus_per_delivery: f64,
    pub nps_bonus_min: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalMetric {
    Conversion,
    Nps,
    Noshow,
    Sales,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncentiveGoal {
    pub name: String,
    pub description: String,
    pub metric: GoalMetric,
    pub threshold: f64,
    pub points: u32,
    /// Lower is better (e.g. no-show rate).
    #[serde(default)]
    pub inverse: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncentiveConfig {
    pub tiers: Vec<TierBreakpoint>,
    pub points: PointSchedule,
    pub goals: Vec<IncentiveGoal>,
}

// ── Engine settings ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EfficiencyWeights {
    pub financing: f64,
    pub ancillary: f64,
    pub ownership: f64,
    pub nps: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuadrantThresholds {
    pub utilization: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    pub agents_per_hub: u32,
    pub hubs_per_region: usize,
    pub slots_per_week: u32,
    pub customers_per_hub: (u32, u32),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ValidationConfig {
    /// Reject snapshots whose funnel is not monotone
    /// (sales <= reservations <= appointments <= leads).
    #[serde(default)]
    pub strict_funnel: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct SettingsFile {
    efficiency_weights: EfficiencyWeights,
    quadrant: QuadrantThresholds,
    generator: GeneratorConfig,
    #[serde(default)]
    validation: ValidationConfig,
}

#[derive(Debug, Clone)]
pub struct PulseConfig {
    pub thresholds: Thresholds,
    pub hierarchy: Hierarchy,
    pub country_profiles: BTreeMap<String, CountryProfile>,
    pub incentives: IncentiveConfig,
    pub efficiency_weights: EfficiencyWeights,
    pub quadrant: QuadrantThresholds,
    pub generator: GeneratorConfig,
    pub validation: ValidationConfig,
}

fn read_json<T: DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    serde_json::from_str(&content).map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))
}

impl PulseConfig {
    /// Load from the data/ directory.
    /// In tests, use PulseConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let thresholds: Thresholds = read_json(&format!("{data_dir}/thresholds.json"))?;
        let hierarchy: Hierarchy = read_json(&format!("{data_dir}/hierarchy.json"))?;

        let profiles_file: CountryProfilesFile =
            read_json(&format!("{data_dir}/country_profiles.json"))?;
        let country_profiles = profiles_file
            .profiles
            .into_iter()
            .map(|p| (p.country.clone(), p))
            .collect();

        let mut incentives: IncentiveConfig = read_json(&format!("{data_dir}/incentives.json"))?;
        incentives
            .tiers
            .sort_by(|a, b| a.min_points.total_cmp(&b.min_points));

        let settings: SettingsFile = read_json(&format!("{data_dir}/settings.json"))?;

        let config = Self {
            thresholds,
            hierarchy,
            country_profiles,
            incentives,
            efficiency_weights: settings.efficiency_weights,
            quadrant: settings.quadrant,
            generator: settings.generator,
            validation: settings.validation,
        };
        config.check()?;
        Ok(config)
    }

    /// Every country in the hierarchy needs a generator profile.
    fn check(&self) -> anyhow::Result<()> {
        for country in &self.hierarchy.countries {
            if !self.country_profiles.contains_key(&country.name) {
                anyhow::bail!("No country profile for '{}'", country.name);
            }
        }
        if self.incentives.tiers.is_empty() {
            anyhow::bail!("Incentive tier table is empty");
        }
        Ok(())
    }

    pub fn profile(&self, country: &str) -> Option<&CountryProfile> {
        self.country_profiles.get(country)
    }

    /// The built-in configuration. Identical to the files under data/.
    pub fn standard() -> Self {
        Self {
            thresholds: Thresholds::default(),
            hierarchy: standard_hierarchy(),
            country_profiles: standard_profiles()
                .into_iter()
                .map(|p| (p.country.clone(), p))
                .collect(),
            incentives: standard_incentives(),
            efficiency_weights: EfficiencyWeights {
                financing: 0.3,
                ancillary: 0.3,
                ownership: 0.2,
                nps: 0.2,
            },
            quadrant: QuadrantThresholds {
                utilization: 0.75,
                efficiency: 60.0,
            },
            generator: GeneratorConfig {
                agents_per_hub: 25,
                hubs_per_region: 3,
                slots_per_week: 40,
                customers_per_hub: (40, 70),
            },
            validation: ValidationConfig::default(),
        }
    }

    /// Config with a small hierarchy for use in unit tests.
    pub fn default_test() -> Self {
        let hierarchy = Hierarchy {
            countries: vec![
                CountryNode {
                    name: "México".into(),
                    regions: vec![
                        RegionNode {
                            name: "Ciudad de México".into(),
                            hubs: vec!["CDMX Norte".into(), "CDMX Sur".into()],
                            volume_scale: 4.0,
                        },
                        RegionNode {
                            name: "Monterrey".into(),
                            hubs: vec!["MTY Valle".into()],
                            volume_scale: 1.2,
                        },
                    ],
                },
                CountryNode {
                    name: "Chile".into(),
                    regions: vec![RegionNode {
                        name: "Chile".into(),
                        hubs: vec!["Santiago Las Condes".into()],
                        volume_scale: 1.5,
                    }],
                },
            ],
        };

        Self {
            hierarchy,
            generator: GeneratorConfig {
                agents_per_hub: 4,
                hubs_per_region: 2,
                slots_per_week: 40,
                customers_per_hub: (3, 6),
            },
            ..Self::standard()
        }
    }
}

fn region(name: &str, volume_scale: f64, hubs: &[&str]) -> RegionNode {
    RegionNode {
        name: name.into(),
        hubs: hubs.iter().map(|h| (*h).to_string()).collect(),
        volume_scale,
    }
}

fn standard_hierarchy() -> Hierarchy {
    Hierarchy {
        countries: vec![
            CountryNode {
                name: "México".into(),
                regions: vec![
                    region("Ciudad de México", 10.0, &[
                        "CDMX - El Rosario Town Center",
                        "CDMX - Artz Pedregal",
                        "CDMX - Antara Fashion Hall",
                        "CDMX - San Ángel",
                        "CDMX - Portal Centro",
                        "CDMX - Patio Santa Fe",
                        "EDOMEX - Interlomas",
                        "EDOMEX - Tlalnepantla",
                    ]),
                    region("Monterrey", 1.2, &["MTY - HQ Fashion Drive", "MTY - Valle Oriente"]),
                    region("Guadalajara", 1.4, &["GDL - HQ Guadalajara", "GDL - Midtown"]),
                    region("Puebla", 0.8, &["PUE - Explanada HQ"]),
                    region("Querétaro", 0.77, &["QRO - Puerta la Victoria"]),
                    region("Cuernavaca", 1.17, &["CUE - Fórum Cuernavaca"]),
                    region("León", 0.33, &["LEO - Plaza Mayor"]),
                    region("San Luis Potosí", 0.27, &["SLP - Nissan Torres Corzo Aliado"]),
                ],
            },
            CountryNode {
                name: "Brasil".into(),
                regions: vec![region("Brasil", 3.7, &[
                    "São Paulo - Pinheiros",
                    "São Paulo - Morumbi",
                    "São Paulo - Tatuapé",
                    "Rio de Janeiro - Barra",
                    "Rio de Janeiro - Botafogo",
                    "Brasilia - Asa Norte",
                ])],
            },
            CountryNode {
                name: "Argentina".into(),
                regions: vec![region("Argentina", 3.3, &[
                    "Buenos Aires - Palermo",
                    "Buenos Aires - Belgrano",
                    "Buenos Aires - Nordelta",
                    "Córdoba - Nueva Córdoba",
                    "Rosario - Centro",
                ])],
            },
            CountryNode {
                name: "Chile".into(),
                regions: vec![region("Chile", 3.5, &[
                    "Santiago - Las Condes",
                    "Santiago - Providencia",
                    "Santiago - Vitacura",
                    "Valparaíso - Viña del Mar",
                    "Concepción - Centro",
                ])],
            },
        ],
    }
}

#[allow(clippy::too_many_arguments)]
fn profile(
    country: &str,
    full_margin: (f64, f64),
    fin_ins: (f64, f64),
    kt: (f64, f64),
    ecac: (f64, f64),
    ticket_avg: (f64, f64),
    nps_buyer: (f64, f64),
    nps_seller: (f64, f64),
    efficiency: (f64, f64),
    inventory_per_segment: (f64, f64),
    stock_health: (f64, f64, f64),
    operational: (f64, f64, f64),
    phone_prefix: &str,
) -> CountryProfile {
    CountryProfile {
        country: country.into(),
        full_margin,
        fin_ins,
        kt,
        ecac,
        ticket_avg,
        nps_buyer,
        nps_seller,
        efficiency,
        inventory_per_segment,
        stock_health: StockHealth {
            aging_0_30: stock_health.0,
            aging_30_90: stock_health.1,
            aging_90_plus: stock_health.2,
        },
        operational: OperationalProfile {
            readiness: operational.0,
            sell_rate_30d: operational.1,
            sell_rate_60d: operational.2,
        },
        phone_prefix: phone_prefix.into(),
    }
}

fn standard_profiles() -> Vec<CountryProfile> {
    vec![
        profile(
            "México",
            (850.0, 1100.0), (1500.0, 2000.0), (180.0, 280.0), (350.0, 450.0),
            (12000.0, 18000.0), (38.0, 48.0), (42.0, 52.0), (0.38, 0.48),
            (40.0, 120.0), (0.50, 0.393, 0.108), (0.98, 0.29, 0.72), "+52",
        ),
        profile(
            "Brasil",
            (850.0, 1100.0), (700.0, 1000.0), (0.0, 50.0), (400.0, 520.0),
            (8000.0, 14000.0), (72.0, 85.0), (68.0, 80.0), (0.50, 0.62),
            (25.0, 80.0), (0.447, 0.375, 0.178), (0.93, 0.48, 0.72), "+55",
        ),
        profile(
            "Argentina",
            (1100.0, 1400.0), (450.0, 720.0), (130.0, 200.0), (220.0, 320.0),
            (10000.0, 16000.0), (42.0, 55.0), (68.0, 80.0), (0.50, 0.62),
            (20.0, 60.0), (0.561, 0.279, 0.160), (0.66, 0.55, 0.84), "+54",
        ),
        profile(
            "Chile",
            (950.0, 1200.0), (380.0, 580.0), (120.0, 185.0), (280.0, 380.0),
            (11000.0, 17000.0), (55.0, 68.0), (88.0, 98.0), (0.68, 0.82),
            (20.0, 65.0), (0.586, 0.287, 0.127), (0.81, 0.58, 0.87), "+56",
        ),
    ]
}

fn standard_incentives() -> IncentiveConfig {
    IncentiveConfig {
        tiers: vec![
            TierBreakpoint { min_points: 0.0,    tier: IncentiveTier::Bronze },
            TierBreakpoint { min_points: 500.0,  tier: IncentiveTier::Silver },
            TierBreakpoint { min_points: 1000.0, tier: IncentiveTier::Gold },
            TierBreakpoint { min_points: 1500.0, tier: IncentiveTier::Diamond },
        ],
        points: PointSchedule {
            per_delivery: 100.0,
            per_financed: 50.0,
            per_warranty: 30.0,
            per_insurance: 20.0,
            per_tradein: 20.0,
            nps_bonus_per_delivery: 25.0,
            nps_bonus_min: 80.0,
        },
        goals: vec![
            IncentiveGoal {
                name: "Elite Converter".into(),
                description: "Conversion above 30%".into(),
                metric: GoalMetric::Conversion,
                threshold: 0.30,
                points: 100,
                inverse: false,
            },
            IncentiveGoal {
                name: "NPS Master".into(),
                description: "NPS above 80".into(),
                metric: GoalMetric::Nps,
                threshold: 80.0,
                points: 80,
                inverse: false,
            },
            IncentiveGoal {
                name: "Perfect Appointment".into(),
                description: "No-show below 10%".into(),
                metric: GoalMetric::Noshow,
                threshold: 0.10,
                points: 60,
                inverse: true,
            },
            IncentiveGoal {
                name: "Closer".into(),
                description: "10+ sales in the period".into(),
                metric: GoalMetric::Sales,
                threshold: 10.0,
                points: 90,
                inverse: false,
            },
        ],
    }
}

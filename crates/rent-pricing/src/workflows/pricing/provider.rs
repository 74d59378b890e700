use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::context::MarketContext;
use super::domain::{CarryForwardBaseline, CommunityMetrics, FloorplanTrend, LeadsApps, UnitState};
use super::engine::PricingRequest;
use super::policy::PricingConfig;

/// Source of unit snapshots and market data for a run.
///
/// Implementations do their I/O up front; every accessor is infallible.
pub trait DataProvider {
    fn units(&self) -> Vec<UnitState>;
    fn floorplan_trends(&self) -> BTreeMap<String, FloorplanTrend>;
    fn box_score(&self) -> Option<CommunityMetrics>;
    /// `None` means the lead source is unavailable, not that there were no leads.
    fn leads_apps(&self, floorplan_code: &str, days: u32) -> Option<LeadsApps>;
    fn carry_forward_baselines(&self) -> BTreeMap<String, CarryForwardBaseline>;
    fn floorplan_baselines(&self) -> BTreeMap<String, f64> {
        BTreeMap::new()
    }
    fn starting_rents(&self) -> BTreeMap<String, f64>;
    fn current_date(&self) -> NaiveDate;
}

impl MarketContext {
    /// Snapshot everything a run needs from `provider`.
    pub fn from_provider(provider: &dyn DataProvider, config: &PricingConfig) -> Self {
        let floorplan_trends = provider.floorplan_trends();
        let units = provider.units();

        let mut codes: Vec<&str> = floorplan_trends.keys().map(String::as_str).collect();
        codes.extend(units.iter().map(|unit| unit.floorplan_code.as_str()));
        codes.sort_unstable();
        codes.dedup();

        let leads_apps = codes
            .iter()
            .filter_map(|code| {
                provider
                    .leads_apps(code, config.conversion_lookback_days)
                    .map(|counts| (code.to_string(), counts))
            })
            .collect();

        Self {
            today: provider.current_date(),
            community: provider.box_score(),
            leads_apps,
            carry_forward: provider.carry_forward_baselines(),
            floorplan_baselines: provider.floorplan_baselines(),
            starting_rents: provider.starting_rents(),
            floorplan_trends,
        }
    }
}

impl PricingRequest {
    pub fn from_provider(provider: &dyn DataProvider, config: PricingConfig) -> Self {
        let context = MarketContext::from_provider(provider, &config);
        Self {
            units: provider.units(),
            config,
            context,
        }
    }
}

/// In-memory provider for tests and fixtures.
#[derive(Debug, Clone)]
pub struct StaticDataProvider {
    pub units: Vec<UnitState>,
    pub trends: BTreeMap<String, FloorplanTrend>,
    pub community: Option<CommunityMetrics>,
    pub leads_apps: BTreeMap<String, LeadsApps>,
    pub carry_forward: BTreeMap<String, CarryForwardBaseline>,
    pub floorplan_baselines: BTreeMap<String, f64>,
    pub starting_rents: BTreeMap<String, f64>,
    pub today: NaiveDate,
}

impl StaticDataProvider {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            units: Vec::new(),
            trends: BTreeMap::new(),
            community: None,
            leads_apps: BTreeMap::new(),
            carry_forward: BTreeMap::new(),
            floorplan_baselines: BTreeMap::new(),
            starting_rents: BTreeMap::new(),
            today,
        }
    }
}

impl DataProvider for StaticDataProvider {
    fn units(&self) -> Vec<UnitState> {
        self.units.clone()
    }

    fn floorplan_trends(&self) -> BTreeMap<String, FloorplanTrend> {
        self.trends.clone()
    }

    fn box_score(&self) -> Option<CommunityMetrics> {
        self.community
    }

    fn leads_apps(&self, floorplan_code: &str, _days: u32) -> Option<LeadsApps> {
        self.leads_apps.get(floorplan_code).copied()
    }

    fn carry_forward_baselines(&self) -> BTreeMap<String, CarryForwardBaseline> {
        self.carry_forward.clone()
    }

    fn floorplan_baselines(&self) -> BTreeMap<String, f64> {
        self.floorplan_baselines.clone()
    }

    fn starting_rents(&self) -> BTreeMap<String, f64> {
        self.starting_rents.clone()
    }

    fn current_date(&self) -> NaiveDate {
        self.today
    }
}

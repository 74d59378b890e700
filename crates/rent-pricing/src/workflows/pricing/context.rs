use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::domain::{CarryForwardBaseline, CommunityMetrics, FloorplanTrend, LeadsApps};
use super::repository::CarryForwardRecord;

/// Per-run market snapshot shared by every unit in the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    pub today: NaiveDate,
    #[serde(default)]
    pub floorplan_trends: BTreeMap<String, FloorplanTrend>,
    #[serde(default)]
    pub community: Option<CommunityMetrics>,
    /// Absent floorplans mean the lead source is unavailable.
    #[serde(default)]
    pub leads_apps: BTreeMap<String, LeadsApps>,
    /// Unit-level carry-forward baselines keyed by unit id.
    #[serde(default)]
    pub carry_forward: BTreeMap<String, CarryForwardBaseline>,
    /// Floorplan-level carry-forward baselines keyed by floorplan code.
    #[serde(default)]
    pub floorplan_baselines: BTreeMap<String, f64>,
    #[serde(default)]
    pub starting_rents: BTreeMap<String, f64>,
}

impl MarketContext {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            floorplan_trends: BTreeMap::new(),
            community: None,
            leads_apps: BTreeMap::new(),
            carry_forward: BTreeMap::new(),
            floorplan_baselines: BTreeMap::new(),
            starting_rents: BTreeMap::new(),
        }
    }

    pub fn with_trend(mut self, trend: FloorplanTrend) -> Self {
        self.floorplan_trends.insert(trend.code.clone(), trend);
        self
    }

    pub fn with_community(mut self, community: CommunityMetrics) -> Self {
        self.community = Some(community);
        self
    }

    pub fn with_leads_apps(mut self, floorplan_code: impl Into<String>, leads: LeadsApps) -> Self {
        self.leads_apps.insert(floorplan_code.into(), leads);
        self
    }

    pub fn with_carry_forward(mut self, baseline: CarryForwardBaseline) -> Self {
        self.carry_forward.insert(baseline.unit_id.clone(), baseline);
        self
    }

    pub fn with_starting_rent(mut self, floorplan_code: impl Into<String>, rent: f64) -> Self {
        self.starting_rents.insert(floorplan_code.into(), rent);
        self
    }

    /// Fill in carry-forward baselines from a persisted record.
    ///
    /// Entries already present on the context win over the record.
    pub fn apply_carry_forward(&mut self, record: &CarryForwardRecord) {
        for (unit_id, baseline) in &record.units {
            self.carry_forward
                .entry(unit_id.clone())
                .or_insert_with(|| baseline.clone());
        }
        for (code, rent) in &record.fp_baselines {
            self.floorplan_baselines.entry(code.clone()).or_insert(*rent);
        }
    }

    pub fn trend_for(&self, floorplan_code: &str) -> Option<&FloorplanTrend> {
        self.floorplan_trends.get(floorplan_code)
    }

    pub fn leads_apps_for(&self, floorplan_code: &str) -> Option<LeadsApps> {
        self.leads_apps.get(floorplan_code).copied()
    }
}

//! Rent-roll normalization boundary.
//!
//! Rent-roll exports disagree on column names, status wording and number
//! formatting. This module maps them onto strict [`UnitState`] rows and derives
//! the box score the pricing engine expects.

mod box_score;
mod columns;
mod normalizer;
mod parser;

pub use box_score::box_score;

use crate::workflows::pricing::domain::{
    CarryForwardBaseline, CommunityMetrics, FloorplanTrend, LeadsApps, UnitState,
};
use crate::workflows::pricing::{CarryForwardRecord, DataProvider, PricingConfig};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum RentRollError {
    #[error("failed to read rent roll: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid rent roll CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("rent roll is missing a {0} column")]
    MissingColumn(&'static str),
}

/// Normalized rent roll.
#[derive(Debug, Clone, Default)]
pub struct RentRoll {
    pub units: Vec<UnitState>,
    /// Bedroom counts from an explicit column, keyed by floorplan.
    pub floorplan_bedrooms: BTreeMap<String, u32>,
    pub skipped_rows: usize,
}

impl RentRoll {
    /// Median positive current rent per floorplan.
    pub fn median_rents(&self) -> BTreeMap<String, f64> {
        let mut rents: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for unit in &self.units {
            if unit.current_rent.is_finite() && unit.current_rent > 0.0 {
                rents
                    .entry(unit.floorplan_code.as_str())
                    .or_default()
                    .push(unit.current_rent);
            }
        }

        rents
            .into_iter()
            .map(|(code, mut values)| {
                values.sort_by(f64::total_cmp);
                let mid = values.len() / 2;
                let median = if values.len() % 2 == 0 {
                    (values[mid - 1] + values[mid]) / 2.0
                } else {
                    values[mid]
                };
                (code.to_string(), median)
            })
            .collect()
    }
}

pub struct RentRollImporter;

impl RentRollImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<RentRoll, RentRollError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<RentRoll, RentRollError> {
        let parsed = parser::parse_rent_roll(reader)?;
        info!(
            units = parsed.units.len(),
            skipped = parsed.skipped_rows,
            "rent roll imported"
        );

        Ok(RentRoll {
            units: parsed.units,
            floorplan_bedrooms: parsed.bedrooms,
            skipped_rows: parsed.skipped_rows,
        })
    }
}

/// Data provider backed by a normalized rent roll.
///
/// Lead and application counts are not part of a rent roll, so the conversion
/// nudge is always a no-op for this provider.
#[derive(Debug, Clone)]
pub struct RentRollProvider {
    roll: RentRoll,
    trends: BTreeMap<String, FloorplanTrend>,
    community: Option<CommunityMetrics>,
    starting_rents: BTreeMap<String, f64>,
    carry_forward: Option<CarryForwardRecord>,
    today: NaiveDate,
}

impl RentRollProvider {
    pub fn new(roll: RentRoll, config: &PricingConfig, today: NaiveDate) -> Self {
        let (trends, community) = box_score(&roll.units, &roll.floorplan_bedrooms, config);
        let starting_rents = roll.median_rents();

        Self {
            roll,
            trends,
            community,
            starting_rents,
            carry_forward: None,
            today,
        }
    }

    pub fn from_path<P: AsRef<Path>>(
        path: P,
        config: &PricingConfig,
        today: NaiveDate,
    ) -> Result<Self, RentRollError> {
        let roll = RentRollImporter::from_path(path)?;
        Ok(Self::new(roll, config, today))
    }

    /// Override derived starting rents for the given floorplans.
    pub fn with_starting_rents(mut self, rents: BTreeMap<String, f64>) -> Self {
        self.starting_rents.extend(rents);
        self
    }

    pub fn with_carry_forward(mut self, record: Option<CarryForwardRecord>) -> Self {
        self.carry_forward = record;
        self
    }

    pub fn roll(&self) -> &RentRoll {
        &self.roll
    }
}

impl DataProvider for RentRollProvider {
    fn units(&self) -> Vec<UnitState> {
        self.roll.units.clone()
    }

    fn floorplan_trends(&self) -> BTreeMap<String, FloorplanTrend> {
        self.trends.clone()
    }

    fn box_score(&self) -> Option<CommunityMetrics> {
        self.community
    }

    fn leads_apps(&self, _floorplan_code: &str, _days: u32) -> Option<LeadsApps> {
        None
    }

    fn carry_forward_baselines(&self) -> BTreeMap<String, CarryForwardBaseline> {
        self.carry_forward
            .as_ref()
            .map(|record| record.units.clone())
            .unwrap_or_default()
    }

    fn floorplan_baselines(&self) -> BTreeMap<String, f64> {
        self.carry_forward
            .as_ref()
            .map(|record| record.fp_baselines.clone())
            .unwrap_or_default()
    }

    fn starting_rents(&self) -> BTreeMap<String, f64> {
        self.starting_rents.clone()
    }

    fn current_date(&self) -> NaiveDate {
        self.today
    }
}

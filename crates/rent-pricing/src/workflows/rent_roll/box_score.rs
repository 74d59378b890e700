use crate::workflows::pricing::domain::{CommunityMetrics, FloorplanTrend, UnitState};
use crate::workflows::pricing::policy::PricingConfig;
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, Copy)]
struct OccupancyCounts {
    total: u32,
    occupied: u32,
    preleased: u32,
    on_notice: u32,
}

impl OccupancyCounts {
    fn add(&mut self, unit: &UnitState) {
        let status = unit.status;
        if !status.is_rentable() {
            return;
        }

        self.total += 1;
        self.occupied += u32::from(status.is_occupied());
        self.preleased += u32::from(status.is_preleased());
        self.on_notice += u32::from(status.is_on_notice());
    }

    fn merge(&mut self, other: &Self) {
        self.total += other.total;
        self.occupied += other.occupied;
        self.preleased += other.preleased;
        self.on_notice += other.on_notice;
    }

    fn current(&self) -> f64 {
        ratio(self.occupied, self.total)
    }

    /// (occupied + preleased - on notice) / total
    fn trending(&self) -> f64 {
        let numerator = i64::from(self.occupied) + i64::from(self.preleased)
            - i64::from(self.on_notice);
        if self.total == 0 {
            0.0
        } else {
            numerator.max(0) as f64 / f64::from(self.total)
        }
    }
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        f64::from(numerator) / f64::from(denominator)
    }
}

/// Per-floorplan trends plus community metrics derived from a unit batch.
///
/// Floorplans with no rentable units get no trend at all.
pub fn box_score(
    units: &[UnitState],
    bedrooms: &BTreeMap<String, u32>,
    config: &PricingConfig,
) -> (BTreeMap<String, FloorplanTrend>, Option<CommunityMetrics>) {
    let mut counts: BTreeMap<&str, OccupancyCounts> = BTreeMap::new();
    for unit in units {
        counts
            .entry(unit.floorplan_code.as_str())
            .or_default()
            .add(unit);
    }

    let band = config.comfort_band;
    let mut community = OccupancyCounts::default();
    let mut trends = BTreeMap::new();

    for (code, floorplan) in &counts {
        community.merge(floorplan);
        if floorplan.total == 0 {
            continue;
        }

        trends.insert(
            code.to_string(),
            FloorplanTrend {
                code: code.to_string(),
                trending_occupancy: floorplan.trending(),
                current_occupancy: floorplan.current(),
                band_low: band.low,
                band_high: band.high,
                bedrooms: bedrooms
                    .get(*code)
                    .copied()
                    .or_else(|| crate::workflows::pricing::domain::infer_bedrooms(code)),
            },
        );
    }

    let metrics = (community.total > 0).then(|| CommunityMetrics {
        trending_occupancy: community.trending(),
        current_occupancy: community.current(),
        target: config.comfort_target,
    });

    (trends, metrics)
}

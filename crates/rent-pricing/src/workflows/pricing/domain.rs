use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Occupancy status of a unit as reported by the rent roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Vacant,
    VacantLeased,
    Occupied,
    OnNotice,
    OnNoticeLeased,
    Model,
    Down,
    Other,
}

impl UnitStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Vacant => "Vacant",
            Self::VacantLeased => "Vacant (Leased)",
            Self::Occupied => "Occupied",
            Self::OnNotice => "On Notice",
            Self::OnNoticeLeased => "On Notice (Leased)",
            Self::Model => "Model",
            Self::Down => "Down",
            Self::Other => "Other",
        }
    }

    /// Model, down and unrecognized units are excluded from occupancy math.
    pub const fn is_rentable(self) -> bool {
        !matches!(self, Self::Model | Self::Down | Self::Other)
    }

    pub const fn is_vacant(self) -> bool {
        matches!(self, Self::Vacant | Self::VacantLeased)
    }

    pub const fn is_occupied(self) -> bool {
        matches!(self, Self::Occupied | Self::OnNotice | Self::OnNoticeLeased)
    }

    pub const fn is_preleased(self) -> bool {
        matches!(self, Self::VacantLeased | Self::OnNoticeLeased)
    }

    pub const fn is_on_notice(self) -> bool {
        matches!(self, Self::OnNotice | Self::OnNoticeLeased)
    }
}

/// Strict per-run snapshot of a single unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitState {
    pub unit_id: String,
    pub floorplan_code: String,
    pub status: UnitStatus,
    #[serde(default)]
    pub current_rent: f64,
    #[serde(default)]
    pub lease_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub prelease_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub vacant_days: i64,
    #[serde(default)]
    pub move_in_date: Option<NaiveDate>,
    #[serde(default)]
    pub amenity_adj: f64,
}

impl UnitState {
    pub fn new(
        unit_id: impl Into<String>,
        floorplan_code: impl Into<String>,
        status: UnitStatus,
        current_rent: f64,
    ) -> Self {
        Self {
            unit_id: unit_id.into(),
            floorplan_code: floorplan_code.into(),
            status,
            current_rent,
            lease_end_date: None,
            prelease_start_date: None,
            vacant_days: 0,
            move_in_date: None,
            amenity_adj: 0.0,
        }
    }

    /// Date a new lease on this unit could begin.
    ///
    /// Vacant units are available immediately; occupied units become available
    /// when the current lease ends, if that is still in the future.
    pub fn available_on(&self, today: NaiveDate) -> NaiveDate {
        if self.status.is_vacant() {
            return today;
        }

        match self.lease_end_date {
            Some(end) if end > today => end,
            _ => today,
        }
    }
}

/// Per-floorplan occupancy snapshot and comfort band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorplanTrend {
    pub code: String,
    pub trending_occupancy: f64,
    pub current_occupancy: f64,
    pub band_low: f64,
    pub band_high: f64,
    #[serde(default)]
    pub bedrooms: Option<u32>,
}

/// Community-wide occupancy figures (one per run).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommunityMetrics {
    pub trending_occupancy: f64,
    pub current_occupancy: f64,
    pub target: f64,
}

/// Previously approved rent persisted across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarryForwardBaseline {
    pub unit_id: String,
    pub floorplan_code: String,
    #[serde(default)]
    pub prior_approved_rent: Option<f64>,
    #[serde(default)]
    pub prior_approved_date: Option<NaiveDate>,
    #[serde(default)]
    pub term: Option<u32>,
}

impl CarryForwardBaseline {
    /// The approved rent, if present and strictly positive.
    pub fn approved_rent(&self) -> Option<f64> {
        self.prior_approved_rent
            .filter(|rent| rent.is_finite() && *rent > 0.0)
    }
}

/// Lead and application counts for a lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadsApps {
    pub leads: u32,
    pub apps: u32,
}

impl LeadsApps {
    pub fn conversion_ratio(self) -> Option<f64> {
        if self.leads == 0 {
            None
        } else {
            Some(f64::from(self.apps) / f64::from(self.leads))
        }
    }
}

/// Bedroom count implied by a floorplan code (`S0` -> 0, `B2` -> 2).
pub fn infer_bedrooms(code: &str) -> Option<u32> {
    code.chars().find_map(|c| c.to_digit(10))
}

pub(crate) fn month_index(date: NaiveDate) -> usize {
    date.month0() as usize
}

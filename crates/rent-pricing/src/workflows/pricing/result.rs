use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::domain::CarryForwardBaseline;
use super::policy::PricingConfig;
use super::repository::CarryForwardRecord;

/// Pipeline step a reason belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonKind {
    Trend,
    CommunityBias,
    Conversion,
    Baseline,
    Cap,
    Floor,
    TierGap,
    ShortTermPremium,
    Seasonality,
    VacancyDiscount,
    MissingContext,
    InvalidNumeric,
}

impl ReasonKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Trend => "Trend",
            Self::CommunityBias => "Community Bias",
            Self::Conversion => "Conversion",
            Self::Baseline => "Baseline",
            Self::Cap => "Cap",
            Self::Floor => "Floor",
            Self::TierGap => "Tier Gap",
            Self::ShortTermPremium => "Short-Term Premium",
            Self::Seasonality => "Seasonality",
            Self::VacancyDiscount => "Vacancy Discount",
            Self::MissingContext => "Missing Context",
            Self::InvalidNumeric => "Invalid Numeric",
        }
    }
}

/// One entry of the audit trail explaining a price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingReason {
    #[serde(rename = "type")]
    pub kind: ReasonKind,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub applied: bool,
}

impl PricingReason {
    pub(crate) fn applied(kind: ReasonKind, description: String, value: Option<f64>) -> Self {
        Self {
            kind,
            description,
            value,
            applied: true,
        }
    }

    pub(crate) fn skipped(kind: ReasonKind, description: String) -> Self {
        Self {
            kind,
            description,
            value: None,
            applied: false,
        }
    }
}

/// Fixed set of booleans summarizing which steps changed the price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingFlags {
    pub carry_forward_used: bool,
    pub cap_clamped: bool,
    pub floor_clamped: bool,
    pub tier_gap_clamped: bool,
    pub missing_trend: bool,
    pub conversion_applied: bool,
    pub seasonality_applied: bool,
    pub vacancy_discount_applied: bool,
    pub vacancy_discount_limited: bool,
    pub input_coerced: bool,
}

/// Where the pre-movement baseline rent came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineSource {
    CarryForward,
    FloorplanCarryForward,
    CurrentRent,
    StartingRent,
    DefaultStartingRent,
}

impl BaselineSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::CarryForward => "carryForward",
            Self::FloorplanCarryForward => "floorplanCarryForward",
            Self::CurrentRent => "currentRent",
            Self::StartingRent => "startingRent",
            Self::DefaultStartingRent => "defaultStartingRent",
        }
    }

    pub const fn is_carry_forward(self) -> bool {
        matches!(self, Self::CarryForward | Self::FloorplanCarryForward)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceDelta {
    pub previous: f64,
    pub proposed: f64,
    pub dollars: f64,
    /// Percent change; 0 when there is no previous rent.
    pub percent: f64,
}

impl PriceDelta {
    pub(crate) fn between(previous: f64, proposed: f64) -> Self {
        let dollars = proposed - previous;
        let percent = if previous > 0.0 {
            dollars / previous * 100.0
        } else {
            0.0
        };

        Self {
            previous,
            proposed,
            dollars,
            percent,
        }
    }
}

/// Quote for a single lease term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermPrice {
    pub term: u32,
    pub price: f64,
    pub short_term_premium: f64,
    pub seasonality_uplift: f64,
    pub vacancy_discount: f64,
    pub over_cap: bool,
}

/// Fully explained pricing outcome for one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitPricingResult {
    pub unit_id: String,
    pub floorplan_code: String,
    pub baseline_source: BaselineSource,
    /// Baseline after movement and the clamp chain.
    pub baseline_rent: f64,
    pub reference_term: u32,
    pub reference_rent: f64,
    pub delta: PriceDelta,
    pub term_pricing: Vec<TermPrice>,
    pub reasons: Vec<PricingReason>,
    pub flags: PricingFlags,
}

impl UnitPricingResult {
    pub fn term_price(&self, term: u32) -> Option<&TermPrice> {
        self.term_pricing.iter().find(|entry| entry.term == term)
    }

    pub fn reasons_of(&self, kind: ReasonKind) -> impl Iterator<Item = &PricingReason> {
        self.reasons.iter().filter(move |reason| reason.kind == kind)
    }
}

/// The resolved reference rent a floorplan hands to the next bedroom tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowerTierReference {
    pub floorplan_code: String,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    pub reference_rent: f64,
}

/// Floorplan-level roll-up of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorplanPricing {
    pub code: String,
    pub bedrooms: Option<u32>,
    pub unit_count: usize,
    pub direction: i8,
    pub magnitude: f64,
    pub min_reference_rent: f64,
    pub mean_reference_rent: f64,
    pub max_reference_rent: f64,
    pub mean_baseline_rent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_tier: Option<LowerTierReference>,
    pub cap_clamped_units: usize,
    pub floor_clamped_units: usize,
    pub tier_gap_clamped_units: usize,
}

impl FloorplanPricing {
    /// Reference handed to the next higher bedroom tier.
    pub fn as_lower_tier(&self) -> LowerTierReference {
        LowerTierReference {
            floorplan_code: self.code.clone(),
            bedrooms: self.bedrooms,
            reference_rent: self.max_reference_rent,
        }
    }
}

/// Output of a full batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRun {
    pub unit_pricing: BTreeMap<String, UnitPricingResult>,
    pub floorplan_pricing: BTreeMap<String, FloorplanPricing>,
    pub calculated_at: NaiveDate,
    pub config_snapshot: PricingConfig,
}

impl PricingRun {
    /// Persisted record carrying each unit's approved baseline into the next run.
    pub fn carry_forward_record(&self, at: DateTime<Utc>) -> CarryForwardRecord {
        let units = self
            .unit_pricing
            .values()
            .map(|result| {
                (
                    result.unit_id.clone(),
                    CarryForwardBaseline {
                        unit_id: result.unit_id.clone(),
                        floorplan_code: result.floorplan_code.clone(),
                        prior_approved_rent: Some(result.baseline_rent)
                            .filter(|rent| *rent > 0.0),
                        prior_approved_date: Some(self.calculated_at),
                        term: Some(result.reference_term),
                    },
                )
            })
            .collect();

        let fp_baselines = self
            .floorplan_pricing
            .values()
            .filter(|summary| summary.mean_baseline_rent > 0.0)
            .map(|summary| (summary.code.clone(), summary.mean_baseline_rent.round()))
            .collect();

        CarryForwardRecord {
            fp_baselines,
            units,
            at,
        }
    }
}

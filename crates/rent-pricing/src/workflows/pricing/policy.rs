use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Absolute dollar floor no proposal may go below.
pub const ABSOLUTE_MIN_RENT: f64 = 500.0;

/// Starting rent assumed for a floorplan with no configured value.
pub const DEFAULT_STARTING_RENT: f64 = 1000.0;

/// Share of the trend magnitude kept while occupancy sits inside the comfort band.
pub(crate) const DEAD_ZONE_DAMPING: f64 = 0.1;

/// Occupancy deviation (percentage points) that maps to one unit of the tanh curve input.
pub(crate) const DEVIATION_SCALE_PP: f64 = 5.0;
pub(crate) const TANH_STEEPNESS: f64 = 1.4;

/// Community deviation (pp) that must be exceeded before the bias multiplier applies.
pub(crate) const COMMUNITY_BIAS_THRESHOLD_PP: f64 = 1.0;
pub(crate) const COMMUNITY_BIAS_PER_PP: f64 = 0.15;
pub(crate) const COMMUNITY_BIAS_MAX: f64 = 0.3;

pub(crate) const CONVERSION_HIGH_RATIO: f64 = 0.30;
pub(crate) const CONVERSION_LOW_RATIO: f64 = 0.10;
pub(crate) const CONVERSION_NUDGE: f64 = 0.005;

pub(crate) const SHORT_TERM_BASE_PREMIUM: f64 = 0.08;
pub(crate) const SHORT_TERM_PREMIUM_STEP: f64 = 0.01;
/// Terms at or above this length carry no short-term premium.
pub(crate) const SHORT_TERM_CUTOFF: u32 = 10;

pub(crate) const SEASONALITY_MIN: f64 = 0.8;
pub(crate) const SEASONALITY_MAX: f64 = 1.2;

/// How aggressively prices respond to occupancy deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceResponse {
    Fast,
    #[default]
    Standard,
    Gentle,
}

impl PriceResponse {
    /// Largest fractional movement a single run may propose.
    pub const fn max_move(self) -> f64 {
        match self {
            Self::Fast => 0.08,
            Self::Standard => 0.05,
            Self::Gentle => 0.03,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Standard => "standard",
            Self::Gentle => "gentle",
        }
    }
}

/// Occupancy range treated as price-stable, expressed as fractions (0..1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComfortBand {
    pub low: f64,
    pub high: f64,
}

impl Default for ComfortBand {
    fn default() -> Self {
        Self {
            low: 0.93,
            high: 0.96,
        }
    }
}

/// Discount schedule for units that have been vacant for a long time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VacancyAgePolicy {
    pub enabled: bool,
    pub threshold_days: i64,
    pub discount_per_day: f64,
    pub max_discount: f64,
}

impl Default for VacancyAgePolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold_days: 30,
            discount_per_day: 0.002,
            max_discount: 0.10,
        }
    }
}

impl VacancyAgePolicy {
    /// Fractional discount for a unit vacant `vacant_days` days.
    pub fn discount(&self, vacant_days: i64) -> f64 {
        if !self.enabled || vacant_days <= self.threshold_days {
            return 0.0;
        }

        let days_over = (vacant_days - self.threshold_days) as f64;
        (days_over * self.discount_per_day).min(self.max_discount)
    }
}

/// Month-of-year multipliers applied to the end month of over-cap terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalityPolicy {
    pub enabled: bool,
    /// January first.
    pub monthly_multipliers: [f64; 12],
}

impl Default for SeasonalityPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            monthly_multipliers: [1.0; 12],
        }
    }
}

impl SeasonalityPolicy {
    /// Positive uplift for a term ending in `month0` (0 = January).
    ///
    /// Negative seasonality is never applied.
    pub fn uplift(&self, month0: usize) -> f64 {
        if !self.enabled {
            return 0.0;
        }

        let multiplier = self
            .monthly_multipliers
            .get(month0)
            .copied()
            .filter(|value| value.is_finite())
            .unwrap_or(1.0)
            .clamp(SEASONALITY_MIN, SEASONALITY_MAX);

        (multiplier - 1.0).max(0.0)
    }
}

/// Immutable policy bundle supplied once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub price_response: PriceResponse,
    /// Community occupancy target used when the box score carries none.
    pub comfort_target: f64,
    /// Band assigned to floorplans derived from a rent roll.
    pub comfort_band: ComfortBand,
    pub max_weekly_decrease: f64,
    pub min_floor_vs_current_rent: f64,
    /// Dollar gap required above a floorplan by the next bedroom tier, keyed by the lower code.
    pub min_gap_to_next_tier: BTreeMap<String, f64>,
    pub available_terms: Vec<u32>,
    pub reference_term: u32,
    pub vacancy_age: VacancyAgePolicy,
    pub seasonality: SeasonalityPolicy,
    pub enable_carry_forward: bool,
    pub conversion_lookback_days: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            price_response: PriceResponse::Standard,
            comfort_target: 0.95,
            comfort_band: ComfortBand::default(),
            max_weekly_decrease: 0.05,
            min_floor_vs_current_rent: 0.90,
            min_gap_to_next_tier: BTreeMap::new(),
            available_terms: default_terms(),
            reference_term: 12,
            vacancy_age: VacancyAgePolicy::default(),
            seasonality: SeasonalityPolicy::default(),
            enable_carry_forward: true,
            conversion_lookback_days: 28,
        }
    }
}

fn default_terms() -> Vec<u32> {
    (2..=14).collect()
}

impl PricingConfig {
    /// Copy of the policy with malformed values clamped to usable ones.
    ///
    /// Validation is the caller's job; this only keeps the engine from
    /// producing nonsense when it is skipped.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut config = self.clone();

        if !config.comfort_target.is_finite()
            || config.comfort_target <= 0.0
            || config.comfort_target > 1.0
        {
            warn!(value = config.comfort_target, "invalid comfort target, using default");
            config.comfort_target = defaults.comfort_target;
        }

        let band = config.comfort_band;
        if !is_ratio(band.low) || !is_ratio(band.high) {
            warn!("invalid comfort band, using default");
            config.comfort_band = defaults.comfort_band;
        } else if band.low > band.high {
            config.comfort_band = ComfortBand {
                low: band.high,
                high: band.low,
            };
        }

        config.max_weekly_decrease = if config.max_weekly_decrease.is_finite() {
            config.max_weekly_decrease.clamp(0.0, 1.0)
        } else {
            warn!("invalid max weekly decrease, using default");
            defaults.max_weekly_decrease
        };

        let floor_ratio = config.min_floor_vs_current_rent;
        config.min_floor_vs_current_rent = if !floor_ratio.is_finite() {
            warn!("invalid floor ratio, using default");
            defaults.min_floor_vs_current_rent
        } else if !is_ratio(floor_ratio) {
            warn!(value = floor_ratio, "floor ratio outside [0, 1], clamping");
            floor_ratio.clamp(0.0, 1.0)
        } else {
            floor_ratio
        };

        config
            .min_gap_to_next_tier
            .retain(|_, gap| gap.is_finite() && *gap >= 0.0);

        let mut terms: Vec<u32> = config
            .available_terms
            .iter()
            .copied()
            .filter(|term| *term > 0)
            .collect();
        if config.reference_term == 0 {
            config.reference_term = defaults.reference_term;
        }
        if terms.is_empty() {
            terms = defaults.available_terms;
        }
        terms.push(config.reference_term);
        terms.sort_unstable();
        terms.dedup();
        config.available_terms = terms;

        let vacancy = &mut config.vacancy_age;
        vacancy.threshold_days = vacancy.threshold_days.max(0);
        vacancy.discount_per_day = non_negative_or(vacancy.discount_per_day, 0.0);
        vacancy.max_discount = non_negative_or(vacancy.max_discount, 0.0).min(1.0);

        for multiplier in config.seasonality.monthly_multipliers.iter_mut() {
            *multiplier = if multiplier.is_finite() {
                multiplier.clamp(SEASONALITY_MIN, SEASONALITY_MAX)
            } else {
                1.0
            };
        }

        config
    }

    pub fn max_move(&self) -> f64 {
        self.price_response.max_move()
    }

    /// Gap required above the floorplan `lower_code` by the next bedroom tier.
    pub fn tier_gap_above(&self, lower_code: &str) -> f64 {
        self.min_gap_to_next_tier
            .get(lower_code)
            .copied()
            .unwrap_or(0.0)
    }
}

fn is_ratio(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

fn non_negative_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        fallback
    }
}

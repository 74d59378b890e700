use serde::Serialize;

use super::super::context::MarketContext;
use super::super::policy::{
    PricingConfig, COMMUNITY_BIAS_MAX, COMMUNITY_BIAS_PER_PP, COMMUNITY_BIAS_THRESHOLD_PP,
    DEAD_ZONE_DAMPING, DEVIATION_SCALE_PP, TANH_STEEPNESS,
};
use super::super::result::{PricingReason, ReasonKind};
use super::percent;

/// Direction and damped size of the occupancy-driven price movement.
///
/// `magnitude` is never negative; the sign lives in `direction`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSignal {
    pub direction: i8,
    pub magnitude: f64,
    pub inside_band: bool,
    /// False when the floorplan had no usable trend data.
    pub available: bool,
    pub reasons: Vec<PricingReason>,
}

impl TrendSignal {
    pub(crate) fn unavailable() -> Self {
        Self {
            direction: 0,
            magnitude: 0.0,
            inside_band: false,
            available: false,
            reasons: Vec::new(),
        }
    }

    /// Signed fractional movement (`direction * magnitude`).
    pub fn movement(&self) -> f64 {
        f64::from(self.direction) * self.magnitude
    }
}

/// Undamped tanh response to a deviation from the band midpoint.
pub fn response_curve(deviation_pp: f64, max_move: f64) -> f64 {
    let x = deviation_pp.abs() / DEVIATION_SCALE_PP;
    max_move * (TANH_STEEPNESS * x).tanh()
}

pub fn compute_trend(
    floorplan_code: &str,
    context: &MarketContext,
    config: &PricingConfig,
) -> TrendSignal {
    let Some(trend) = context.trend_for(floorplan_code) else {
        return TrendSignal::unavailable();
    };

    let occupancy = trend.trending_occupancy;
    if !occupancy.is_finite()
        || occupancy < 0.0
        || !trend.band_low.is_finite()
        || !trend.band_high.is_finite()
    {
        return TrendSignal::unavailable();
    }

    let (band_low, band_high) = if trend.band_low <= trend.band_high {
        (trend.band_low, trend.band_high)
    } else {
        (trend.band_high, trend.band_low)
    };

    let max_move = config.max_move();
    let band_mid_pct = (band_low + band_high) / 2.0 * 100.0;
    let deviation_pp = occupancy * 100.0 - band_mid_pct;
    let direction: i8 = if deviation_pp > 0.0 {
        1
    } else if deviation_pp < 0.0 {
        -1
    } else {
        0
    };

    let mut magnitude = response_curve(deviation_pp, max_move);
    let mut reasons = Vec::new();
    let inside_band = occupancy >= band_low && occupancy <= band_high;

    reasons.push(PricingReason::applied(
        ReasonKind::Trend,
        format!(
            "{floorplan_code} trending {:.1}% vs band {:.1}%-{:.1}% ({:+.1}pp, {} response)",
            occupancy * 100.0,
            band_low * 100.0,
            band_high * 100.0,
            deviation_pp,
            config.price_response.label(),
        ),
        Some(f64::from(direction) * magnitude),
    ));

    if inside_band {
        magnitude *= DEAD_ZONE_DAMPING;
        reasons.push(PricingReason::applied(
            ReasonKind::Trend,
            format!(
                "inside comfort band: movement damped to {}",
                percent(f64::from(direction) * magnitude)
            ),
            Some(f64::from(direction) * magnitude),
        ));
    } else if let Some(multiplier) = community_bias(direction, context, config) {
        let biased = (magnitude * multiplier).min(max_move);
        reasons.push(PricingReason::applied(
            ReasonKind::CommunityBias,
            format!(
                "community occupancy agrees with floorplan trend: x{multiplier:.2} ({} -> {})",
                percent(magnitude),
                percent(biased)
            ),
            Some(multiplier),
        ));
        magnitude = biased;
    }

    TrendSignal {
        direction,
        magnitude: magnitude.min(max_move),
        inside_band,
        available: true,
        reasons,
    }
}

fn community_bias(direction: i8, context: &MarketContext, config: &PricingConfig) -> Option<f64> {
    if direction == 0 {
        return None;
    }

    let community = context.community?;
    if !community.trending_occupancy.is_finite() {
        return None;
    }

    let target = if community.target.is_finite() && community.target > 0.0 {
        community.target
    } else {
        config.comfort_target
    };

    let delta_pp = (community.trending_occupancy - target) * 100.0;
    let same_direction = (delta_pp > 0.0 && direction > 0) || (delta_pp < 0.0 && direction < 0);
    if delta_pp.abs() <= COMMUNITY_BIAS_THRESHOLD_PP || !same_direction {
        return None;
    }

    Some(1.0 + (COMMUNITY_BIAS_PER_PP * delta_pp.abs()).min(COMMUNITY_BIAS_MAX))
}

use super::super::policy::{PricingConfig, ABSOLUTE_MIN_RENT};
use super::super::result::{LowerTierReference, PricingReason, ReasonKind};
use super::{dollars, percent};

/// Inputs to the Cap -> Floor -> Tier-Gap chain.
#[derive(Debug, Clone)]
pub struct ClampInputs<'a> {
    pub baseline: f64,
    pub direction: i8,
    pub magnitude: f64,
    pub nudge: f64,
    /// Rent the floor ratio is applied to.
    pub floor_basis: f64,
    pub lower_tier: Option<&'a LowerTierReference>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClampOutcome {
    /// Candidate after movement, before any clamp.
    pub candidate: f64,
    pub rent: f64,
    /// Highest of the floor and tier-gap minimums; term prices never go below it.
    pub hard_minimum: f64,
    pub cap_clamped: bool,
    pub floor_clamped: bool,
    pub tier_gap_clamped: bool,
    pub reasons: Vec<PricingReason>,
}

struct ClampStep {
    rent: f64,
    minimum: f64,
    clamped: bool,
    reason: PricingReason,
}

/// Apply the clamps in their fixed order. The order must not change: the floor
/// may undo a cap and the tier gap may undo both.
pub fn apply_clamp_chain(inputs: &ClampInputs<'_>, config: &PricingConfig) -> ClampOutcome {
    let movement = f64::from(inputs.direction) * inputs.magnitude + inputs.nudge;
    let candidate = inputs.baseline * (1.0 + movement);

    let cap = apply_cap(candidate, inputs.baseline, config.max_weekly_decrease);
    let floor = apply_floor(cap.rent, inputs.floor_basis, config.min_floor_vs_current_rent);
    let tier = apply_tier_gap(floor.rent, inputs.lower_tier, config);

    let hard_minimum = floor.minimum.max(tier.minimum);

    ClampOutcome {
        candidate,
        rent: tier.rent,
        hard_minimum,
        cap_clamped: cap.clamped,
        floor_clamped: floor.clamped,
        tier_gap_clamped: tier.clamped,
        reasons: vec![cap.reason, floor.reason, tier.reason],
    }
}

/// Only decreases are capped.
fn apply_cap(candidate: f64, baseline: f64, max_weekly_decrease: f64) -> ClampStep {
    let minimum = baseline * (1.0 - max_weekly_decrease);

    if candidate < minimum {
        ClampStep {
            rent: minimum,
            minimum,
            clamped: true,
            reason: PricingReason::applied(
                ReasonKind::Cap,
                format!(
                    "decrease capped at {}: {} -> {}",
                    percent(max_weekly_decrease),
                    dollars(candidate),
                    dollars(minimum)
                ),
                Some(minimum),
            ),
        }
    } else {
        ClampStep {
            rent: candidate,
            minimum,
            clamped: false,
            reason: PricingReason::skipped(
                ReasonKind::Cap,
                format!(
                    "{} within weekly decrease cap (min {})",
                    dollars(candidate),
                    dollars(minimum)
                ),
            ),
        }
    }
}

fn apply_floor(candidate: f64, floor_basis: f64, ratio: f64) -> ClampStep {
    let minimum = ABSOLUTE_MIN_RENT.max(floor_basis * ratio);

    if candidate < minimum {
        ClampStep {
            rent: minimum,
            minimum,
            clamped: true,
            reason: PricingReason::applied(
                ReasonKind::Floor,
                format!(
                    "raised to floor ({} of {}, min {}): {} -> {}",
                    percent(ratio),
                    dollars(floor_basis),
                    dollars(ABSOLUTE_MIN_RENT),
                    dollars(candidate),
                    dollars(minimum)
                ),
                Some(minimum),
            ),
        }
    } else {
        ClampStep {
            rent: candidate,
            minimum,
            clamped: false,
            reason: PricingReason::skipped(
                ReasonKind::Floor,
                format!("{} above floor {}", dollars(candidate), dollars(minimum)),
            ),
        }
    }
}

fn apply_tier_gap(
    candidate: f64,
    lower_tier: Option<&LowerTierReference>,
    config: &PricingConfig,
) -> ClampStep {
    let Some(lower) = lower_tier.filter(|lower| lower.reference_rent.is_finite()) else {
        return ClampStep {
            rent: candidate,
            minimum: 0.0,
            clamped: false,
            reason: PricingReason::skipped(
                ReasonKind::TierGap,
                "no lower bedroom tier to compare against".to_string(),
            ),
        };
    };

    let gap = config.tier_gap_above(&lower.floorplan_code);
    let minimum = lower.reference_rent + gap;

    if candidate < minimum {
        ClampStep {
            rent: minimum,
            minimum,
            clamped: true,
            reason: PricingReason::applied(
                ReasonKind::TierGap,
                format!(
                    "raised to {} reference {} + gap {}: {} -> {}",
                    lower.floorplan_code,
                    dollars(lower.reference_rent),
                    dollars(gap),
                    dollars(candidate),
                    dollars(minimum)
                ),
                Some(minimum),
            ),
        }
    } else {
        ClampStep {
            rent: candidate,
            minimum,
            clamped: false,
            reason: PricingReason::skipped(
                ReasonKind::TierGap,
                format!(
                    "{} clears {} reference {} + gap {}",
                    dollars(candidate),
                    lower.floorplan_code,
                    dollars(lower.reference_rent),
                    dollars(gap)
                ),
            ),
        }
    }
}

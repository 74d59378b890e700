use super::common::*;
use crate::workflows::pricing::{
    apply_clamp_chain, ClampInputs, LowerTierReference, ReasonKind, ABSOLUTE_MIN_RENT,
};

fn inputs<'a>(baseline: f64, direction: i8, magnitude: f64, floor_basis: f64) -> ClampInputs<'a> {
    ClampInputs {
        baseline,
        direction,
        magnitude,
        nudge: 0.0,
        floor_basis,
        lower_tier: None,
    }
}

#[test]
fn floor_undoes_a_cap_when_current_rent_is_higher() {
    let outcome = apply_clamp_chain(&inputs(1000.0, -1, 0.08, 1200.0), &config());

    assert_close(outcome.candidate, 920.0);
    assert_close(outcome.rent, 1080.0);
    assert!(outcome.cap_clamped);
    assert!(outcome.floor_clamped);
    assert!(!outcome.tier_gap_clamped);

    let kinds: Vec<ReasonKind> = outcome.reasons.iter().map(|reason| reason.kind).collect();
    assert_eq!(kinds, vec![ReasonKind::Cap, ReasonKind::Floor, ReasonKind::TierGap]);
}

#[test]
fn cap_limits_a_large_decrease() {
    let outcome = apply_clamp_chain(&inputs(1000.0, -1, 0.08, 1000.0), &config());

    assert_close(outcome.rent, 950.0);
    assert!(outcome.cap_clamped);
    assert!(!outcome.floor_clamped);
}

#[test]
fn increases_pass_through_unclamped() {
    let outcome = apply_clamp_chain(&inputs(1000.0, 1, 0.05, 1000.0), &config());

    assert_close(outcome.rent, 1050.0);
    assert!(!outcome.cap_clamped && !outcome.floor_clamped && !outcome.tier_gap_clamped);
    assert!(outcome.reasons.iter().all(|reason| !reason.applied));
}

#[test]
fn absolute_minimum_applies_below_low_rents() {
    let outcome = apply_clamp_chain(&inputs(400.0, 0, 0.0, 400.0), &config());

    assert_eq!(outcome.rent, ABSOLUTE_MIN_RENT);
    assert_eq!(outcome.hard_minimum, ABSOLUTE_MIN_RENT);
    assert!(outcome.floor_clamped);
}

#[test]
fn tier_gap_raises_above_lower_tier_reference() {
    let mut config = config();
    config.min_gap_to_next_tier.insert("S0".to_string(), 100.0);
    let lower = LowerTierReference {
        floorplan_code: "S0".to_string(),
        bedrooms: Some(0),
        reference_rent: 1050.0,
    };
    let inputs = ClampInputs {
        lower_tier: Some(&lower),
        ..inputs(1000.0, 0, 0.0, 1000.0)
    };

    let outcome = apply_clamp_chain(&inputs, &config);

    assert_eq!(outcome.rent, 1150.0);
    assert_eq!(outcome.hard_minimum, 1150.0);
    assert!(outcome.tier_gap_clamped);
    assert!(outcome.reasons[2].applied);
}

#[test]
fn nudge_adds_to_trend_movement() {
    let outcome = apply_clamp_chain(
        &ClampInputs {
            nudge: 0.005,
            ..inputs(1000.0, 1, 0.01, 1000.0)
        },
        &config(),
    );

    assert_close(outcome.rent, 1015.0);
}

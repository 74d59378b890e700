use super::common::*;
use crate::workflows::pricing::{compute_trend, conversion_nudge, LeadsApps, ReasonKind};

#[test]
fn strong_conversion_inside_band_nudges_up_half_a_percent() {
    let context = context_with(&[trend("A1", 0.945, 1)]);
    let signal = compute_trend("A1", &context, &config());

    let nudge = conversion_nudge(&signal, Some(LeadsApps { leads: 100, apps: 35 }));

    assert!(nudge.applied());
    assert_close(nudge.nudge, 0.005);
    assert!(nudge.reasons[0].applied);
    assert_eq!(nudge.reasons[0].kind, ReasonKind::Conversion);
}

#[test]
fn weak_conversion_inside_band_nudges_down() {
    let context = context_with(&[trend("A1", 0.94, 1)]);
    let signal = compute_trend("A1", &context, &config());

    let nudge = conversion_nudge(&signal, Some(LeadsApps { leads: 100, apps: 5 }));

    assert_close(nudge.nudge, -0.005);
}

#[test]
fn neutral_conversion_is_recorded_but_not_applied() {
    let context = context_with(&[trend("A1", 0.94, 1)]);
    let signal = compute_trend("A1", &context, &config());

    let nudge = conversion_nudge(&signal, Some(LeadsApps { leads: 100, apps: 20 }));

    assert!(!nudge.applied());
    assert_eq!(nudge.reasons.len(), 1);
    assert!(!nudge.reasons[0].applied);
}

#[test]
fn outside_band_ignores_conversion() {
    let context = context_with(&[trend("A1", 0.90, 1)]);
    let signal = compute_trend("A1", &context, &config());

    let nudge = conversion_nudge(&signal, Some(LeadsApps { leads: 100, apps: 60 }));

    assert_eq!(nudge.nudge, 0.0);
    assert!(nudge.reasons.is_empty());
}

#[test]
fn unavailable_lead_source_is_a_skipped_no_op() {
    let context = context_with(&[trend("A1", 0.945, 1)]);
    let signal = compute_trend("A1", &context, &config());

    let nudge = conversion_nudge(&signal, None);

    assert_eq!(nudge.nudge, 0.0);
    assert_eq!(nudge.reasons.len(), 1);
    assert!(!nudge.reasons[0].applied);
    assert!(nudge.reasons[0].description.contains("unavailable"));
}

#[test]
fn zero_leads_is_a_skipped_no_op() {
    let context = context_with(&[trend("A1", 0.945, 1)]);
    let signal = compute_trend("A1", &context, &config());

    let nudge = conversion_nudge(&signal, Some(LeadsApps { leads: 0, apps: 3 }));

    assert_eq!(nudge.nudge, 0.0);
    assert!(!nudge.reasons[0].applied);
}

use super::common::*;
use crate::workflows::pricing::{
    bedroom_order, price_all_units, price_floorplan, price_unit, BaselineSource, PriceResponse,
    PricingConfig, PricingRequest, ReasonKind, UnitStatus,
};
use chrono::{TimeZone, Utc};

fn tiered_request() -> PricingRequest {
    let mut config = config();
    config.min_gap_to_next_tier.insert("S0".to_string(), 100.0);
    config.min_gap_to_next_tier.insert("A1".to_string(), 50.0);

    PricingRequest {
        units: vec![
            occupied("301", "B2", 1080.0),
            occupied("201", "A1", 1050.0),
            occupied("101", "S0", 1000.0),
            occupied("102", "S0", 980.0),
        ],
        config,
        context: context_with(&[
            trend("S0", 0.945, 0),
            trend("A1", 0.945, 1),
            trend("B2", 0.945, 2),
        ]),
    }
}

#[test]
fn floor_undoes_cap_for_carried_forward_unit() {
    let unit = occupied("101", "A1", 1200.0);
    let context =
        context_with(&[trend("A1", 0.865, 1)]).with_carry_forward(carry_forward("101", "A1", 1000.0));
    let config = PricingConfig {
        price_response: PriceResponse::Fast,
        ..PricingConfig::default()
    };

    let result = price_unit(&unit, &config, &context, None);

    assert_eq!(result.baseline_source, BaselineSource::CarryForward);
    assert!(result.flags.carry_forward_used);
    assert!(result.flags.cap_clamped);
    assert!(result.flags.floor_clamped);
    assert_eq!(result.reference_rent, 1080.0);
    assert_eq!(result.term_price(2).map(|entry| entry.price), Some(1166.0));
    assert_close(result.delta.dollars, -120.0);
    assert_close(result.delta.percent, -10.0);
}

#[test]
fn every_result_explains_each_clamp_and_its_baseline() {
    let unit = occupied("101", "A1", 1000.0);
    let result = price_unit(&unit, &config(), &context_with(&[trend("A1", 0.90, 1)]), None);

    for kind in [
        ReasonKind::Trend,
        ReasonKind::Baseline,
        ReasonKind::Cap,
        ReasonKind::Floor,
        ReasonKind::TierGap,
    ] {
        assert!(result.reasons_of(kind).next().is_some(), "missing {kind:?}");
    }
    assert_eq!(
        result.term_price(result.reference_term).map(|entry| entry.price),
        Some(result.reference_rent)
    );
}

#[test]
fn missing_trend_holds_price_and_flags_it() {
    let unit = occupied("101", "C3", 1300.0);

    let result = price_unit(&unit, &config(), &context_with(&[]), None);

    assert!(result.flags.missing_trend);
    assert_eq!(result.reference_rent, 1300.0);
    let reason = result
        .reasons_of(ReasonKind::MissingContext)
        .next()
        .expect("missing context reason");
    assert!(!reason.applied);
}

#[test]
fn invalid_numerics_are_coerced_and_recorded() {
    let mut unit = vacant("102", "A1", f64::NAN, -4);
    unit.amenity_adj = f64::INFINITY;

    let result = price_unit(&unit, &config(), &context_with(&[]), None);

    assert!(result.flags.input_coerced);
    assert_eq!(result.reasons_of(ReasonKind::InvalidNumeric).count(), 3);
    assert_eq!(result.baseline_source, BaselineSource::DefaultStartingRent);
    assert_eq!(result.reference_rent, 1000.0);
    assert_eq!(result.delta.previous, 0.0);
    assert_eq!(result.delta.percent, 0.0);
}

#[test]
fn conversion_nudge_moves_a_mid_band_unit() {
    let unit = occupied("101", "A1", 1000.0);
    let context = context_with(&[trend("A1", 0.945, 1)]).with_leads_apps(
        "A1",
        crate::workflows::pricing::LeadsApps { leads: 100, apps: 35 },
    );

    let result = price_unit(&unit, &config(), &context, None);

    assert!(result.flags.conversion_applied);
    assert_eq!(result.reference_rent, 1005.0);
}

#[test]
fn mid_band_unit_without_leads_holds_its_price() {
    let unit = occupied("101", "A1", 1000.0);

    let result = price_unit(&unit, &config(), &context_with(&[trend("A1", 0.945, 1)]), None);

    assert_eq!(result.reference_rent, 1000.0);
    assert_eq!(result.delta.dollars, 0.0);
}

#[test]
fn batch_prices_bedroom_tiers_in_ascending_order() {
    let run = price_all_units(tiered_request());

    assert_eq!(run.unit_pricing["101"].reference_rent, 1000.0);
    assert_eq!(run.unit_pricing["201"].reference_rent, 1100.0);
    assert!(run.unit_pricing["201"].flags.tier_gap_clamped);
    assert_eq!(run.unit_pricing["301"].reference_rent, 1150.0);

    let b2 = &run.floorplan_pricing["B2"];
    let lower = b2.lower_tier.as_ref().expect("B2 has a lower tier");
    assert_eq!(lower.floorplan_code, "A1");
    assert_eq!(lower.reference_rent, 1100.0);
    assert_eq!(b2.tier_gap_clamped_units, 1);

    let s0 = &run.floorplan_pricing["S0"];
    assert_eq!(s0.unit_count, 2);
    assert!(s0.lower_tier.is_none());
    assert_eq!(s0.max_reference_rent, 1000.0);
    assert_eq!(s0.min_reference_rent, 980.0);
}

#[test]
fn missing_middle_tier_compares_against_next_lower() {
    let mut request = tiered_request();
    request.units.retain(|unit| unit.floorplan_code != "A1");

    let run = price_all_units(request);

    let lower = run.floorplan_pricing["B2"]
        .lower_tier
        .as_ref()
        .expect("lower tier");
    assert_eq!(lower.floorplan_code, "S0");
    assert_eq!(run.unit_pricing["301"].reference_rent, 1100.0);
}

#[test]
fn repeated_runs_are_identical() {
    let request = tiered_request();

    assert_eq!(price_all_units(request.clone()), price_all_units(request));
}

#[test]
fn run_records_clamped_baselines_for_carry_forward() {
    let run = price_all_units(tiered_request());
    let at = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();

    let record = run.carry_forward_record(at);

    assert_eq!(record.at, at);
    assert_eq!(record.units.len(), 4);
    assert_eq!(record.units["201"].prior_approved_rent, Some(1100.0));
    assert_eq!(record.units["201"].prior_approved_date, Some(today()));
    assert_eq!(record.fp_baselines["S0"], 990.0);
    assert_eq!(run.calculated_at, today());
}

#[test]
fn floorplan_pricing_shares_one_trend() {
    let units = vec![occupied("101", "A1", 1000.0), occupied("102", "A1", 1100.0)];
    let context = context_with(&[trend("A1", 0.90, 1)]);

    let results = price_floorplan(&units, &config(), &context, None);

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|result| result.reference_rent < 1100.0));
    assert!(results[0].reference_rent < 1000.0);
}

#[test]
fn occupied_unit_becomes_available_at_lease_end() {
    let mut unit = occupied("101", "A1", 1000.0);
    let end = today() + chrono::Duration::days(45);
    unit.lease_end_date = Some(end);

    assert_eq!(unit.available_on(today()), end);
    unit.status = UnitStatus::Vacant;
    assert_eq!(unit.available_on(today()), today());
}

#[test]
fn bedroom_order_puts_unknown_tiers_last() {
    let context = context_with(&[trend("LOFT", 0.95, 3)]);

    let order = bedroom_order(["B2", "STUDIO", "LOFT", "S0", "A1", "S0"], &context);

    let codes: Vec<&str> = order.iter().map(|tier| tier.code.as_str()).collect();
    assert_eq!(codes, vec!["S0", "A1", "B2", "LOFT", "STUDIO"]);
    assert_eq!(order[4].bedrooms, None);
}

#[test]
fn reasons_serialize_with_type_tag() {
    let unit = occupied("101", "A1", 1200.0);
    let result = price_unit(&unit, &config(), &context_with(&[trend("A1", 0.90, 1)]), None);

    let payload = serde_json::to_value(&result).expect("serialize result");
    let reasons = payload["reasons"].as_array().expect("reasons array");
    assert!(reasons.iter().all(|reason| reason.get("kind").is_none()));
    assert!(reasons.iter().any(|reason| reason["type"] == "trend"));
    assert!(reasons.iter().any(|reason| reason["type"] == "tier_gap"));
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::context::MarketContext;
use super::domain::UnitState;
use super::policy::PricingConfig;
use super::result::{
    FloorplanPricing, LowerTierReference, PriceDelta, PricingFlags, PricingReason, PricingRun,
    ReasonKind, UnitPricingResult,
};
use super::rules::baseline::resolve_baseline;
use super::rules::clamp::{apply_clamp_chain, ClampInputs};
use super::rules::conversion::conversion_nudge;
use super::rules::terms::{price_terms, TermInputs};
use super::rules::trend::{compute_trend, TrendSignal};
use super::tiers::{bedroom_order, TierLadder};

/// Everything a batch run needs, passed by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRequest {
    pub units: Vec<UnitState>,
    #[serde(default)]
    pub config: PricingConfig,
    pub context: MarketContext,
}

/// Price a single unit.
///
/// `lower_tier` is the resolved reference of the next lower bedroom tier, if any.
pub fn price_unit(
    unit: &UnitState,
    config: &PricingConfig,
    context: &MarketContext,
    lower_tier: Option<&LowerTierReference>,
) -> UnitPricingResult {
    let config = config.sanitized();
    let trend = compute_trend(&unit.floorplan_code, context, &config);
    price_unit_with(unit, &config, context, &trend, lower_tier)
}

/// Price every unit of one floorplan against the same trend and lower tier.
pub fn price_floorplan(
    units: &[UnitState],
    config: &PricingConfig,
    context: &MarketContext,
    lower_tier: Option<&LowerTierReference>,
) -> Vec<UnitPricingResult> {
    let config = config.sanitized();
    let mut trends: BTreeMap<&str, TrendSignal> = BTreeMap::new();

    units
        .iter()
        .map(|unit| {
            let trend = trends
                .entry(unit.floorplan_code.as_str())
                .or_insert_with(|| compute_trend(&unit.floorplan_code, context, &config));
            price_unit_with(unit, &config, context, trend, lower_tier)
        })
        .collect()
}

/// Price a whole batch, threading each bedroom tier's reference rent upward.
pub fn price_all_units(request: PricingRequest) -> PricingRun {
    let PricingRequest {
        units,
        config,
        context,
    } = request;
    let config = config.sanitized();

    let mut by_floorplan: BTreeMap<&str, Vec<&UnitState>> = BTreeMap::new();
    for unit in &units {
        by_floorplan
            .entry(unit.floorplan_code.as_str())
            .or_default()
            .push(unit);
    }

    let order = bedroom_order(by_floorplan.keys().copied(), &context);
    let mut ladder = TierLadder::default();
    let mut unit_pricing = BTreeMap::new();
    let mut floorplan_pricing = BTreeMap::new();

    for tier in order {
        let Some(members) = by_floorplan.get(tier.code.as_str()) else {
            continue;
        };

        let trend = compute_trend(&tier.code, &context, &config);
        let lower_tier = ladder.lower_tier_for(tier.bedrooms);

        let results: Vec<UnitPricingResult> = members
            .iter()
            .map(|unit| price_unit_with(unit, &config, &context, &trend, lower_tier.as_ref()))
            .collect();

        let summary = summarize_floorplan(&tier.code, tier.bedrooms, &trend, lower_tier, &results);
        ladder.record(summary.as_lower_tier());
        debug!(
            floorplan = %summary.code,
            bedrooms = ?summary.bedrooms,
            units = summary.unit_count,
            max_reference_rent = summary.max_reference_rent,
            "floorplan priced"
        );
        floorplan_pricing.insert(tier.code.clone(), summary);

        for result in results {
            if unit_pricing.contains_key(&result.unit_id) {
                warn!(unit_id = %result.unit_id, "duplicate unit id in batch; keeping last");
            }
            unit_pricing.insert(result.unit_id.clone(), result);
        }
    }

    info!(
        units = unit_pricing.len(),
        floorplans = floorplan_pricing.len(),
        as_of = %context.today,
        "pricing run complete"
    );

    PricingRun {
        unit_pricing,
        floorplan_pricing,
        calculated_at: context.today,
        config_snapshot: config,
    }
}

/// Core per-unit pipeline. `config` must already be sanitized.
fn price_unit_with(
    unit: &UnitState,
    config: &PricingConfig,
    context: &MarketContext,
    trend: &TrendSignal,
    lower_tier: Option<&LowerTierReference>,
) -> UnitPricingResult {
    let mut reasons = Vec::new();
    let mut flags = PricingFlags::default();

    let unit = coerce_unit(unit, &mut reasons, &mut flags);

    if trend.available {
        reasons.extend(trend.reasons.iter().cloned());
    } else {
        flags.missing_trend = true;
        warn!(floorplan = %unit.floorplan_code, "no trend data; holding movement at zero");
        reasons.push(PricingReason::skipped(
            ReasonKind::MissingContext,
            format!(
                "no trend data for floorplan {}; movement held at zero",
                unit.floorplan_code
            ),
        ));
    }

    let nudge = conversion_nudge(trend, context.leads_apps_for(&unit.floorplan_code));
    flags.conversion_applied = nudge.applied();
    reasons.extend(nudge.reasons.iter().cloned());

    let baseline = resolve_baseline(&unit, context, config);
    flags.carry_forward_used = baseline.source.is_carry_forward();
    reasons.extend(baseline.reasons.iter().cloned());

    let floor_basis = if unit.current_rent > 0.0 {
        unit.current_rent
    } else {
        baseline.rent
    };

    let clamp = apply_clamp_chain(
        &ClampInputs {
            baseline: baseline.rent,
            direction: trend.direction,
            magnitude: trend.magnitude,
            nudge: nudge.nudge,
            floor_basis,
            lower_tier,
        },
        config,
    );
    flags.cap_clamped = clamp.cap_clamped;
    flags.floor_clamped = clamp.floor_clamped;
    flags.tier_gap_clamped = clamp.tier_gap_clamped;
    reasons.extend(clamp.reasons.iter().cloned());

    let schedule = price_terms(
        &TermInputs {
            clamped_baseline: clamp.rent,
            hard_minimum: clamp.hard_minimum,
            vacant_days: unit.vacant_days,
            available_on: unit.available_on(context.today),
        },
        config,
    );
    flags.seasonality_applied = schedule.seasonality_applied;
    flags.vacancy_discount_applied = schedule.vacancy_discount_applied;
    flags.vacancy_discount_limited = schedule.vacancy_discount_limited;
    reasons.extend(schedule.reasons.iter().cloned());

    let reference_rent = schedule
        .terms
        .iter()
        .find(|entry| entry.term == config.reference_term)
        .map(|entry| entry.price)
        .unwrap_or_else(|| clamp.rent.round());

    let previous = if unit.current_rent > 0.0 {
        unit.current_rent
    } else {
        0.0
    };

    debug!(
        unit_id = %unit.unit_id,
        baseline = baseline.rent,
        clamped = clamp.rent,
        reference_rent,
        "unit priced"
    );

    UnitPricingResult {
        unit_id: unit.unit_id.clone(),
        floorplan_code: unit.floorplan_code.clone(),
        baseline_source: baseline.source,
        baseline_rent: clamp.rent,
        reference_term: config.reference_term,
        reference_rent,
        delta: PriceDelta::between(previous, reference_rent),
        term_pricing: schedule.terms,
        reasons,
        flags,
    }
}

/// Replace non-finite or negative numerics with zero, recording each fix.
fn coerce_unit(
    unit: &UnitState,
    reasons: &mut Vec<PricingReason>,
    flags: &mut PricingFlags,
) -> UnitState {
    let mut clean = unit.clone();

    if !clean.current_rent.is_finite() || clean.current_rent < 0.0 {
        reasons.push(PricingReason::skipped(
            ReasonKind::InvalidNumeric,
            format!("current rent {} treated as absent", unit.current_rent),
        ));
        clean.current_rent = 0.0;
        flags.input_coerced = true;
    }

    if !clean.amenity_adj.is_finite() {
        reasons.push(PricingReason::skipped(
            ReasonKind::InvalidNumeric,
            format!("amenity adjustment {} treated as 0", unit.amenity_adj),
        ));
        clean.amenity_adj = 0.0;
        flags.input_coerced = true;
    }

    if clean.vacant_days < 0 {
        reasons.push(PricingReason::skipped(
            ReasonKind::InvalidNumeric,
            format!("vacant days {} treated as 0", unit.vacant_days),
        ));
        clean.vacant_days = 0;
        flags.input_coerced = true;
    }

    if flags.input_coerced {
        warn!(unit_id = %unit.unit_id, "coerced invalid numeric input");
    }

    clean
}

fn summarize_floorplan(
    code: &str,
    bedrooms: Option<u32>,
    trend: &TrendSignal,
    lower_tier: Option<LowerTierReference>,
    results: &[UnitPricingResult],
) -> FloorplanPricing {
    let count = results.len();
    let references = results.iter().map(|result| result.reference_rent);
    let min_reference_rent = references.clone().fold(f64::INFINITY, f64::min);
    let max_reference_rent = references.clone().fold(0.0, f64::max);
    let (mean_reference_rent, mean_baseline_rent) = if count == 0 {
        (0.0, 0.0)
    } else {
        (
            references.sum::<f64>() / count as f64,
            results.iter().map(|result| result.baseline_rent).sum::<f64>() / count as f64,
        )
    };

    FloorplanPricing {
        code: code.to_string(),
        bedrooms,
        unit_count: count,
        direction: trend.direction,
        magnitude: trend.magnitude,
        min_reference_rent: if count == 0 { 0.0 } else { min_reference_rent },
        mean_reference_rent,
        max_reference_rent,
        mean_baseline_rent,
        lower_tier,
        cap_clamped_units: results.iter().filter(|r| r.flags.cap_clamped).count(),
        floor_clamped_units: results.iter().filter(|r| r.flags.floor_clamped).count(),
        tier_gap_clamped_units: results.iter().filter(|r| r.flags.tier_gap_clamped).count(),
    }
}

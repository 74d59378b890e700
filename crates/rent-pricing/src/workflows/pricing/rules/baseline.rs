use super::super::context::MarketContext;
use super::super::domain::UnitState;
use super::super::policy::{PricingConfig, DEFAULT_STARTING_RENT};
use super::super::result::{BaselineSource, PricingReason, ReasonKind};
use super::{dollars, finite_positive};

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBaseline {
    pub rent: f64,
    pub source: BaselineSource,
    pub reasons: Vec<PricingReason>,
}

/// Pick the rent that movement is applied to.
///
/// Priority: unit carry-forward, current rent, floorplan carry-forward, floorplan
/// starting rent, then the default starting rent. Carry-forward figures are only
/// consulted when enabled; the floorplan figure stands in for the starting rent of
/// units with no positive current rent.
pub fn resolve_baseline(
    unit: &UnitState,
    context: &MarketContext,
    config: &PricingConfig,
) -> ResolvedBaseline {
    if config.enable_carry_forward {
        if let Some(rent) = context
            .carry_forward
            .get(&unit.unit_id)
            .and_then(|baseline| baseline.approved_rent())
        {
            return resolved(
                rent,
                BaselineSource::CarryForward,
                format!("carry-forward baseline {} for unit {}", dollars(rent), unit.unit_id),
            );
        }
    }

    if let Some(rent) = finite_positive(unit.current_rent) {
        return resolved(
            rent,
            BaselineSource::CurrentRent,
            format!("current rent {}", dollars(rent)),
        );
    }

    if config.enable_carry_forward {
        if let Some(rent) = context
            .floorplan_baselines
            .get(&unit.floorplan_code)
            .copied()
            .and_then(finite_positive)
        {
            return resolved(
                rent,
                BaselineSource::FloorplanCarryForward,
                format!(
                    "floorplan carry-forward baseline {} for {}",
                    dollars(rent),
                    unit.floorplan_code
                ),
            );
        }
    }

    let (starting, source) = match context
        .starting_rents
        .get(&unit.floorplan_code)
        .copied()
        .and_then(finite_positive)
    {
        Some(rent) => (rent, BaselineSource::StartingRent),
        None => (DEFAULT_STARTING_RENT, BaselineSource::DefaultStartingRent),
    };

    let amenity = if unit.amenity_adj.is_finite() {
        unit.amenity_adj
    } else {
        0.0
    };
    let rent = (starting + amenity).max(0.0);
    let description = if amenity != 0.0 {
        format!(
            "{} starting rent {} with amenity adjustment {:+.2}",
            unit.floorplan_code,
            dollars(starting),
            amenity
        )
    } else {
        format!("{} starting rent {}", unit.floorplan_code, dollars(starting))
    };

    resolved(rent, source, description)
}

fn resolved(rent: f64, source: BaselineSource, description: String) -> ResolvedBaseline {
    ResolvedBaseline {
        rent,
        source,
        reasons: vec![PricingReason::applied(
            ReasonKind::Baseline,
            format!("{description} (source {})", source.label()),
            Some(rent),
        )],
    }
}

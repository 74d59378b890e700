use crate::infra::JsonFileCarryForwardRepository;
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use rent_pricing::config::{load_policy, AppConfig};
use rent_pricing::error::AppError;
use rent_pricing::telemetry;
use rent_pricing::workflows::pricing::{
    price_all_units, CommunityMetrics, FloorplanTrend, LeadsApps, PriceResponse, PricingConfig,
    PricingRequest, PricingRun, PricingService, StaticDataProvider, UnitPricingResult, UnitState,
    UnitStatus,
};
use rent_pricing::workflows::rent_roll::RentRollProvider;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

#[derive(Args, Debug)]
pub(crate) struct PriceArgs {
    /// Rent roll CSV export to price
    #[arg(long)]
    pub(crate) rent_roll: PathBuf,
    /// Pricing policy JSON (defaults to PRICING_POLICY_PATH or the built-in policy)
    #[arg(long)]
    pub(crate) policy: Option<PathBuf>,
    /// Pricing date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Property identifier used for carry-forward records
    #[arg(long, default_value = "default")]
    pub(crate) property: String,
    /// Directory holding carry-forward records (defaults to CARRY_FORWARD_DIR)
    #[arg(long)]
    pub(crate) carry_forward_dir: Option<PathBuf>,
    /// Print the full run as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
    /// Persist this run's baselines for the next run
    #[arg(long)]
    pub(crate) commit: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Pricing date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the full run as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
    /// Show every reason recorded for each unit
    #[arg(long)]
    pub(crate) explain: bool,
}

pub(crate) fn run_price(args: PriceArgs) -> Result<(), AppError> {
    let PriceArgs {
        rent_roll,
        policy,
        today,
        property,
        carry_forward_dir,
        json,
        commit,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let policy = match policy {
        Some(path) => load_policy(path)?,
        None => config.pricing.policy()?,
    };
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let provider = RentRollProvider::from_path(&rent_roll, &policy, today)?;
    let skipped = provider.roll().skipped_rows;
    let request = PricingRequest::from_provider(&provider, policy);

    let run = match carry_forward_dir.or(config.pricing.carry_forward_dir) {
        Some(dir) => {
            let service = PricingService::new(Arc::new(JsonFileCarryForwardRepository::new(dir)));
            service.run(&property, request, commit)?
        }
        None => {
            if commit {
                warn!("no carry-forward directory configured; --commit ignored");
            }
            price_all_units(request)
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        println!("Pricing run for {property} ({})", rent_roll.display());
        if skipped > 0 {
            println!("Skipped {skipped} rent roll row(s) without a unit or floorplan");
        }
        render_run(&run, false);
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        json,
        explain,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let provider = sample_community(today);
    let run = price_all_units(PricingRequest::from_provider(&provider, sample_policy()));

    if json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        println!("Rent pricing demo: sample three-tier community");
        render_run(&run, explain);
    }

    Ok(())
}

fn sample_policy() -> PricingConfig {
    let mut policy = PricingConfig {
        price_response: PriceResponse::Standard,
        ..PricingConfig::default()
    };
    policy.min_gap_to_next_tier.insert("S0".to_string(), 100.0);
    policy.min_gap_to_next_tier.insert("A1".to_string(), 250.0);
    policy.vacancy_age.enabled = true;
    policy.seasonality.enabled = true;
    policy.seasonality.monthly_multipliers = [
        0.95, 0.95, 1.0, 1.02, 1.04, 1.06, 1.06, 1.04, 1.0, 0.98, 0.95, 0.95,
    ];
    policy
}

fn sample_community(today: NaiveDate) -> StaticDataProvider {
    let mut provider = StaticDataProvider::new(today);

    for (code, trending, bedrooms) in [("S0", 0.875, 0), ("A1", 0.945, 1), ("B2", 0.975, 2)] {
        provider.trends.insert(
            code.to_string(),
            FloorplanTrend {
                code: code.to_string(),
                trending_occupancy: trending,
                current_occupancy: trending,
                band_low: 0.93,
                band_high: 0.96,
                bedrooms: Some(bedrooms),
            },
        );
    }
    provider.community = Some(CommunityMetrics {
        trending_occupancy: 0.93,
        current_occupancy: 0.94,
        target: 0.95,
    });
    provider
        .leads_apps
        .insert("A1".to_string(), LeadsApps { leads: 40, apps: 14 });
    provider.starting_rents.insert("S0".to_string(), 1025.0);

    let mut vacant_studio = UnitState::new("S0-104", "S0", UnitStatus::Vacant, 0.0);
    vacant_studio.vacant_days = 52;
    vacant_studio.amenity_adj = 15.0;
    let mut renewing = UnitState::new("B2-302", "B2", UnitStatus::OnNotice, 1580.0);
    renewing.lease_end_date = Some(today + Duration::days(30));

    provider.units = vec![
        UnitState::new("S0-101", "S0", UnitStatus::Occupied, 1010.0),
        UnitState::new("S0-102", "S0", UnitStatus::Occupied, 995.0),
        vacant_studio,
        UnitState::new("A1-201", "A1", UnitStatus::Occupied, 1040.0),
        UnitState::new("A1-202", "A1", UnitStatus::Occupied, 1260.0),
        UnitState::new("B2-301", "B2", UnitStatus::Occupied, 1610.0),
        renewing,
    ];
    provider
}

fn render_run(run: &PricingRun, explain: bool) {
    println!(
        "As of {} | {} unit(s) across {} floorplan(s) | {} response",
        run.calculated_at,
        run.unit_pricing.len(),
        run.floorplan_pricing.len(),
        run.config_snapshot.price_response.label()
    );

    println!("\nFloorplans");
    for summary in run.floorplan_pricing.values() {
        let bedrooms = summary
            .bedrooms
            .map(|beds| beds.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "- {} ({} bd): {} unit(s) | move {:+.2}% | {}-term ${:.0}-${:.0} | clamped cap {} floor {} tier {}",
            summary.code,
            bedrooms,
            summary.unit_count,
            f64::from(summary.direction) * summary.magnitude * 100.0,
            run.config_snapshot.reference_term,
            summary.min_reference_rent,
            summary.max_reference_rent,
            summary.cap_clamped_units,
            summary.floor_clamped_units,
            summary.tier_gap_clamped_units
        );
    }

    println!("\nUnits");
    for result in run.unit_pricing.values() {
        println!(
            "- {} [{}] ${:.0} -> ${:.0} ({:+.1}%) | baseline {} | {}",
            result.unit_id,
            result.floorplan_code,
            result.delta.previous,
            result.reference_rent,
            result.delta.percent,
            result.baseline_source.label(),
            flag_summary(result)
        );
        if explain {
            for reason in &result.reasons {
                let marker = if reason.applied { "+" } else { " " };
                println!("    {marker} {}: {}", reason.kind.label(), reason.description);
            }
        }
    }
}

fn flag_summary(result: &UnitPricingResult) -> String {
    let flags = result.flags;
    let labels: Vec<&str> = [
        (flags.carry_forward_used, "carry-forward"),
        (flags.cap_clamped, "capped"),
        (flags.floor_clamped, "floored"),
        (flags.tier_gap_clamped, "tier-gap"),
        (flags.missing_trend, "no-trend"),
        (flags.conversion_applied, "conversion"),
        (flags.seasonality_applied, "seasonal"),
        (flags.vacancy_discount_applied, "vacancy-discount"),
        (flags.vacancy_discount_limited, "discount-limited"),
        (flags.input_coerced, "coerced"),
    ]
    .into_iter()
    .filter_map(|(set, label)| set.then_some(label))
    .collect();

    if labels.is_empty() {
        "no adjustments".to_string()
    } else {
        labels.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date")
    }

    #[test]
    fn sample_community_keeps_tier_gaps() {
        let provider = sample_community(today());
        let run = price_all_units(PricingRequest::from_provider(&provider, sample_policy()));

        let s0_max = run.floorplan_pricing["S0"].max_reference_rent;
        let a1_min = run.floorplan_pricing["A1"].min_reference_rent;
        let b2_min = run.floorplan_pricing["B2"].min_reference_rent;
        assert!(a1_min >= s0_max + 100.0);
        assert!(b2_min >= run.floorplan_pricing["A1"].max_reference_rent + 250.0);
        assert!(run.unit_pricing["A1-201"].flags.tier_gap_clamped);
        assert!(run.unit_pricing["A1-202"].flags.conversion_applied);
        assert!(run.unit_pricing["S0-104"].flags.vacancy_discount_applied);
    }

    #[test]
    fn flag_summary_lists_applied_adjustments() {
        let provider = sample_community(today());
        let run = price_all_units(PricingRequest::from_provider(&provider, sample_policy()));

        let summary = flag_summary(&run.unit_pricing["A1-201"]);
        assert!(summary.contains("tier-gap"));
        assert!(!summary.contains("no-trend"));
    }
}

//! Rule pipeline turning unit snapshots into explained multi-term quotes.
//!
//! Per unit the rules run in a fixed order: trend, conversion nudge, baseline
//! resolution, then the Cap -> Floor -> Tier-Gap clamp chain and finally the term
//! pricer. Batches are priced bedroom-ascending so each floorplan's tier-gap check
//! sees the already-resolved reference rent of the tier below.

pub mod context;
pub mod domain;
mod engine;
pub mod policy;
mod provider;
pub mod repository;
pub mod result;
pub mod router;
pub(crate) mod rules;
pub mod service;
mod tiers;

#[cfg(test)]
mod tests;

pub use context::MarketContext;
pub use domain::{
    infer_bedrooms, CarryForwardBaseline, CommunityMetrics, FloorplanTrend, LeadsApps, UnitState,
    UnitStatus,
};
pub use engine::{price_all_units, price_floorplan, price_unit, PricingRequest};
pub use policy::{
    ComfortBand, PriceResponse, PricingConfig, SeasonalityPolicy, VacancyAgePolicy,
    ABSOLUTE_MIN_RENT, DEFAULT_STARTING_RENT,
};
pub use provider::{DataProvider, StaticDataProvider};
pub use repository::{
    CarryForwardRecord, CarryForwardRepository, InMemoryCarryForwardRepository, RepositoryError,
};
pub use result::{
    BaselineSource, FloorplanPricing, LowerTierReference, PriceDelta, PricingFlags,
    PricingReason, PricingRun, ReasonKind, TermPrice, UnitPricingResult,
};
pub use router::pricing_router;
pub use rules::baseline::{resolve_baseline, ResolvedBaseline};
pub use rules::clamp::{apply_clamp_chain, ClampInputs, ClampOutcome};
pub use rules::conversion::{conversion_nudge, ConversionNudge};
pub use rules::terms::{price_terms, short_term_premium, TermInputs, TermSchedule};
pub use rules::trend::{compute_trend, response_curve, TrendSignal};
pub use service::{PricingService, PricingServiceError};
pub use tiers::{bedroom_order, bedrooms_for, FloorplanTier};

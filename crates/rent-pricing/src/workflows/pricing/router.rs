use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::context::MarketContext;
use super::domain::UnitState;
use super::engine::{price_unit, PricingRequest};
use super::policy::PricingConfig;
use super::repository::CarryForwardRepository;
use super::result::LowerTierReference;
use super::service::PricingService;

/// Body of a single-unit quote request.
#[derive(Debug, Deserialize)]
pub struct UnitQuoteRequest {
    pub unit: UnitState,
    #[serde(default)]
    pub config: PricingConfig,
    pub context: MarketContext,
    #[serde(default)]
    pub lower_tier: Option<LowerTierReference>,
}

/// Body of a property run; `commit` persists the resulting baselines.
#[derive(Debug, Deserialize)]
pub struct PropertyRunRequest {
    #[serde(flatten)]
    pub request: PricingRequest,
    #[serde(default)]
    pub commit: bool,
}

/// Router exposing unit quotes and property runs backed by a carry-forward store.
pub fn pricing_router<R>(service: Arc<PricingService<R>>) -> Router
where
    R: CarryForwardRepository + 'static,
{
    Router::new()
        .route("/api/v1/pricing/unit", post(unit_quote_handler))
        .route(
            "/api/v1/properties/:property_id/pricing",
            post(property_run_handler::<R>),
        )
        .route(
            "/api/v1/properties/:property_id/carry-forward",
            get(carry_forward_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn unit_quote_handler(Json(request): Json<UnitQuoteRequest>) -> Response {
    let UnitQuoteRequest {
        unit,
        config,
        context,
        lower_tier,
    } = request;

    let result = price_unit(&unit, &config, &context, lower_tier.as_ref());
    (StatusCode::OK, Json(result)).into_response()
}

pub(crate) async fn property_run_handler<R>(
    State(service): State<Arc<PricingService<R>>>,
    Path(property_id): Path<String>,
    Json(body): Json<PropertyRunRequest>,
) -> Response
where
    R: CarryForwardRepository + 'static,
{
    match service.run(&property_id, body.request, body.commit) {
        Ok(run) => (StatusCode::OK, Json(run)).into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::SERVICE_UNAVAILABLE, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn carry_forward_handler<R>(
    State(service): State<Arc<PricingService<R>>>,
    Path(property_id): Path<String>,
) -> Response
where
    R: CarryForwardRepository + 'static,
{
    match service.carry_forward(&property_id) {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => {
            let payload = json!({
                "property_id": property_id,
                "error": "no carry-forward baselines recorded",
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::SERVICE_UNAVAILABLE, Json(payload)).into_response()
        }
    }
}

use crate::infra::{deserialize_optional_date, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use rent_pricing::error::AppError;
use rent_pricing::workflows::pricing::{
    price_all_units, pricing_router, CarryForwardRepository, MarketContext, PricingConfig,
    PricingRequest, PricingRun, PricingService, UnitState,
};
use rent_pricing::workflows::rent_roll::{RentRollImporter, RentRollProvider};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

/// Stateless batch request: either explicit units and context or a rent roll CSV.
#[derive(Debug, Deserialize)]
pub(crate) struct PricingRunRequest {
    #[serde(default)]
    pub(crate) config: PricingConfig,
    #[serde(default)]
    pub(crate) units: Vec<UnitState>,
    #[serde(default)]
    pub(crate) context: Option<MarketContext>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) rent_roll_csv: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PricingRunResponse {
    pub(crate) data_source: PricingDataSource,
    pub(crate) calculated_at: NaiveDate,
    pub(crate) run: PricingRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PricingDataSource {
    RentRoll,
    Request,
}

pub(crate) fn with_pricing_routes<R>(service: Arc<PricingService<R>>) -> axum::Router
where
    R: CarryForwardRepository + 'static,
{
    pricing_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/pricing/run",
            axum::routing::post(pricing_run_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn pricing_run_endpoint(
    Json(payload): Json<PricingRunRequest>,
) -> Result<Json<PricingRunResponse>, AppError> {
    let PricingRunRequest {
        config,
        units,
        context,
        today,
        rent_roll_csv,
    } = payload;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let (request, data_source) = if let Some(csv) = rent_roll_csv {
        let roll = RentRollImporter::from_reader(Cursor::new(csv.into_bytes()))?;
        let provider = RentRollProvider::new(roll, &config, today);
        (
            PricingRequest::from_provider(&provider, config),
            PricingDataSource::RentRoll,
        )
    } else {
        let context = context.unwrap_or_else(|| MarketContext::new(today));
        (
            PricingRequest {
                units,
                config,
                context,
            },
            PricingDataSource::Request,
        )
    };

    let run = price_all_units(request);
    Ok(Json(PricingRunResponse {
        data_source,
        calculated_at: run.calculated_at,
        run,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use rent_pricing::workflows::pricing::{InMemoryCarryForwardRepository, UnitStatus};
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    const RENT_ROLL: &str = "Unit,Floor Plan,Status,Rent\n\
101,A1,Occupied,\"$1,000.00\"\n\
102,A1,Occupied,\"$1,020.00\"\n\
103,A1,Vacant-Unrented,\n";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date")
    }

    #[tokio::test]
    async fn pricing_run_endpoint_prices_a_rent_roll() {
        let request = PricingRunRequest {
            config: PricingConfig::default(),
            units: Vec::new(),
            context: None,
            today: Some(today()),
            rent_roll_csv: Some(RENT_ROLL.to_string()),
        };

        let Json(body) = pricing_run_endpoint(Json(request))
            .await
            .expect("run succeeds");

        assert_eq!(body.data_source, PricingDataSource::RentRoll);
        assert_eq!(body.calculated_at, today());
        assert_eq!(body.run.unit_pricing.len(), 3);
        assert_eq!(body.run.floorplan_pricing["A1"].direction, -1);
    }

    #[tokio::test]
    async fn pricing_run_endpoint_accepts_explicit_units() {
        let request = PricingRunRequest {
            config: PricingConfig::default(),
            units: vec![UnitState::new("101", "S0", UnitStatus::Occupied, 990.0)],
            context: None,
            today: Some(today()),
            rent_roll_csv: None,
        };

        let Json(body) = pricing_run_endpoint(Json(request))
            .await
            .expect("run succeeds");

        assert_eq!(body.data_source, PricingDataSource::Request);
        let result = &body.run.unit_pricing["101"];
        assert!(result.flags.missing_trend);
        assert_eq!(result.reference_rent, 990.0);
    }

    #[tokio::test]
    async fn pricing_run_endpoint_rejects_rent_roll_without_floorplans() {
        let request = PricingRunRequest {
            config: PricingConfig::default(),
            units: Vec::new(),
            context: None,
            today: Some(today()),
            rent_roll_csv: Some("Unit,Rent\n101,1000\n".to_string()),
        };

        let error = pricing_run_endpoint(Json(request))
            .await
            .expect_err("missing floorplan column");

        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn readiness_reflects_startup_flag() {
        let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle();
        let readiness = Arc::new(AtomicBool::new(false));
        let state = AppState {
            readiness: readiness.clone(),
            metrics: Arc::new(handle),
        };
        let app = with_pricing_routes(Arc::new(PricingService::new(Arc::new(
            InMemoryCarryForwardRepository::default(),
        ))))
        .layer(Extension(state));

        let response = app
            .clone()
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        readiness.store(true, std::sync::atomic::Ordering::Release);
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
    }
}

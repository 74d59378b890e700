use chrono::NaiveDate;

use crate::workflows::pricing::{
    CarryForwardBaseline, CommunityMetrics, FloorplanTrend, MarketContext, PricingConfig,
    UnitState, UnitStatus,
};

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date")
}

pub(super) fn trend(code: &str, trending: f64, bedrooms: u32) -> FloorplanTrend {
    FloorplanTrend {
        code: code.to_string(),
        trending_occupancy: trending,
        current_occupancy: trending,
        band_low: 0.93,
        band_high: 0.96,
        bedrooms: Some(bedrooms),
    }
}

pub(super) fn context_with(trends: &[FloorplanTrend]) -> MarketContext {
    trends
        .iter()
        .cloned()
        .fold(MarketContext::new(today()), MarketContext::with_trend)
}

pub(super) fn on_target_community() -> CommunityMetrics {
    CommunityMetrics {
        trending_occupancy: 0.95,
        current_occupancy: 0.95,
        target: 0.95,
    }
}

pub(super) fn occupied(unit_id: &str, floorplan: &str, rent: f64) -> UnitState {
    UnitState::new(unit_id, floorplan, UnitStatus::Occupied, rent)
}

pub(super) fn vacant(unit_id: &str, floorplan: &str, rent: f64, days: i64) -> UnitState {
    let mut unit = UnitState::new(unit_id, floorplan, UnitStatus::Vacant, rent);
    unit.vacant_days = days;
    unit
}

pub(super) fn carry_forward(unit_id: &str, floorplan: &str, rent: f64) -> CarryForwardBaseline {
    CarryForwardBaseline {
        unit_id: unit_id.to_string(),
        floorplan_code: floorplan.to_string(),
        prior_approved_rent: Some(rent),
        prior_approved_date: Some(today()),
        term: Some(12),
    }
}

pub(super) fn config() -> PricingConfig {
    PricingConfig::default()
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

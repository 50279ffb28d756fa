//! Scenario endpoints and the dashboard joint fetch against an in-process backend.

mod common;

use growthcanvas_core::auth::{SessionKey, SessionStore};
use growthcanvas_core::models::{GrowthParameters, ScenarioInput, ScenarioRef};
use growthcanvas_core::{ApiError, LoadTracker, ScenarioDashboard};
use reqwest::StatusCode;

use common::{INITIAL_ACCESS, INITIAL_REFRESH};

async fn logged_in() -> (
    std::sync::Arc<common::Backend>,
    growthcanvas_core::ApiClient,
) {
    let (backend, api, store) = common::setup().await;
    store.set(SessionKey::AccessToken, INITIAL_ACCESS).unwrap();
    store.set(SessionKey::RefreshToken, INITIAL_REFRESH).unwrap();
    (backend, api)
}

#[tokio::test]
async fn test_dashboard_loads_financials_and_staff() {
    let (_backend, api) = logged_in().await;

    let dashboard = ScenarioDashboard::load(&api, ScenarioRef::Id(1)).await.unwrap();
    assert_eq!(dashboard.financials.len(), 2);
    assert_eq!(dashboard.staff.len(), 2);
    assert!(!dashboard.is_empty());

    let metrics = dashboard.metrics();
    assert_eq!(metrics.total_revenue, 2_000_000.0);
    assert_eq!(metrics.final_client_count, 380.0);
    assert_eq!(metrics.final_staff_count, 11.0);
}

#[tokio::test]
async fn test_dashboard_uses_default_scenario_routes() {
    let (_backend, api) = logged_in().await;

    let dashboard = ScenarioDashboard::load(&api, ScenarioRef::Default).await.unwrap();
    assert_eq!(dashboard.financials.len(), 2);
    assert_eq!(dashboard.staff.len(), 1);
}

#[tokio::test]
async fn test_dashboard_fails_as_a_whole_when_staff_fails() {
    let (_backend, api) = logged_in().await;

    let err = ScenarioDashboard::load(&api, ScenarioRef::Id(2)).await.unwrap_err();
    match err {
        ApiError::ServerError(message) => assert_eq!(message, "Staffing model failed"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_superseded_dashboard_load_is_discarded() {
    let (_backend, api) = logged_in().await;
    let tracker = LoadTracker::new();
    let mut shown = None;

    let first = tracker.begin();
    let first_result = ScenarioDashboard::load(&api, ScenarioRef::Id(1)).await.unwrap();
    let second = tracker.begin();
    let second_result = ScenarioDashboard::load(&api, ScenarioRef::Default).await.unwrap();

    assert!(tracker.commit(second, &mut shown, second_result));
    assert!(!tracker.commit(first, &mut shown, first_result));
    assert_eq!(shown.map(|d| d.staff.len()), Some(1));
}

#[tokio::test]
async fn test_create_scenario_and_validation_detail() {
    let (_backend, api) = logged_in().await;

    let created = api
        .create_scenario(&ScenarioInput {
            name: "Conservative".to_string(),
            description: Some("Slow hiring".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(created.id, 10);
    assert_eq!(created.name, "Conservative");

    let err = api.create_scenario(&ScenarioInput::default()).await.unwrap_err();
    match err {
        ApiError::Rejected { status, message } => {
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(message, "field required");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_missing_scenario_is_not_found() {
    let (_backend, api) = logged_in().await;

    api.delete_scenario(1).await.unwrap();
    let err = api.delete_scenario(99).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(ref m) if m == "Scenario not found"));
    assert_eq!(err.user_message(), "Scenario not found");
}

#[tokio::test]
async fn test_parameter_update_reports_backend_message() {
    let (_backend, api) = logged_in().await;

    let update = api
        .update_parameters(ScenarioRef::Id(1), &GrowthParameters::default())
        .await
        .unwrap();
    assert!(update.is_success());
    assert_eq!(update.yearly_summary.map(|rows| rows.len()), Some(2));

    let params = GrowthParameters {
        subscription_price: -1.0,
        ..Default::default()
    };
    let err = api.update_parameters(ScenarioRef::Id(1), &params).await.unwrap_err();
    assert_eq!(err.user_message(), "subscription_price must be non-negative");
}

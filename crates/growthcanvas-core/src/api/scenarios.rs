//! Scenario management and forecast endpoints.
//!
//! Forecast getters take a [`ScenarioRef`]; `ScenarioRef::Default` maps to
//! the backend's default-scenario routes under `/api`.

use tracing::{debug, info};

use crate::models::{
    GrowthParameters, MonthlyExpenses, MonthlyFinancials, ParameterUpdate, Scenario, ScenarioId,
    ScenarioInput, ScenarioRef, ScenarioUpdate, YearlyFinancials, YearlyStaff,
};

use super::request::ApiRequest;
use super::{ApiClient, ApiError};

const SCENARIOS_PATH: &str = "/api/scenarios";

fn scenario_path(id: ScenarioId) -> String {
    format!("{}/{}", SCENARIOS_PATH, id)
}

impl ApiClient {
    // ===== Scenario CRUD =====

    pub async fn list_scenarios(&self) -> Result<Vec<Scenario>, ApiError> {
        let scenarios: Vec<Scenario> = self.fetch(ApiRequest::get(SCENARIOS_PATH)).await?;
        debug!(count = scenarios.len(), "Scenarios fetched");
        Ok(scenarios)
    }

    pub async fn get_scenario(&self, id: ScenarioId) -> Result<Scenario, ApiError> {
        self.fetch(ApiRequest::get(scenario_path(id))).await
    }

    pub async fn create_scenario(&self, input: &ScenarioInput) -> Result<Scenario, ApiError> {
        let scenario: Scenario = self
            .fetch(ApiRequest::post(SCENARIOS_PATH).json(input)?)
            .await?;
        info!(id = scenario.id, name = %scenario.name, "Scenario created");
        Ok(scenario)
    }

    pub async fn update_scenario(
        &self,
        id: ScenarioId,
        update: &ScenarioUpdate,
    ) -> Result<Scenario, ApiError> {
        self.fetch(ApiRequest::put(scenario_path(id)).json(update)?)
            .await
    }

    pub async fn delete_scenario(&self, id: ScenarioId) -> Result<(), ApiError> {
        self.execute(ApiRequest::delete(scenario_path(id))).await?;
        info!(id, "Scenario deleted");
        Ok(())
    }

    pub async fn set_default_scenario(&self, id: ScenarioId) -> Result<(), ApiError> {
        self.execute(ApiRequest::put(format!("{}/set-default", scenario_path(id))))
            .await
    }

    /// Copy a scenario. Without `input` the backend picks the copy's name.
    pub async fn duplicate_scenario(
        &self,
        id: ScenarioId,
        input: Option<&ScenarioInput>,
    ) -> Result<Scenario, ApiError> {
        let path = format!("{}/duplicate", scenario_path(id));
        let request = match input {
            Some(input) => ApiRequest::post(path).json(input)?,
            None => ApiRequest::post(path).json(&serde_json::json!({}))?,
        };
        let scenario: Scenario = self.fetch(request).await?;
        info!(source = id, id = scenario.id, "Scenario duplicated");
        Ok(scenario)
    }

    // ===== Parameters =====

    pub async fn parameters(&self, scenario: ScenarioRef) -> Result<GrowthParameters, ApiError> {
        self.fetch(ApiRequest::get(format!("{}/parameters", scenario.base_path())))
            .await
    }

    /// Submit new parameters. The backend re-runs the forecast and may return
    /// the new yearly summary; an in-band `status: "error"` is not an `Err`.
    pub async fn update_parameters(
        &self,
        scenario: ScenarioRef,
        params: &GrowthParameters,
    ) -> Result<ParameterUpdate, ApiError> {
        let path = format!("{}/parameters/update", scenario.base_path());
        self.fetch(ApiRequest::post(path).json(params)?).await
    }

    // ===== Forecast Data =====

    pub async fn yearly_financials(
        &self,
        scenario: ScenarioRef,
    ) -> Result<Vec<YearlyFinancials>, ApiError> {
        self.fetch(ApiRequest::get(format!("{}/financials/yearly", scenario.base_path())))
            .await
    }

    pub async fn monthly_financials(
        &self,
        scenario: ScenarioRef,
    ) -> Result<Vec<MonthlyFinancials>, ApiError> {
        self.fetch(ApiRequest::get(format!("{}/financials/monthly", scenario.base_path())))
            .await
    }

    pub async fn yearly_staff(&self, scenario: ScenarioRef) -> Result<Vec<YearlyStaff>, ApiError> {
        self.fetch(ApiRequest::get(format!("{}/staff/yearly", scenario.base_path())))
            .await
    }

    pub async fn monthly_expenses(
        &self,
        scenario: ScenarioRef,
    ) -> Result<Vec<MonthlyExpenses>, ApiError> {
        self.fetch(ApiRequest::get(format!(
            "{}/expense-breakdown/monthly",
            scenario.base_path()
        )))
        .await
    }
}

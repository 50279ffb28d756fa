//! Data models exchanged with the forecasting backend.
//!
//! This module contains:
//!
//! - `UserProfile`, `NewUser`, `OAuthProvider`: account types
//! - `Scenario`, `ScenarioInput`, `ScenarioUpdate`, `ScenarioRef`: scenario management
//! - `GrowthParameters`, `ParameterUpdate`: model inputs and update results
//! - `YearlyFinancials`, `MonthlyFinancials`, `YearlyStaff`, `MonthlyExpenses`: projections

pub mod forecast;
pub mod parameters;
pub mod scenario;
pub mod user;

pub use forecast::{
    expense_years, expenses_for_year, within_horizon, MonthlyExpenses, MonthlyFinancials,
    YearlyFinancials, YearlyStaff, PROJECTION_HORIZON_YEAR,
};
pub use parameters::{GrowthParameters, ParameterUpdate};
pub use scenario::{select_scenario, Scenario, ScenarioId, ScenarioInput, ScenarioRef, ScenarioUpdate};
pub use user::{NewUser, OAuthProvider, UserProfile};

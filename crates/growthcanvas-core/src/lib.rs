//! Client library for the GrowthCanvas forecasting service.
//!
//! The backend owns the forecasting model; this crate authenticates against
//! it, manages scenarios and their parameters, and fetches the resulting
//! projections.
//!
//! - `api`: `ApiClient`, the authenticated HTTP client with transparent
//!   token refresh, plus typed endpoints
//! - `auth`: credentials and the session stores they are kept in
//! - `models`: request/response types
//! - `dashboard`: joint financials + staffing fetch for a scenario
//! - `config`: persisted client settings

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, ApiRequest};
pub use auth::{Credential, Session, SessionStore};
pub use config::Config;
pub use dashboard::{DashboardMetrics, LoadTracker, ScenarioDashboard};

//! REST API client module for the forecasting backend.
//!
//! This module provides the `ApiClient` for authenticating and for managing
//! scenarios and fetching their projections.
//!
//! The API uses bearer token authentication. Access tokens are refreshed
//! transparently with the stored refresh token when the backend answers 401.

pub mod auth;
pub mod client;
pub mod error;
pub mod request;
pub mod retry;
pub mod scenarios;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use request::{ApiRequest, RequestBody, LOGIN_PATH, REFRESH_PATH};

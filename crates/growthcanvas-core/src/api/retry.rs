//! When a failed call earns a token refresh and a resend.

use reqwest::StatusCode;

use super::request::ApiRequest;

/// First transmission plus at most one resend after a refresh.
pub const MAX_ATTEMPTS: u32 = 2;

/// `attempt` is 1-based: the first transmission of a request is attempt 1.
pub fn should_refresh(status: StatusCode, request: &ApiRequest, attempt: u32) -> bool {
    status == StatusCode::UNAUTHORIZED && !request.is_login() && attempt < MAX_ATTEMPTS
}

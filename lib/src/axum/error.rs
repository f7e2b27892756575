use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::Json;
use http::header::SET_COOKIE;
use http::StatusCode;
use serde_json::json;

use crate::{Error, ErrorKind};

/// Implements conversion into an http response for all possible error
/// variants.
///
/// # Error message stripping
///
/// Backtrace and additional context information (e.g. profile
/// information) are never part of the response and always only available
/// through the application logs.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self.kind {
            ErrorKind::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            )
                .into_response(),
            ErrorKind::Forbidden => StatusCode::FORBIDDEN.into_response(),
            ErrorKind::SubscriptionInactive => {
                tracing::debug!("{}", self.to_string());
                (
                    StatusCode::FORBIDDEN,
                    Json(json!({ "error": "Subscription inactive" })),
                )
                    .into_response()
            }
            ErrorKind::ProfileIncomplete(_) => {
                tracing::debug!("{}", self.to_string());
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Profile not set up" })),
                )
                    .into_response()
            }
            ErrorKind::ProfileNotFound(_) => {
                tracing::debug!("{}", self.to_string());
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": "Unauthorized" })),
                )
                    .into_response()
            }
            ErrorKind::FailedGettingSessionCookie(target_url) => {
                tracing::debug!("{}", self.to_string());
                // Save redirection target to a cookie so that we can perform
                // the final redirection after successful login
                (
                    AppendHeaders([(
                        SET_COOKIE,
                        format!("next={};SameSite=Lax;Secure;Path=/", target_url),
                    )]),
                    Redirect::to(crate::routes::LOGIN),
                )
                    .into_response()
            }
            ErrorKind::BadInput(e) => {
                tracing::trace!("{}", self.to_string());
                (StatusCode::BAD_REQUEST, Json(json!({ "error": e }))).into_response()
            }
            ErrorKind::NotFound(_) => {
                tracing::trace!("{}", self.to_string());
                (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
            }
            _ => {
                tracing::error!("{}", self.to_string());
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal error" })),
                )
                    .into_response()
            }
        }
    }
}

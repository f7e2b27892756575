use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json};
use http::header::AUTHORIZATION;
use http::HeaderMap;
use serde_json::json;

use crate::digest::DailyDigest;
use crate::error::ErrorKind;
use crate::{routes, Result};

use super::{ConfigExt, DbExt, GeneratorExt, MailerExt, Router};

pub fn router() -> Router {
    Router::new().route(routes::CRON_DAILY, get(daily))
}

/// Trigger endpoint for the daily digest, meant to be called by an
/// external cron service once per day.
///
/// Gated by a shared-secret bearer token; any mismatch is rejected before
/// a single subscriber is looked at.
pub async fn daily(
    headers: HeaderMap,
    Extension(config): ConfigExt,
    Extension(db): DbExt,
    Extension(generator): GeneratorExt,
    Extension(mailer): MailerExt,
) -> Result<impl IntoResponse> {
    let expected = format!("Bearer {}", config.digest.secret);
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value == expected)
        .unwrap_or(false);
    if !authorized {
        return Err(ErrorKind::Unauthorized.into());
    }

    let digest = DailyDigest::from_config(&config, (*db).clone(), generator, mailer);

    let summary = digest.run().await?;

    if summary.total == 0 {
        return Ok(Json(json!({
            "message": "No active subscribers",
            "sent": 0,
        })));
    }

    let mut body = serde_json::to_value(summary)?;
    body["message"] = json!("Daily ideas sent");
    Ok(Json(body))
}

use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Extension, Json};
use serde_json::json;
use validator::ValidateEmail;

use crate::error::ErrorKind;
use crate::waitlist::Entry;
use crate::{routes, Result};

use super::{DbExt, Router};

pub fn router() -> Router {
    Router::new().route(routes::API_WAITLIST, post(join))
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct JoinForm {
    pub email: String,
}

/// Adds an email address to the pre-launch waitlist. Joining twice is not
/// an error, the caller just gets told they're already on it.
pub async fn join(Extension(db): DbExt, Json(form): Json<JoinForm>) -> Result<impl IntoResponse> {
    if !form.email.validate_email() {
        return Err(ErrorKind::BadInput("Invalid email".to_string()).into());
    }

    let entry = Entry::new(&form.email);

    if db
        .get_collection::<Entry>()?
        .iter()
        .any(|e| e.email == entry.email)
    {
        return Ok(Json(json!({ "message": "Already on waitlist" })));
    }

    db.set(&entry)?;

    Ok(Json(json!({ "message": "Added to waitlist" })))
}

use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Extension, Json};

use crate::error::ErrorKind;
use crate::idea::Idea;
use crate::profile::{Profile, Status};
use crate::{routes, Result};

use super::{extract, DbExt, GeneratorExt, Router};

pub fn router() -> Router {
    Router::new().route(routes::API_GENERATE, post(generate))
}

/// Interactive idea generation for the authenticated creator. Same
/// pipeline as the digest, minus the email: generate, store, count.
pub async fn generate(
    user: extract::User,
    Extension(db): DbExt,
    Extension(generator): GeneratorExt,
) -> Result<impl IntoResponse> {
    let profile: Profile = user.into();

    if profile.niche.is_empty() {
        return Err(ErrorKind::ProfileIncomplete("niche not set".to_string()).into());
    }
    if !matches!(
        profile.subscription.status,
        Status::Active | Status::Trialing
    ) {
        return Err(ErrorKind::SubscriptionInactive.into());
    }

    let draft = generator.generate(&profile).await?;

    let idea = Idea::from_draft(profile.id, draft, false);
    db.set(&idea)?;

    let mut profile = db.get::<Profile>(profile.id)?;
    profile.ideas_generated += 1;
    db.set(&profile)?;

    Ok(Json(idea))
}

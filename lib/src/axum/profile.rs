use axum::extract::Path;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Extension, Json};
use uuid::Uuid;

use crate::error::ErrorKind;
use crate::idea::{self, Idea};
use crate::profile::{Platform, Profile};
use crate::{routes, Result};

use super::{extract, DbExt, MailerExt, Router};

pub fn router() -> Router {
    Router::new()
        .route(routes::API_PROFILE, put(update))
        .route(routes::API_IDEAS, get(ideas))
        .route(routes::API_IDEA_STATUS, post(idea_status))
}

/// Profile wizard payload. Billing state is deliberately absent, it's
/// only ever mutated through the payment flow.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProfileForm {
    pub display_name: String,
    pub niche: String,
    pub platforms: Vec<Platform>,
    pub tone: String,
    pub goal: String,
    pub audience: String,
    pub recent_topics: String,
}

/// Applies the profile wizard to the caller's profile.
pub async fn update(
    user: extract::User,
    Extension(db): DbExt,
    Extension(mailer): MailerExt,
    Json(form): Json<ProfileForm>,
) -> Result<impl IntoResponse> {
    let mut profile: Profile = user.into();

    let first_setup = profile.niche.is_empty() && !form.niche.is_empty();

    profile.display_name = form.display_name;
    profile.niche = form.niche;
    profile.platforms = form.platforms;
    profile.tone = form.tone;
    profile.goal = form.goal;
    profile.audience = form.audience;
    profile.recent_topics = form.recent_topics;

    db.set(&profile)?;

    // First completed setup gets the welcome message announcing tomorrow's
    // idea. Later edits don't.
    if first_setup {
        mailer
            .send_welcome(&profile.email, profile.salutation())
            .await?;
    }

    Ok(Json(profile))
}

/// Lists the caller's ideas, newest first.
pub async fn ideas(user: extract::User, Extension(db): DbExt) -> Result<impl IntoResponse> {
    let mut ideas: Vec<Idea> = db
        .get_collection::<Idea>()?
        .into_iter()
        .filter(|i| i.owner == user.id)
        .collect();
    ideas.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(ideas))
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct IdeaStatusForm {
    pub status: idea::Status,
}

/// Marks one of the caller's ideas as used/saved/skipped.
pub async fn idea_status(
    user: extract::User,
    Extension(db): DbExt,
    Path(idea_id): Path<Uuid>,
    Json(form): Json<IdeaStatusForm>,
) -> Result<impl IntoResponse> {
    let mut idea = db
        .get::<Idea>(idea_id)
        .map_err(|_| ErrorKind::NotFound(format!("idea {}", idea_id)))?;
    if idea.owner != user.id {
        return Err(ErrorKind::Forbidden.into());
    }

    idea.status = form.status;
    db.set(&idea)?;

    Ok(Json(idea))
}

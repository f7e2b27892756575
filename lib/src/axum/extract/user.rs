use std::ops::{Deref, DerefMut};
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::{async_trait, RequestPartsExt};
use axum_extra::extract::cookie::Key as CookieKey;
use axum_extra::extract::PrivateCookieJar;
use log::debug;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{Error, ErrorKind};
use crate::profile::Profile;
use crate::Config;

/// Name of the private session cookie carrying the profile id. The cookie
/// is issued by the identity layer sitting in front of the application.
pub const SESSION_COOKIE: &str = "user_id";

/// Extractor providing the creator profile of the authenticated caller.
///
/// Wrap in `Option` to make authentication optional for a route.
#[derive(Default, Clone, Debug, Deserialize, Serialize)]
pub struct User(pub Profile);

impl Deref for User {
    type Target = Profile;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for User {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Profile> for User {
    fn from(p: Profile) -> Self {
        Self(p)
    }
}

impl From<User> for Profile {
    fn from(u: User) -> Self {
        u.0
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for User
where
    CookieKey: FromRef<S>,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let db = parts
            .extensions
            .get::<Arc<Database>>()
            .expect("database extension unavailable")
            .clone();
        let config = parts
            .extensions
            .get::<Arc<Config>>()
            .expect("config extension unavailable")
            .clone();

        // autologin functionality for faster development, can be set in config
        if config.dev.enabled {
            if let Some(autologin_email) = &config.dev.autologin {
                debug!("attempting autologin, uri: {}", parts.uri);
                let profiles = db.get_collection::<Profile>()?;
                if let Some(profile) = profiles.into_iter().find(|p| &p.email == autologin_email) {
                    return Ok(User(profile));
                } else {
                    return Err(ErrorKind::ProfileNotFound(format!(
                        "autologin: provided email that doesn't exist: {}",
                        autologin_email
                    ))
                    .into());
                }
            }
        }

        let jar: PrivateCookieJar = parts
            .extract_with_state::<PrivateCookieJar, S>(state)
            .await
            .map_err(|_| Error::new(ErrorKind::Unexpected))?;

        let cookie = jar
            .get(SESSION_COOKIE)
            .ok_or_else(|| ErrorKind::FailedGettingSessionCookie(parts.uri.clone()))?;

        let id = Uuid::from_str(cookie.value())?;

        let profile = db
            .get::<Profile>(id)
            .map_err(|_| ErrorKind::ProfileNotFound(id.to_string()))?;

        Ok(User(profile))
    }
}

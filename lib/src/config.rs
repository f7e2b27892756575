use std::net::SocketAddr;

use serde::de::DeserializeOwned;

use crate::{profile::Plan, Result};

pub static CONFIG_FILE: &'static str = "contentai.toml";

/// Application configuration. Defines all the aspects of the application
/// that are to be handled on the `contentai` level.
///
/// # Sensible defaults
///
/// Configuration provided through `Config::default()` allows for quick setup
/// of an application using the recommended workflow. Secrets (cron token,
/// generation API key, SMTP password, stripe keys) are expected to come from
/// `secret.contentai.toml` or the environment.
///
/// Using the *struct update syntax* one can initialize a new `Config`, making
/// a few changes right in the definition.
///
/// ```ignore
/// let cfg = Config {
///     digest: Digest {
///         pace_ms: 0,
///         ..Default::default()
///     },
///     ..Default::default()
/// }
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub name: String,
    pub version: String,

    /// Domain name pointing to the machine running the application. Used
    /// when building links embedded in outgoing emails.
    pub domain: String,
    /// Address on which to serve the application. Defaults to
    /// `127.0.0.1:8080`.
    pub address: SocketAddr,

    pub assets: Assets,
    pub tracing: Tracing,

    /// Settings for the daily digest job.
    pub digest: Digest,
    /// Settings for the idea generation client.
    pub generation: Generation,

    pub email: Email,

    pub payments: Payments,

    /// Information about the company behind the application.
    pub company: Company,

    /// List of available subscription plans.
    pub plans: Vec<Plan>,
    /// List of initial creator profiles.
    pub users: Vec<crate::Profile>,

    /// Development mode configuration.
    pub dev: DevMode,

    pub init: Init,
    /// Selectively enable/disable pre-made routes
    pub routes: Routes,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            domain: "localhost".to_string(),
            address: "127.0.0.1:8080".parse().unwrap(),
            assets: Assets::default(),
            tracing: Tracing::default(),
            digest: Digest::default(),
            generation: Generation::default(),
            email: Email::default(),
            payments: Payments::default(),
            company: Company::default(),
            plans: Plan::standard(),
            users: vec![],
            dev: DevMode::default(),
            init: Init::default(),
            routes: Routes::default(),
        }
    }
}

/// Loads application config from toml file at default location.
pub fn load<T: DeserializeOwned>() -> Result<T> {
    load_from(CONFIG_FILE)
}

/// Loads application config from toml file at standard path using provided
/// name.
///
/// For example for `name` == `contentai.toml` we will load both
/// `contentai.toml` and `secret.contentai.toml` from the main project
/// directory.
pub fn load_from<T: DeserializeOwned>(name: impl AsRef<str>) -> Result<T> {
    let config = config::Config::builder()
        .add_source(config::File::with_name(name.as_ref()))
        .add_source(config::File::with_name(&format!("secret.{}", name.as_ref())).required(false))
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix_separator("__"),
        )
        .build()?;

    let config: T = config.try_deserialize()?;

    Ok(config)
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Assets {
    /// Flag for enabling the asset serving service, serving assets from
    /// filesystem directory based on provided path.
    pub serve: bool,
    /// Path to the assets directory to be accessed at runtime. Defaults to
    /// `./assets`. Note that the path here is relative to current working
    /// directory.
    pub path: String,
}

impl Default for Assets {
    fn default() -> Self {
        Self {
            serve: true,
            path: "assets".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Tracing {
    pub enabled: bool,

    pub mode: crate::tracing::Mode,
    pub level: crate::tracing::Level,

    pub loki_address: String,
    pub loki_token: String,
}

impl Default for Tracing {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: crate::tracing::Mode::default(),
            level: crate::tracing::Level::default(),
            loki_address: "".to_string(),
            loki_token: "".to_string(),
        }
    }
}

/// Daily digest job configuration.
///
/// The digest endpoint is meant to be hit by an external scheduler (e.g.
/// a cron service) once per day. The job itself doesn't track schedule
/// state.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Digest {
    /// Shared secret expected as a bearer token on the trigger request.
    pub secret: String,

    /// Fixed delay inserted after each subscriber's pipeline, in
    /// milliseconds. Keeps us under the generation and email providers'
    /// rate limits. Set to 0 to disable pacing.
    pub pace_ms: u64,

    /// When enabled, subscribers that already received an emailed idea
    /// on the current UTC day are skipped. Off by default: the job
    /// trusts the scheduler to run exactly once per day, and re-running
    /// it produces a second idea per subscriber.
    pub skip_already_emailed: bool,
}

impl Default for Digest {
    fn default() -> Self {
        Self {
            secret: "".to_string(),
            pace_ms: 200,
            skip_already_emailed: false,
        }
    }
}

/// Idea generation client configuration.
///
/// The client speaks the OpenAI-compatible chat completions protocol, so
/// `api_base` can point at any provider exposing it.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Generation {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for Generation {
    fn default() -> Self {
        Self {
            api_base: "https://api.x.ai/v1".to_string(),
            api_key: "".to_string(),
            model: "grok-3".to_string(),
            temperature: 0.9,
            max_tokens: 1000,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Email {
    /// Address that the application will use to send emails to
    /// subscribers.
    pub address: String,

    // Smtp server and credentials.
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: String,

    // Standard message overrides. The tuples are made out of subject,
    // plain body and html body, in that order.
    pub welcome: Option<(String, String, String)>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Payments {
    pub stripe: Stripe,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Stripe {
    /// Production secret, used with release builds
    pub secret: String,
    /// Test secret, used with debug builds
    pub test_secret: String,

    /// Production signing secret for verifing incoming webhook events
    pub signing_secret: String,
    /// Test signing secret for verifing incoming webhook events
    pub test_signing_secret: String,
}

/// NOTE: make sure to disable on production.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DevMode {
    /// Global switch for all dev mode items.
    pub enabled: bool,
    /// Automatic login flag. Includes the email of the profile to be
    /// logged in.
    pub autologin: Option<String>,
    /// Mocking flag for all the mocking behavior performed by this library.
    pub mock: bool,
    /// Regenerative mocking behavior controls whether to regenerate mocks
    /// that are already present in the database.
    pub mock_regen: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Init {
    pub enabled: bool,
}

impl Default for Init {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Routes {
    pub enable: Vec<String>,
    pub disable: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Company {
    pub name: String,
    pub tax_id: String,
    pub country: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.digest.pace_ms, 200);
        assert!(!config.digest.skip_already_emailed);
        assert_eq!(config.generation.model, "grok-3");
        assert_eq!(config.plans.len(), 3);
    }
}

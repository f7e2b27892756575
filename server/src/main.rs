//! ContentAI application server.
//!
//! Loads configuration from `contentai.toml` (plus `secret.contentai.toml`
//! and the environment), attaches the pre-made contentai routes and serves
//! the application.

use contentai::{config, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config: Config = config::load()?;

    let router = contentai::axum::Router::new();
    let router = contentai::axum::router(router, &config);

    contentai::axum::start(router, config).await?;

    Ok(())
}

//! Log subscriber setup.
//!
//! The subscriber is assembled from the `[tracing]` config section: a
//! verbosity [`Level`] translated into an env filter, and an output
//! [`Mode`] picking between human-readable terminal output, plain json
//! lines and json shipped to a loki instance.

use tracing_subscriber::field::MakeExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};
use yansi::Paint;

use crate::error::{ErrorKind, Result};
use crate::Config;

/// Log output mode.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub enum Mode {
    /// Json log lines shipped to loki, for deployed instances.
    Production,
    /// Colored terminal output.
    #[default]
    Formatted,
    /// Json log lines on stdout.
    Json,
}

/// Operator-facing verbosity levels, mapped onto env filter directives.
#[derive(PartialEq, Eq, Default, Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Errors and warnings only.
    Critical,
    /// Errors, warnings and the informational messages that matter when
    /// troubleshooting, such as configuration.
    Support,
    /// Everything except debug and trace output.
    #[default]
    Normal,
    /// Includes debug output.
    Debug,
    /// Everything, including per-request noise from the http and db
    /// internals.
    Trace,
    /// Nothing at all.
    Off,
}

impl Level {
    /// The env filter for this level. Chatty dependencies are capped so
    /// that raising the application verbosity doesn't drown it in
    /// connection-pool internals.
    pub fn filter(self) -> EnvFilter {
        let directives = match self {
            Level::Critical | Level::Support => "warn,rustls=off",
            Level::Normal => "info,rustls=off",
            Level::Debug => "debug,sled=info,hyper=info,reqwest=info",
            Level::Trace => "trace,sled=info,hyper=debug,mio=debug,want=off",
            Level::Off => "off",
        };

        EnvFilter::try_new(directives).expect("level directives must parse")
    }
}

/// Colored terminal layer. Fields are rendered inline, with the message
/// emphasized over the remaining key/value pairs.
pub fn formatted_layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber,
    S: for<'span> LookupSpan<'span>,
{
    let fields = tracing_subscriber::fmt::format::debug_fn(|writer, field, value| {
        if field.name() == "message" {
            write!(writer, "{:?}", Paint::new(value).bold())
        } else {
            write!(writer, "{}: {:?}", field, Paint::default(value).bold())
        }
    })
    .delimited(", ")
    .display_messages();

    tracing_subscriber::fmt::layer()
        .fmt_fields(fields)
        // Emit through `print!` so libtest's output capturing works.
        .with_test_writer()
}

pub fn json_layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber,
    S: for<'span> LookupSpan<'span>,
{
    Paint::disable();

    tracing_subscriber::fmt::layer().json().with_test_writer()
}

/// Installs the global subscriber described by the config. Also routes
/// `log` macro output through tracing, so both families of macros end up
/// in the same place.
pub fn init(config: &Config) -> Result<()> {
    use tracing_log::LogTracer;
    use tracing_subscriber::prelude::*;

    LogTracer::init().map_err(|e| ErrorKind::Other(e.to_string()))?;

    let filter = config.tracing.level.filter();

    match config.tracing.mode {
        Mode::Production => {
            use tracing_loki::url::Url;

            let url = Url::parse(&config.tracing.loki_address)?;
            let labels = [
                ("host".to_string(), config.address.to_string()),
                ("app".to_string(), config.name.clone()),
            ];
            let (loki_layer, task) =
                tracing_loki::layer(url, labels.into_iter().collect(), Default::default())
                    .map_err(|e| ErrorKind::Other(e.to_string()))?;

            // Shipping to loki happens on this background task; without it
            // the layer buffers forever.
            tokio::spawn(task);

            tracing::subscriber::set_global_default(
                tracing_subscriber::registry()
                    .with(loki_layer)
                    .with(json_layer())
                    .with(filter),
            )
        }
        Mode::Formatted => tracing::subscriber::set_global_default(
            tracing_subscriber::registry()
                .with(formatted_layer())
                .with(filter),
        ),
        Mode::Json => tracing::subscriber::set_global_default(
            tracing_subscriber::registry().with(json_layer()).with(filter),
        ),
    }
    .map_err(|e| ErrorKind::Other(e.to_string()))?;

    Ok(())
}

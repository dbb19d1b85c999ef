//! Logging bootstrap for bookshelf binaries.

use anyhow::Context;
use bookshelf_kernel::settings::{LogFormat, TelemetrySettings};
use tracing::Level;
use tracing_subscriber::{fmt::MakeWriter, EnvFilter};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `telemetry.log_level` when set. Fails if a global
/// subscriber is already installed or the filter does not parse.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = env_filter(&settings.log_level)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match settings.log_format {
        LogFormat::Pretty => builder.with_target(true).try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };
    result.map_err(|e| anyhow::anyhow!(e).context("failed to install tracing subscriber"))?;

    tracing::info!(
        target: "bookshelf-telemetry",
        format = ?settings.log_format,
        "telemetry initialised"
    );
    Ok(())
}

/// Run `f` with a temporary stderr subscriber at `info`.
///
/// For work that happens before settings exist, such as loading them, so its
/// events are not lost before [`init`] installs the real subscriber.
pub fn with_bootstrap_logging<T>(f: impl FnOnce() -> T) -> T {
    tracing::subscriber::with_default(bootstrap_subscriber(std::io::stderr), f)
}

fn bootstrap_subscriber<W>(writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .with_writer(writer)
        .finish()
}

fn env_filter(default_directives: &str) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_directives)
            .with_context(|| format!("invalid log level filter {default_directives:?}")),
    }
}

use anyhow::Context;
use bookshelf_kernel::settings::{load_with_retry, RetryPolicy, Settings};

fn main() -> anyhow::Result<()> {
    let settings = bookshelf_telemetry::with_bootstrap_logging(|| {
        load_with_retry(RetryPolicy::default(), |_| Settings::load())
    })?;
    settings
        .validate()
        .context("refusing to start with invalid configuration")?;

    bookshelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        cache_enabled = settings.cache.enabled,
        "bookshelf bootstrap starting"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(bookshelf_app::bootstrap::run(settings))
}

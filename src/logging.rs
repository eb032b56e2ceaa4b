use anyhow::Context as _;

/// Request spans from `TraceLayer` are emitted at debug, so they are enabled by default.
pub const DEFAULT_DIRECTIVES: &str = "info,tower_http=debug";

/// Installs the global subscriber on stderr. `RUST_LOG` replaces [`DEFAULT_DIRECTIVES`].
pub fn init() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(DEFAULT_DIRECTIVES))
        .context("build log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "logging initialized");
    Ok(())
}

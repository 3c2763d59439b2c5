use tracing_subscriber::{EnvFilter, fmt};

/// Initializes tracing from the `RUST_LOG` environment variable,
/// defaulting to the `info` level. Intended for binaries; tests should
/// prefer [`try_init`] to avoid panicking if a subscriber is already set.
pub fn init() {
    try_init().expect("failed to initialize tracing")
}

/// Attempts to initialize tracing, returning an error if a subscriber is
/// already installed.
pub fn try_init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).try_init().map_err(Into::into)
}

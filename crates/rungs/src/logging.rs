use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUNGS_LOG`, then `RUST_LOG`, else `info`.
///
/// Returns false when a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let filter = std::env::var("RUNGS_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init()
        .is_ok()
}

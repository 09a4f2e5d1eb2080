//! Shared utilities.

/// Install a default `RUST_LOG`-driven tracing subscriber, unless the
/// application already registered one.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

//! Tracing bootstrap for hosts embedding the core.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG`.
///
/// Returns `false` when a global subscriber was already set, so tests and
/// hosts may call it more than once.
pub fn init_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .is_ok()
}

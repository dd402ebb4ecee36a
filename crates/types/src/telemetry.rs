//! Tracing subscriber setup for the pipeline binaries

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `info`, or `debug`
/// with `verbose`.
pub fn init_tracing(verbose: bool) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let default_directive = if verbose { "debug" } else { "info" };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}

//! Console logging setup using `tracing-subscriber`.

use tracing_subscriber::EnvFilter;

/// Initialise stderr logging.
///
/// The level is `info`, or `debug` in debug mode. `RUST_LOG` overrides both.
pub fn init(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

//! Logging setup for the binary

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbosity` picks the level for this
/// crate (0 = warn, 1 = info, 2+ = debug).
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("geosplit={}", level)));

    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    // A second call (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}

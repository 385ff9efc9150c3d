//! Console logging.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the console logger at `info`, or whatever `RUST_LOG` asks for.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_logger() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer())
        .try_init();
}

//! Structured logging.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter, or the verbose one with state transitions.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "multipost=debug"
    } else {
        "multipost=info"
    }
}

/// Install the global subscriber writing to stderr.
///
/// `RUST_LOG` overrides the default filter. Calling this twice is harmless.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose))),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

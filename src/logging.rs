use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sets up the logging subscriber for the plugin.
///
/// Logs go to stderr; stdout carries only metric lines or graph definitions.
/// `RUST_LOG` overrides the level chosen by `verbose`.
pub fn init_logger(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(false)
        .compact();

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

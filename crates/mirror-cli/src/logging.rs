use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the diagnostics subscriber.
///
/// Output goes to stderr so stdout carries only event lines. `RUST_LOG` picks
/// the filter, defaulting to "warn"; `verbose` forces "debug".
pub fn init(verbose: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(true)
        .compact();

    let filter_layer = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A subscriber already installed (tests) is not an error.
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init();
}

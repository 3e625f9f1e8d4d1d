//! Logging initialization

use tracing_subscriber::EnvFilter;

/// Initialize logging to stderr
///
/// `RUST_LOG` wins when set. Otherwise only warnings are shown, or this
/// crate's debug output when `debug` is set. Stdout stays free for DOT and
/// command output.
pub fn init_logging(debug: bool) {
    let default_directive = if debug {
        format!("{}=debug,warn", env!("CARGO_CRATE_NAME"))
    } else {
        "warn".to_string()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A subscriber may already be installed when embedded in tests
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(debug)
        .with_file(debug)
        .with_line_number(debug)
        .try_init();

    if debug {
        tracing::debug!("Debug logging enabled");
    }
}

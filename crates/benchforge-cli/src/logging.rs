//! Log output.
//!
//! Events go to stderr so that command output on stdout stays clean.

use std::io;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "benchforge=info";

/// Installs the global subscriber.
///
/// Without `-v` the filter comes from `RUST_LOG`, falling back to
/// `benchforge=info`. Safe to call more than once; later calls are ignored.
pub fn init(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        v => EnvFilter::new(directive(v)),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .try_init();
}

fn directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => DEFAULT_FILTER,
        1 => "benchforge=debug",
        _ => "benchforge=trace",
    }
}

//! Tracing subscriber setup for the `obridge` binary.
//!
//! Logs go to stderr so stdout stays reserved for answers and payloads.
//! `RUST_LOG` takes precedence over the built-in filter.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "obridge=info,outline_bridge=info";
const VERBOSE_FILTER: &str = "obridge=debug,outline_bridge=debug";

pub fn init(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

//! Console logging, powered by tracing-subscriber.
//!
//! Lines read `2024-03-09 14:05:07,123  INFO message` on stderr.
//! `RUST_LOG` overrides the default filter.

use std::io::IsTerminal;

use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Default directives: our crates at `level`, HTTP internals at warn.
fn default_directives(level: &str) -> String {
    let mut directives = vec![level.to_string()];
    for target in ["hyper", "hyper_util", "reqwest", "rustls", "h2"] {
        directives.push(format!("{}=warn", target));
    }
    directives.join(",")
}

/// Build the filter from `RUST_LOG`, falling back to the defaults.
pub fn build_env_filter(verbose: bool) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let level = if verbose { "debug" } else { "info" };
    let directives = default_directives(level);
    EnvFilter::try_new(&directives)
        .map_err(|e| anyhow::anyhow!("invalid tracing filter '{}': {}", directives, e))
}

/// Install the global subscriber. Call once, before the run starts.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let stderr = std::io::stderr();
    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(verbose)?)
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_target(false)
        .with_ansi(stderr.is_terminal())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))
}

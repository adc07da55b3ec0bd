//! Diagnostic logging for the binary.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives, e.g. `chitchat=debug`.
pub const LOG_ENV_VAR: &str = "CHITCHAT_LOG";

const DEFAULT_DIRECTIVES: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global subscriber. Output goes to stderr so it never mixes
/// with replies printed on stdout. Calling this twice is harmless.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::cli::global::GlobalArgs;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "CHAOS_BOX_LOG";

fn default_level(global: &GlobalArgs) -> &'static str {
    match (global.quiet, global.verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

/// Log to stderr. `CHAOS_BOX_LOG` wins over `-q` / `-v`.
pub fn init(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level(global)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(global.use_color())
        .with_target(false)
        .without_time();

    // a second init (tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

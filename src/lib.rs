pub mod client;
pub mod config;
pub mod directory;
pub mod error;
pub mod logging;
pub mod logs;
pub mod models;
pub mod signature;
pub mod ui;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// Diagnostics go to stderr so that command output on stdout stays clean
/// (and parseable with `--format json`). `RUST_LOG` overrides the default
/// `warn` level.
///
/// Note: This function can only be called once.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

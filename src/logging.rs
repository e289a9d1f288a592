//! `tracing` subscriber setup.
//!
//! `RUST_LOG` wins when set; otherwise the command picks a default level.
//! Output goes to stderr so stdout stays clean for reports and `--json`.

use tracing_subscriber::EnvFilter;

pub fn init(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

//! Logging setup shared by the binaries.

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG` (default `info`). `VOICE_LOG_JSON=1` or
/// `true` switches to JSON lines. Logs go to stderr so stdout stays free for
/// the runtime protocol.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("VOICE_LOG_JSON").is_ok_and(|value| value == "1" || value == "true");

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let result = if json { builder.json().try_init() } else { builder.try_init() };
    if let Err(err) = result {
        eprintln!("logging already initialised: {err}");
    }
}

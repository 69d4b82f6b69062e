#![forbid(unsafe_code)]

//! Tracing targets and optional subscriber setup.
//!
//! The engine emits structured `tracing` events under the targets below.
//! Hosts that already install a subscriber need nothing from this module;
//! with the `tracing-json` feature, [`init`] installs a global fmt subscriber
//! filtered by `RUST_LOG` (falling back to the given default directive).

/// Session lifecycle: start, finalize, cancellation, state changes.
pub const TARGET_SESSION: &str = "blocksel.session";
/// Per-frame hit testing.
pub const TARGET_HIT: &str = "blocksel.hit";
/// Node index builds and refreshes.
pub const TARGET_INDEX: &str = "blocksel.index";
/// Frame coalescing.
pub const TARGET_FRAME: &str = "blocksel.frame";

/// Output format for [`init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Install a global subscriber.
///
/// Returns `false` if a global subscriber was already set.
#[cfg(feature = "tracing-json")]
pub fn init(format: LogFormat, default_directive: &str) -> bool {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    }
}

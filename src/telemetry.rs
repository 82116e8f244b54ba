//! Opt-in tracing and diagnostics initialization.
//!
//! The library itself only *emits* `tracing` events; nothing here runs
//! unless a binary opts in. [`init`] composes the standard subscriber stack
//! (env-filter, fmt, span-aware error layer) and [`init_panic_reporting`]
//! installs miette's pretty panic hook.

use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the default subscriber stack for binaries embedding this crate.
///
/// Honors `RUST_LOG`; defaults to `info` for this crate and `error`
/// elsewhere. Safe to call once per process — a second call is ignored by
/// `try_init`.
pub fn init() {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::CLOSE);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("error,docweave=info"))
        .expect("static filter directive parses");

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .try_init();
}

/// Install miette's panic hook for pretty panic reports.
pub fn init_panic_reporting() {
    miette::set_panic_hook();
}

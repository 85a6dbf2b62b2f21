//! Diagnostic logging on stderr.
//!
//! stdout belongs to the buildpack's own user-facing output, so everything
//! from this library goes to stderr.

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

use cnbind_platform::vars;

/// Filter directive derived from `BP_LOG_LEVEL`.
pub fn bp_log_directive(level: Option<&str>) -> &'static str {
    match level {
        Some(l) if l.eq_ignore_ascii_case("debug") => "debug",
        _ => "info",
    }
}

/// Plain-text subscriber writing to `writer`. The lifecycle captures
/// stderr, so no colour codes.
pub fn subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .with_ansi(false)
        .finish()
}

/// Install the global subscriber on stderr. Safe to call more than once.
pub fn init() {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => {
            let level = std::env::var(vars::BP_LOG_LEVEL).ok();
            EnvFilter::new(bp_log_directive(level.as_deref()))
        }
    };
    let _ = tracing::subscriber::set_global_default(subscriber(filter, std::io::stderr));
}

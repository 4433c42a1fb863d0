use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "CTC_DECODE_LOG";

/// Map a `-v` count to the default level: errors only, then summaries, per-decode events,
/// and finally every beam step.
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Initialize structured JSON logging on stderr.
///
/// `default_level` applies unless `CTC_DECODE_LOG` holds directives
/// (e.g. `CTC_DECODE_LOG=ctc_decode=debug`). Later calls are no-ops.
pub fn init(default_level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_env_var(LOG_ENV_VAR)
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_current_span(true)
                .with_span_list(true),
        )
        .try_init();
}

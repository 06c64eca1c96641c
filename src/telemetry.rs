//! Logging setup for the hangman service.
//!
//! Two targets carry the project's own events:
//! - `hangman`: round transitions (round started/won/lost, guesses, artwork cache hits and writes)
//! - `pokemon_hangman_backend`: startup inventory, config loading, session creation and expiry
//!
//! Both default to `debug`; `tower_http` request spans stay at `info`. LOG_LEVEL replaces
//! the whole filter. LOG_FORMAT=json switches to one JSON object per line for log shipping;
//! anything else keeps the human-readable format.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,hangman=debug,pokemon_hangman_backend=debug,tower_http=info,axum=info";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let format = LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

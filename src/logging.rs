use std::{io::IsTerminal, sync::Once};

use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// Environment variable holding the log level of this crate. Ignored when
/// `RUST_LOG` already has a directive for the crate.
const LOG_ENV_VAR: &str = "ABI_SQL_LOG";
const CRATE_NAME: &str = "abi_sql_api";

/// Initializes the global tracing subscriber. Safe to call more than once.
pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let (env_filter, log_level) = env_filter_and_log_level();

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_ansi(std::io::stderr().is_terminal())
            .with_writer(std::io::stderr)
            .init();

        tracing::info!("log level: {}", log_level);
    });
}

fn env_filter_and_log_level() -> (EnvFilter, String) {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let mut env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(&directives);

    let log_level = std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| "info".to_string());

    if !directives.contains(&format!("{CRATE_NAME}=")) {
        match format!("{CRATE_NAME}={log_level}").parse() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            Err(err) => eprintln!("ignoring invalid {LOG_ENV_VAR}={log_level}: {err}"),
        }
    }

    (env_filter, log_level)
}

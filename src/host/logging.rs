//! Logger setup for the loaded extension.

use log::LevelFilter;

/// Environment variable holding an `env_logger` filter, e.g. `debug` or
/// `regex_extract=trace`.
pub const LOG_ENV: &str = "REGEX_EXTRACT_LOG";

/// Install `env_logger` once per process.
///
/// `default_level` applies when `REGEX_EXTRACT_LOG` is unset. Later calls,
/// or a logger already installed by the host application, are left alone.
pub fn init_logging(default_level: LevelFilter) {
    let env = env_logger::Env::new().filter_or(LOG_ENV, default_level.to_string());
    env_logger::try_init_from_env(env).ok();
}

//! Structured logging for Orrery.
//!
//! Console output with uptime timestamps and module paths, plus an optional
//! JSON log file. The level comes from `RUST_LOG` when set, otherwise from the
//! config's `debug.log_level`.

use orrery_config::Config;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// GPU crates are chatty at `info`; keep them at `warn` unless asked.
const QUIET_GPU: &str = "wgpu=warn,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Name of the JSON log file written into the log directory.
pub const LOG_FILE_NAME: &str = "orrery.log";

/// Build the filter directive string for a config.
///
/// An empty `log_level` falls back to `info`. GPU crates are always appended
/// at `warn` so a plain `debug` level stays readable.
pub fn filter_directives(config: Option<&Config>) -> String {
    let level = config
        .map(|c| c.debug.log_level.trim())
        .filter(|level| !level.is_empty())
        .unwrap_or("info");
    format!("{level},{QUIET_GPU}")
}

/// Where the JSON log goes, if file logging is on for this config.
pub fn log_file_path(log_dir: Option<&Path>, config: Option<&Config>) -> Option<PathBuf> {
    let wants_file = config.is_some_and(|c| c.debug.log_to_file);
    match (wants_file, log_dir) {
        (true, Some(dir)) => Some(dir.join(LOG_FILE_NAME)),
        _ => None,
    }
}

/// Initialize the global tracing subscriber.
///
/// Call once at startup, before the window opens. `log` records emitted by
/// dependencies (and by `orrery-config`/`orrery-render`) are captured too.
pub fn init_logging(log_dir: Option<&Path>, config: Option<&Config>) {
    let filter_str = filter_directives(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if let Some(path) = log_file_path(log_dir, config)
        && let Some(dir) = path.parent()
        && std::fs::create_dir_all(dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(&path)
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        tracing::info!(path = %path.display(), "JSON file logging enabled");
        return;
    }

    subscriber.init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_quiet_gpu() {
        let directives = filter_directives(None);
        assert!(directives.starts_with("info,"));
        assert!(directives.contains("wgpu=warn"));
        assert!(directives.contains("naga=warn"));
    }

    #[test]
    fn test_config_level_is_used() {
        let mut config = Config::default();
        config.debug.log_level = "orrery_scene=trace".to_string();
        let directives = filter_directives(Some(&config));
        assert!(directives.starts_with("orrery_scene=trace,"));
    }

    #[test]
    fn test_blank_level_falls_back_to_info() {
        let mut config = Config::default();
        config.debug.log_level = "   ".to_string();
        assert!(filter_directives(Some(&config)).starts_with("info,"));
    }

    #[test]
    fn test_directives_parse() {
        let mut config = Config::default();
        for level in ["info", "debug,orrery_render=trace", "warn", "error"] {
            config.debug.log_level = level.to_string();
            let directives = filter_directives(Some(&config));
            assert!(
                EnvFilter::try_new(&directives).is_ok(),
                "failed to parse filter: {directives}"
            );
        }
    }

    #[test]
    fn test_log_file_only_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();

        config.debug.log_to_file = false;
        assert_eq!(log_file_path(Some(dir.path()), Some(&config)), None);

        config.debug.log_to_file = true;
        assert_eq!(
            log_file_path(Some(dir.path()), Some(&config)),
            Some(dir.path().join(LOG_FILE_NAME))
        );
        assert_eq!(log_file_path(None, Some(&config)), None);
    }
}

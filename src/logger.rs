use anyhow::{Context, Result};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;

use crate::config::ConfigManager;
use crate::VerbosityLevel;

/// Initialize the logging system
///
/// Console logging defaults to the level implied by `verbosity`; `RUST_LOG`
/// overrides it when set:
/// - `RUST_LOG=error` - Only errors
/// - `RUST_LOG=warn` - Warnings and errors
/// - `RUST_LOG=info` - Info, warnings, and errors (default)
/// - `RUST_LOG=debug` - Debug and above
///
/// Run milestones are also appended to `activity-sync.log` in the config
/// directory via [`log_to_file`].
///
/// ## Examples
///
/// ```bash
/// # Show HTTP-level detail for a sync run
/// RUST_LOG=debug activity-sync sync
/// ```
pub fn init_logger(verbosity: VerbosityLevel) -> Result<()> {
    ConfigManager::ensure_config_dir()?;

    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .unwrap_or_else(|| verbosity.level_filter());

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{:5}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .try_init()
        .ok(); // Ignore error if logger is already initialized

    log_to_file(&format!("Logger initialized with level: {level:?}"))?;

    Ok(())
}

/// Append a timestamped line to the log file
pub fn log_to_file(message: &str) -> Result<()> {
    let log_path = ConfigManager::log_file_path()?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        message
    )?;

    Ok(())
}

/// Rotate log file if it exceeds the size limit (10MB)
pub fn rotate_log_if_needed() -> Result<()> {
    const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

    let log_path = ConfigManager::log_file_path()?;

    if log_path.exists() {
        let metadata = std::fs::metadata(&log_path)?;

        if metadata.len() > MAX_LOG_SIZE {
            let old_log_path = log_path.with_extension("log.old");

            if old_log_path.exists() {
                std::fs::remove_file(&old_log_path)?;
            }

            std::fs::rename(&log_path, &old_log_path)?;

            log::info!("Log file rotated to {}", old_log_path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs::File;
    use tempfile::TempDir;

    fn with_config_home<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
        let temp = TempDir::new()?;
        std::env::set_var("XDG_CONFIG_HOME", temp.path());
        ConfigManager::ensure_config_dir()?;
        let result = f();
        std::env::remove_var("XDG_CONFIG_HOME");
        result
    }

    #[test]
    #[serial]
    #[cfg(target_os = "linux")]
    fn test_log_to_file() -> Result<()> {
        with_config_home(|| {
            log_to_file("Test log message")?;

            let log_path = ConfigManager::log_file_path()?;
            let contents = std::fs::read_to_string(&log_path)?;
            assert!(contents.contains("Test log message"));
            Ok(())
        })
    }

    #[test]
    #[serial]
    #[cfg(target_os = "linux")]
    fn test_rotate_log_creates_backup() -> Result<()> {
        with_config_home(|| {
            let log_path = ConfigManager::log_file_path()?;
            let mut file = File::create(&log_path)?;
            file.write_all(&vec![b'a'; 11 * 1024 * 1024])?;
            drop(file);

            rotate_log_if_needed()?;

            assert!(log_path.with_extension("log.old").exists());
            assert!(!log_path.exists());
            Ok(())
        })
    }

    #[test]
    #[serial]
    #[cfg(target_os = "linux")]
    fn test_small_log_is_not_rotated() -> Result<()> {
        with_config_home(|| {
            log_to_file("short")?;
            rotate_log_if_needed()?;

            let log_path = ConfigManager::log_file_path()?;
            assert!(log_path.exists());
            assert!(!log_path.with_extension("log.old").exists());
            Ok(())
        })
    }
}

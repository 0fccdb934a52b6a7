//! File-backed logger.
//!
//! Debug builds always log to stderr and to the log file. Release builds only
//! write the file when `FORMBRIDGE_ENABLE_LOGGING=1`.

use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

struct Logger {
    path: PathBuf,
    verbose: bool,
    enabled: bool,
}

impl Logger {
    fn init() -> Self {
        let dir = log_dir();
        let _ = fs::create_dir_all(&dir);

        let filename = if cfg!(debug_assertions) {
            "formbridge-dev.log"
        } else {
            "formbridge.log"
        };
        let path = dir.join(filename);

        let verbose = std::env::var("FORMBRIDGE_LOG_VERBOSE")
            .map(|v| v == "1")
            .unwrap_or(false);

        let enabled = if cfg!(debug_assertions) {
            true
        } else {
            std::env::var("FORMBRIDGE_ENABLE_LOGGING")
                .map(|v| v == "1")
                .unwrap_or(false)
        };

        Self {
            path,
            verbose,
            enabled,
        }
    }

    fn rotate_if_needed(&self) {
        if let Ok(meta) = fs::metadata(&self.path) {
            if meta.len() > MAX_LOG_BYTES {
                let backup = self.path.with_extension("log.bak");
                let _ = fs::remove_file(&backup);
                let _ = fs::rename(&self.path, &backup);
            }
        }
    }

    fn log(&self, level: &str, message: &str) {
        if !self.enabled {
            return;
        }

        self.rotate_if_needed();
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
        {
            let _ = writeln!(file, "{} [{}] {}", Utc::now().to_rfc3339(), level, message);
        }
    }
}

/// `$FORMBRIDGE_LOG_DIR`, else `<data_local_dir>/formbridge/logs`
fn log_dir() -> PathBuf {
    resolve_log_dir(std::env::var("FORMBRIDGE_LOG_DIR").ok())
}

fn resolve_log_dir(override_dir: Option<String>) -> PathBuf {
    if let Some(dir) = override_dir.filter(|dir| !dir.is_empty()) {
        return PathBuf::from(dir);
    }

    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("formbridge")
        .join("logs")
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

fn get_logger() -> &'static Logger {
    LOGGER.get_or_init(Logger::init)
}

pub fn log_debug(message: &str) {
    log_internal("DEBUG", message, false);
}

/// Only emitted when `FORMBRIDGE_LOG_VERBOSE=1`
pub fn log_debug_verbose(message: &str) {
    log_internal("DEBUG", message, true);
}

pub fn log_info(message: &str) {
    log_internal("INFO", message, false);
}

pub fn log_warn(message: &str) {
    log_internal("WARN", message, false);
}

pub fn log_error(message: &str) {
    log_internal("ERROR", message, false);
}

fn log_internal(level: &str, message: &str, verbose_only: bool) {
    let logger = get_logger();
    if verbose_only && !logger.verbose {
        return;
    }

    #[cfg(debug_assertions)]
    eprintln!("[{}] {}", level, message);

    logger.log(level, message);
}

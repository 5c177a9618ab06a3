//! Logging Infrastructure
//!
//! Console output (pretty or JSON) filtered by `RUST_LOG`, plus optional
//! daily rotating files under `LOG_DIR` that are deleted after
//! [`LOG_RETENTION_DAYS`].

use std::fs;
use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub const DEFAULT_FILTER: &str = "omni_server=info,tower_http=info";
pub const LOG_RETENTION_DAYS: i64 = 14;
const LOG_FILE_PREFIX: &str = "omni-server";

/// Initialize the global subscriber
pub fn init_logger(json_format: bool, log_dir: Option<&str>) -> Result<(), BoxError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if json_format {
        layers.push(
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .boxed(),
        );
    } else {
        layers.push(fmt::layer().with_target(true).boxed());
    }

    if let Some(dir) = log_dir {
        fs::create_dir_all(dir)?;
        let file = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        // Files are always JSON so they can be shipped as-is
        layers.push(
            fmt::layer()
                .json()
                .with_target(true)
                .with_writer(std::sync::Mutex::new(file))
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()?;
    Ok(())
}

/// Delete rotated log files older than `days`; returns how many were removed
pub fn cleanup_old_logs(log_dir: &Path, days: i64) -> std::io::Result<usize> {
    let cutoff = chrono::Utc::now().date_naive() - chrono::Duration::days(days);
    let mut removed = 0;

    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        // omni-server.YYYY-MM-DD
        let Some(date) = name
            .strip_prefix(LOG_FILE_PREFIX)
            .and_then(|rest| rest.strip_prefix('.'))
            .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        else {
            continue;
        };
        if date < cutoff {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            removed += 1;
        }
    }

    Ok(removed)
}

//! Process logging
//!
//! Wallet and transfer events carry structured fields (`wallet_id`,
//! `transfer_id`, `leg`, `rollback`). JSON output keeps them queryable for
//! reconciliation; text output mirrors to stdout for local runs.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;

fn rotation(name: &str) -> Rotation {
    match name {
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        _ => Rotation::NEVER,
    }
}

/// Configured level with sqlx statement logging muted
fn default_directives(level: &str) -> String {
    format!("{level},sqlx=warn")
}

/// Install the global subscriber; keep the guard alive until shutdown
///
/// `RUST_LOG` overrides the configured level.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let appender = RollingFileAppender::new(
        rotation(&config.rotation),
        &config.log_dir,
        &config.log_file,
    );
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        registry
            .with(fmt::layer().json().with_writer(writer).with_ansi(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(writer).with_ansi(false))
            .with(fmt::layer().with_target(false))
            .init();
    }

    guard
}

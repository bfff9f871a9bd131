use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::tasks::status_sync::types::SyncReport;

/// Initialize structured logging.
///
/// `LOG_LEVEL` sets the default filter and `RUST_LOG` overrides it.
/// `LOG_FORMAT=json` switches to JSON lines for CI logs.
pub fn init_logging() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }

    info!(
        service = "storefeed",
        version = env!("CARGO_PKG_VERSION"),
        log_level = %log_level,
        log_format = %log_format,
        "Logging initialized"
    );
}

pub fn log_sync_summary(report: &SyncReport) {
    info!(
        updated = report.updated,
        skipped = report.skipped,
        total = report.total(),
        "Status sync finished. Updated: {}, skipped: {} of {}",
        report.updated,
        report.skipped,
        report.total()
    );
}

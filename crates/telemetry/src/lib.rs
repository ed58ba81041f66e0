//! Logging bootstrap for bookshelf.

use bookshelf_kernel::settings::{LogFormat, TelemetrySettings};

/// Initialize the tracing pipeline once, honoring the configured format.
///
/// Repeated calls are no-ops; `try_init` keeps the first subscriber.
pub fn init(settings: &TelemetrySettings) {
    match settings.log_format {
        LogFormat::Pretty => {
            tracing_subscriber::fmt().try_init().ok();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().json().try_init().ok();
        }
    }

    tracing::debug!(format = ?settings.log_format, "telemetry initialized");
}

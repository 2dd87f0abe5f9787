//! Request logging settings, fixed once at startup.

use std::{sync::OnceLock, time::Duration};

use crate::config::ServerConfig;

#[derive(Debug, Clone, Copy)]
pub(super) struct RequestSettings {
    /// Requests slower than this are logged as warnings.
    pub(super) slow_request_threshold: Duration,

    /// Honour `traceparent` headers sent by callers.
    pub(super) parent_propagation: bool,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            slow_request_threshold: Duration::from_secs(1),
            parent_propagation: false,
        }
    }
}

static REQUEST_SETTINGS: OnceLock<RequestSettings> = OnceLock::new();

pub(super) fn apply_runtime_config(config: &ServerConfig) {
    let settings = RequestSettings {
        slow_request_threshold: Duration::from_millis(
            config.observability.slow_request_threshold_ms,
        ),
        parent_propagation: config.observability.otel_parent_propagation_enabled,
    };

    // Later calls keep the first settings.
    _ = REQUEST_SETTINGS.set(settings);
}

/// Settings applied at startup, or the defaults in tests.
pub(super) fn request_settings() -> RequestSettings {
    REQUEST_SETTINGS.get().copied().unwrap_or_default()
}

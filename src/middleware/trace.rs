//! Per-request access log.
//!
//! Always `info`: whatever made a request fail has already logged its own
//! `warn`/`error` event, and one failure gets one message.

use std::time::Duration;

use http::StatusCode;
use tracing::info;

use crate::method::Method;

/// Emits one event for a finished request.
pub(crate) fn record(method: Option<Method>, path: &str, status: StatusCode, elapsed: Duration) {
    let method = method.map_or("?", Method::as_str);
    let latency_ms = elapsed.as_secs_f64() * 1000.0;
    info!(%method, path, status = status.as_u16(), latency_ms, "request");
}

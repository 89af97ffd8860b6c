//! Unwrapping of the vendor's `{"bustime-response": {...}}` envelope.
//!
//! Only a body without the envelope object is a failure. Inside the envelope
//! the vendor reports "nothing to show" (`No service scheduled`, `No data
//! found for parameter`) as `"error": [{"msg": ...}, ...]` in place of the
//! expected key. That is an ordinary empty answer, so it unwraps to an empty
//! list and the messages are logged once.

use serde_json::{Map, Value};
use tracing::warn;

use super::error::UpstreamError;

pub const ENVELOPE_KEY: &str = "bustime-response";

/// Extracts the item list stored under `key`. Items are returned in vendor
/// order and otherwise untouched. A lone object where a list was expected is
/// returned as a one-item list; a missing key is an empty list.
pub fn unwrap_list(body: Value, key: &'static str) -> Result<Vec<Value>, UpstreamError> {
    let mut envelope = open(body)?;
    match envelope.remove(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Null) | None => {
            log_vendor_messages(&envelope, key);
            Ok(Vec::new())
        }
        Some(item) => Ok(vec![item]),
    }
}

/// Extracts the string scalar stored under `key`.
///
/// There is no empty value for a scalar, so a missing key is a failure.
pub fn unwrap_str(body: Value, key: &'static str) -> Result<String, UpstreamError> {
    let mut envelope = open(body)?;
    match envelope.remove(key) {
        Some(Value::String(s)) => Ok(s),
        _ => {
            log_vendor_messages(&envelope, key);
            Err(UpstreamError::MissingField(key))
        }
    }
}

fn open(body: Value) -> Result<Map<String, Value>, UpstreamError> {
    match body {
        Value::Object(mut outer) => match outer.remove(ENVELOPE_KEY) {
            Some(Value::Object(envelope)) => Ok(envelope),
            _ => Err(UpstreamError::MissingEnvelope),
        },
        _ => Err(UpstreamError::MissingEnvelope),
    }
}

fn log_vendor_messages(envelope: &Map<String, Value>, key: &str) {
    if let Some(msg) = vendor_messages(envelope) {
        warn!(key, "vendor answered without data: {msg}");
    }
}

/// Joins the `msg` fields of the envelope's `error` list, if there is one.
fn vendor_messages(envelope: &Map<String, Value>) -> Option<String> {
    let errors = envelope.get("error")?.as_array()?;
    let messages: Vec<&str> = errors
        .iter()
        .filter_map(|e| e.get("msg").and_then(Value::as_str))
        .collect();
    if messages.is_empty() {
        Some("no message".to_owned())
    } else {
        Some(messages.join("; "))
    }
}

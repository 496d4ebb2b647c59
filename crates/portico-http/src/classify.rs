//! Failure classification at the HTTP boundary
//!
//! Non-success responses are mapped through `ErrorKind::from_status`; calls
//! that produced no response at all become `Network` errors.

use portico_core::{FieldError, PorticoError};
use reqwest::StatusCode;
use serde_json::Value;

/// Classify a failure raised by reqwest before a response was available.
pub(crate) fn transport_error(err: &reqwest::Error) -> PorticoError {
    if err.is_builder() {
        return PorticoError::validation(format!("Invalid request: {err}"));
    }
    PorticoError::network(err.to_string())
}

/// Classify a non-success response from its status and body text.
///
/// The message comes from a JSON `message` (or `error`) string when present,
/// then the trimmed body text, then the status reason phrase. A JSON `errors`
/// array of `{field, message}` objects populates the field-level messages.
pub fn classify_response(status: u16, body: &str) -> PorticoError {
    let json = serde_json::from_str::<Value>(body).ok();

    let message = json
        .as_ref()
        .and_then(|v| {
            ["message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str))
        })
        .map(str::to_string)
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| reason_phrase(status));

    let fields = json
        .as_ref()
        .and_then(|v| v.get("errors"))
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(field_error).collect())
        .unwrap_or_default();

    PorticoError::from_status(status, message, fields)
}

fn field_error(item: &Value) -> Option<FieldError> {
    let field = item.get("field")?.as_str()?;
    let message = item
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("invalid value");
    Some(FieldError::new(field, message))
}

fn reason_phrase(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {status}"))
}

/// Read a failed response and classify it.
pub(crate) async fn response_error(response: reqwest::Response) -> PorticoError {
    let status = response.status().as_u16();
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            tracing::debug!(status, error = %err, "Failed to read error body");
            String::new()
        }
    };
    classify_response(status, &body)
}

/// Error for a success response whose body is not the expected shape.
pub(crate) fn unexpected_body(status: u16, err: &serde_json::Error) -> PorticoError {
    PorticoError::ServerError {
        status: Some(status),
        message: format!("Unexpected response body: {err}"),
    }
}

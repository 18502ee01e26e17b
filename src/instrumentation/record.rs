// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Trace records produced by [`SpanTracingAdapter`](super::SpanTracingAdapter).

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::constants::DEFAULT_SUCCESS_STATUS_CODE;
use crate::config::EpsagonOptions;

/// Outcome of a traced invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceStatus {
    /// The action returned a result
    Ok,
    /// The action returned an error
    Error,
}

/// An outbound HTTP call made during a traced invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpEvent {
    /// Requested URL
    pub url: String,
    /// Response status
    pub status_code: u16,
}

/// Everything known about one traced invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceRecord {
    /// Application name from the options
    pub app_name: String,
    /// Activation id, when the runtime provided one
    pub activation_id: Option<String>,
    /// When the action was called
    pub started_at: DateTime<Utc>,
    /// Wall time of the action
    pub duration_ms: u64,
    /// Outcome
    pub status: TraceStatus,
    /// `statusCode` of the result (200 when it has none), or the configured
    /// error code on failure
    pub status_code: u16,
    /// Error message on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Redacted invocation parameters, absent in metadata-only mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
    /// Response body, only when body capture is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_body: Option<Value>,
    /// Outbound HTTP calls not matching an ignored URL pattern
    pub http_events: Vec<HttpEvent>,
}

/// Parameters with every ignored key removed.
pub(crate) fn redact_params(
    params: &Map<String, Value>,
    options: &EpsagonOptions,
) -> Map<String, Value> {
    params
        .iter()
        .filter(|(key, _)| !options.is_key_ignored(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// `statusCode` of an action result, if it has a usable one.
pub(crate) fn status_code_of(result: &Value) -> Option<u16> {
    result
        .get("statusCode")
        .and_then(Value::as_u64)
        .and_then(|code| u16::try_from(code).ok())
}

/// Status code of a successful result, defaulting to 200 without `statusCode`.
pub(crate) fn response_status_code(result: &Value) -> u16 {
    status_code_of(result).unwrap_or(DEFAULT_SUCCESS_STATUS_CODE)
}

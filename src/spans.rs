// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Span creation helpers for instrumented invocations.
//!
//! Telemetry concerns are kept out of the business logic: instead of
//! `#[instrument]` attributes, each instrumented operation has a span helper
//! here. Spans never carry parameter values, so the token cannot leak
//! through them.
//!
//! Usage pattern:
//! ```rust,ignore
//! let span = spans::invocation(&options.app_name, activation_id.as_deref());
//! async move { /* call the action */ }.instrument(span).await
//! ```

use std::time::Duration;

use tracing::{field::Empty, Level, Span};

/// Create span for one traced action invocation.
///
/// Parent: the caller's span
/// Children: export span, spans created by the action
#[inline]
pub(crate) fn invocation(app_name: &str, activation_id: Option<&str>) -> Span {
    tracing::span!(
        Level::INFO,
        "epsagon.invocation",
        app_name = %app_name,
        activation_id = activation_id.unwrap_or_default(),
        status = Empty,
        status_code = Empty,
        duration_ms = Empty,
    )
}

/// Create span for exporting a trace record.
///
/// Parent: epsagon.invocation span
#[inline]
pub(crate) fn export(exporter: &'static str, timeout: Duration) -> Span {
    tracing::debug_span!(
        "epsagon.export",
        exporter = exporter,
        timeout_ms = timeout.as_millis() as u64,
    )
}

/// Create span for reporting the status of an activation.
#[inline]
pub(crate) fn activation_status(activation_id: Option<&str>) -> Span {
    tracing::trace_span!(
        "epsagon.activation_status",
        activation_id = activation_id.unwrap_or_default(),
    )
}

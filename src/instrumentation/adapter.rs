// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! In-process tracing adapter built on `tracing` spans.

use std::{
    fmt,
    sync::Arc,
    task::{Context, Poll},
};

use chrono::Utc;
use futures::future::BoxFuture;
use serde_json::Value;
use tokio::time::Instant;
use tower::{util::BoxCloneService, BoxError, Service};
use tracing::{Instrument, Span};

use crate::action::BoxAction;
use crate::activation::ActivationId;
use crate::config::EpsagonOptions;
use crate::invocation::Invocation;
use crate::spans;

use super::export::{send_trace, LogExporter, TraceExporter};
use super::record::{redact_params, response_status_code, TraceRecord, TraceStatus};
use super::scope::TraceScope;
use super::TracingAdapter;

/// A [`TracingAdapter`] recording each invocation as a [`TraceRecord`].
///
/// Every invocation runs inside an `epsagon.invocation` span. When the action
/// completes, the record is handed to the [`TraceExporter`], bounded by
/// [`EpsagonOptions::send_timeout`]. Export failures are logged and never
/// change what the action returned.
///
/// # Example
///
/// ```rust
/// use helix_epsagon::{ActivationId, LogExporter, SpanTracingAdapter};
/// use std::sync::Arc;
///
/// let adapter = SpanTracingAdapter::new(Arc::new(LogExporter))
///     .with_activation_id(ActivationId::fixed("act-123"));
/// ```
#[derive(Clone)]
pub struct SpanTracingAdapter {
    exporter: Arc<dyn TraceExporter>,
    activation_id: ActivationId,
}

impl SpanTracingAdapter {
    /// Creates an adapter exporting through `exporter`.
    pub fn new(exporter: Arc<dyn TraceExporter>) -> Self {
        Self {
            exporter,
            activation_id: ActivationId::default(),
        }
    }

    /// Sets where the activation id of traces comes from.
    #[must_use]
    pub fn with_activation_id(mut self, activation_id: ActivationId) -> Self {
        self.activation_id = activation_id;
        self
    }
}

impl Default for SpanTracingAdapter {
    fn default() -> Self {
        Self::new(Arc::new(LogExporter))
    }
}

impl fmt::Debug for SpanTracingAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpanTracingAdapter")
            .field("exporter", &self.exporter.name())
            .field("activation_id", &self.activation_id)
            .finish()
    }
}

impl TracingAdapter for SpanTracingAdapter {
    fn instrument_action(&self, action: BoxAction, options: Arc<EpsagonOptions>) -> BoxAction {
        BoxCloneService::new(SpanTracingService {
            inner: action,
            options,
            exporter: self.exporter.clone(),
            activation_id: self.activation_id.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "SpanTracingAdapter"
    }
}

/// The action produced by [`SpanTracingAdapter::instrument_action`].
#[derive(Clone)]
pub struct SpanTracingService {
    inner: BoxAction,
    options: Arc<EpsagonOptions>,
    exporter: Arc<dyn TraceExporter>,
    activation_id: ActivationId,
}

impl Service<Invocation> for SpanTracingService {
    type Response = Value;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Value, BoxError>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, invocation: Invocation) -> Self::Future {
        // Take the service that was driven to readiness
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let options = self.options.clone();
        let exporter = self.exporter.clone();
        let activation_id = self.activation_id.current();

        let params = (!options.metadata_only).then(|| redact_params(invocation.params(), &options));
        let span = spans::invocation(&options.app_name, activation_id.as_deref());

        Box::pin(
            async move {
                let scope = TraceScope::new(options.clone());
                let started_at = Utc::now();
                let start = Instant::now();

                let result = scope.run(async move { inner.call(invocation).await }).await;
                let duration_ms = start.elapsed().as_millis() as u64;

                let (status, status_code, error, response_body) = match &result {
                    Ok(response) => (
                        TraceStatus::Ok,
                        response_status_code(response),
                        None,
                        options
                            .captures_response_body()
                            .then(|| response.get("body").unwrap_or(response).clone()),
                    ),
                    Err(e) => (
                        TraceStatus::Error,
                        options.http_error_status_code,
                        Some(e.to_string()),
                        None,
                    ),
                };

                let record = TraceRecord {
                    app_name: options.app_name.clone(),
                    activation_id,
                    started_at,
                    duration_ms,
                    status,
                    status_code,
                    error,
                    params,
                    response_body,
                    http_events: scope.take_events(),
                };

                let current = Span::current();
                current.record("duration_ms", duration_ms);
                current.record(
                    "status",
                    match record.status {
                        TraceStatus::Ok => "ok",
                        TraceStatus::Error => "error",
                    },
                );
                current.record("status_code", record.status_code);

                // Export errors are already logged, the action's result wins
                let _ = send_trace(exporter.as_ref(), &record, options.send_timeout).await;

                result
            }
            .instrument(span),
        )
    }
}

// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Activation status reporting.

use std::{
    fmt,
    sync::Arc,
    task::{Context, Poll},
};

use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use tower::{util::BoxCloneService, BoxError, Service};
use tracing::{info, warn, Instrument};

use crate::action::BoxAction;
use crate::activation::ActivationId;
use crate::invocation::Invocation;
use crate::spans;

use super::record::response_status_code;
use super::StatusTracer;

/// Outcome of one activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationStatus {
    /// Activation id, when the runtime provided one
    pub activation_id: Option<String>,
    /// Whether the action returned a result
    pub success: bool,
    /// `statusCode` of the result (200 when the result has none), absent on error
    pub status_code: Option<u16>,
    /// Error message on failure
    pub error: Option<String>,
}

impl ActivationStatus {
    fn from_result(activation_id: Option<String>, result: &Result<Value, BoxError>) -> Self {
        match result {
            Ok(response) => Self {
                activation_id,
                success: true,
                status_code: Some(response_status_code(response)),
                error: None,
            },
            Err(e) => Self {
                activation_id,
                success: false,
                status_code: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Channel receiving activation outcomes.
pub trait StatusReporter: Send + Sync {
    /// Report the outcome of one activation.
    fn report(&self, status: &ActivationStatus);
}

/// Reports activation outcomes as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingStatusReporter;

impl StatusReporter for TracingStatusReporter {
    fn report(&self, status: &ActivationStatus) {
        if status.success {
            info!(
                activation_id = status.activation_id.as_deref().unwrap_or_default(),
                status_code = status.status_code,
                "activation succeeded"
            );
        } else {
            warn!(
                activation_id = status.activation_id.as_deref().unwrap_or_default(),
                error = status.error.as_deref().unwrap_or_default(),
                "activation failed"
            );
        }
    }
}

/// Default [`StatusTracer`], reporting every activation to a [`StatusReporter`].
#[derive(Clone)]
pub struct LogStatusTracer {
    reporter: Arc<dyn StatusReporter>,
    activation_id: ActivationId,
}

impl LogStatusTracer {
    /// Creates a tracer reporting to `reporter`.
    pub fn new(reporter: Arc<dyn StatusReporter>) -> Self {
        Self {
            reporter,
            activation_id: ActivationId::default(),
        }
    }

    /// Sets where the activation id of reports comes from.
    #[must_use]
    pub fn with_activation_id(mut self, activation_id: ActivationId) -> Self {
        self.activation_id = activation_id;
        self
    }
}

impl Default for LogStatusTracer {
    fn default() -> Self {
        Self::new(Arc::new(TracingStatusReporter))
    }
}

impl fmt::Debug for LogStatusTracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogStatusTracer")
            .field("activation_id", &self.activation_id)
            .finish_non_exhaustive()
    }
}

impl StatusTracer for LogStatusTracer {
    fn trace_action(&self, action: BoxAction) -> BoxAction {
        BoxCloneService::new(StatusTracingService {
            inner: action,
            reporter: self.reporter.clone(),
            activation_id: self.activation_id.clone(),
        })
    }
}

/// The action produced by [`LogStatusTracer::trace_action`].
#[derive(Clone)]
pub struct StatusTracingService {
    inner: BoxAction,
    reporter: Arc<dyn StatusReporter>,
    activation_id: ActivationId,
}

impl Service<Invocation> for StatusTracingService {
    type Response = Value;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Value, BoxError>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, invocation: Invocation) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let reporter = self.reporter.clone();
        let activation_id = self.activation_id.current();
        let span = spans::activation_status(activation_id.as_deref());

        Box::pin(
            async move {
                let result = inner.call(invocation).await;
                reporter.report(&ActivationStatus::from_result(activation_id, &result));
                result
            }
            .instrument(span),
        )
    }
}

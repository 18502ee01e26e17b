// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tower layer instrumenting actions with epsagon.
//!
//! Each invocation takes one of two paths, chosen by the token parameter:
//!
//! ```text
//!                 ┌─ token truthy ──► Instrumentation ──► action ─┐
//! EpsagonService ─┤                                                ├─► web action? ──► x-last-activation-id
//!                 └─ otherwise ─────────────────────────► action ─┘
//! ```
//!
//! Nothing from the instrumentation stack is built until the first
//! invocation that carries the token.

use std::{
    fmt,
    sync::Arc,
    task::{Context, Poll},
};

use futures::{future::BoxFuture, TryFutureExt};
use serde_json::Value;
use tower::{BoxError, Layer, Service, ServiceExt};
use tracing::debug;

use crate::action::boxed;
use crate::activation::ActivationId;
use crate::config::{EpsagonOptions, EpsagonOverrides};
use crate::errors::{EpsagonError, InstrumentationError};
use crate::headers::inject_activation_header;
use crate::instrumentation::{
    Instrumentation, LazyInstrumentation, LogExporter, StatusReporter, TraceExporter,
    TracingStatusReporter,
};
use crate::invocation::{ActionLogger, Invocation, TracingLogger};

/// A Tower layer that instruments actions when the token parameter is present.
///
/// Options are resolved once, when the layer is built, and shared by every
/// service it produces.
///
/// # Example
///
/// ```rust
/// use helix_epsagon::{action_fn, EpsagonLayer, Invocation};
/// use serde_json::json;
/// use tower::Layer;
///
/// let action = action_fn(|_: Invocation| async {
///     Ok::<_, std::io::Error>(json!({ "body": "ok" }))
/// });
///
/// let main = EpsagonLayer::default().layer(action);
/// ```
#[derive(Clone)]
pub struct EpsagonLayer {
    options: Arc<EpsagonOptions>,
    instrumentation: Arc<LazyInstrumentation>,
    // None once a custom factory replaced the in-process instrumentation
    in_process: Option<InProcessSinks>,
    activation_id: ActivationId,
}

/// Where the in-process instrumentation sends traces and activation outcomes.
#[derive(Clone)]
struct InProcessSinks {
    exporter: Arc<dyn TraceExporter>,
    reporter: Arc<dyn StatusReporter>,
}

impl Default for InProcessSinks {
    fn default() -> Self {
        Self {
            exporter: Arc::new(LogExporter),
            reporter: Arc::new(TracingStatusReporter),
        }
    }
}

impl InProcessSinks {
    fn lazy(self, activation_id: ActivationId) -> Arc<LazyInstrumentation> {
        Arc::new(LazyInstrumentation::new(move || {
            Ok(Instrumentation::in_process(
                self.exporter.clone(),
                self.reporter.clone(),
                activation_id.clone(),
            ))
        }))
    }
}

impl EpsagonLayer {
    /// Creates a layer with fully resolved options.
    pub fn new(options: EpsagonOptions) -> Self {
        let sinks = InProcessSinks::default();
        let activation_id = ActivationId::default();

        Self {
            options: Arc::new(options),
            instrumentation: sinks.clone().lazy(activation_id.clone()),
            in_process: Some(sinks),
            activation_id,
        }
    }

    /// Creates a layer with `overrides` applied over the default options.
    pub fn with_overrides(overrides: EpsagonOverrides) -> Self {
        Self::new(EpsagonOptions::resolve(overrides))
    }

    /// Replaces the instrumentation factory.
    ///
    /// `factory` runs on the first instrumented invocation. If it fails, that
    /// invocation fails with [`EpsagonError::InstrumentationUnavailable`].
    #[must_use]
    pub fn with_instrumentation<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<Instrumentation, InstrumentationError> + Send + Sync + 'static,
    {
        self.instrumentation = Arc::new(LazyInstrumentation::new(factory));
        self.in_process = None;
        self
    }

    /// Sends the traces of the in-process instrumentation to `exporter`.
    ///
    /// Replaces a factory set with [`with_instrumentation`](Self::with_instrumentation).
    #[must_use]
    pub fn with_trace_exporter(mut self, exporter: Arc<dyn TraceExporter>) -> Self {
        let mut sinks = self.in_process.take().unwrap_or_default();
        sinks.exporter = exporter;
        self.instrumentation = sinks.clone().lazy(self.activation_id.clone());
        self.in_process = Some(sinks);
        self
    }

    /// Sends the activation outcomes of the in-process instrumentation to
    /// `reporter`.
    ///
    /// Replaces a factory set with [`with_instrumentation`](Self::with_instrumentation).
    #[must_use]
    pub fn with_status_reporter(mut self, reporter: Arc<dyn StatusReporter>) -> Self {
        let mut sinks = self.in_process.take().unwrap_or_default();
        sinks.reporter = reporter;
        self.instrumentation = sinks.clone().lazy(self.activation_id.clone());
        self.in_process = Some(sinks);
        self
    }

    /// Sets where the activation id comes from.
    ///
    /// Applies to the `x-last-activation-id` header and to the traces and
    /// status reports of the in-process instrumentation. A custom factory
    /// chooses its own source.
    #[must_use]
    pub fn with_activation_id(mut self, activation_id: ActivationId) -> Self {
        if let Some(sinks) = &self.in_process {
            self.instrumentation = sinks.clone().lazy(activation_id.clone());
        }
        self.activation_id = activation_id;
        self
    }

    /// The resolved options.
    pub fn options(&self) -> &EpsagonOptions {
        &self.options
    }
}

impl Default for EpsagonLayer {
    fn default() -> Self {
        Self::new(EpsagonOptions::default())
    }
}

impl fmt::Debug for EpsagonLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EpsagonLayer")
            .field("options", &self.options)
            .field("instrumentation", &self.instrumentation)
            .field("activation_id", &self.activation_id)
            .finish()
    }
}

impl<S> Layer<S> for EpsagonLayer {
    type Service = EpsagonService<S>;

    fn layer(&self, service: S) -> Self::Service {
        EpsagonService {
            inner: service,
            options: self.options.clone(),
            instrumentation: self.instrumentation.clone(),
            activation_id: self.activation_id.clone(),
        }
    }
}

/// Decorates `action` with epsagon instrumentation.
///
/// Equivalent to `EpsagonLayer::with_overrides(overrides).layer(action)`.
///
/// # Example
///
/// ```rust
/// use helix_epsagon::{action_fn, epsagon, EpsagonOverrides, Invocation};
/// use serde_json::json;
///
/// let main = epsagon(
///     action_fn(|_: Invocation| async { Ok::<_, std::io::Error>(json!({ "body": "ok" })) }),
///     EpsagonOverrides {
///         token_param: Some("MY_TOKEN".to_string()),
///         ..Default::default()
///     },
/// );
/// ```
pub fn epsagon<S>(action: S, overrides: EpsagonOverrides) -> EpsagonService<S> {
    EpsagonLayer::with_overrides(overrides).layer(action)
}

/// A Tower service running an action directly or through instrumentation.
#[derive(Clone)]
pub struct EpsagonService<S> {
    inner: S,
    options: Arc<EpsagonOptions>,
    instrumentation: Arc<LazyInstrumentation>,
    activation_id: ActivationId,
}

impl<S> EpsagonService<S> {
    /// The resolved options.
    pub fn options(&self) -> &EpsagonOptions {
        &self.options
    }
}

impl<S: fmt::Debug> fmt::Debug for EpsagonService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EpsagonService")
            .field("inner", &self.inner)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<S> Service<Invocation> for EpsagonService<S>
where
    S: Service<Invocation, Response = Value> + Clone + Send + 'static,
    S::Error: Into<BoxError> + 'static,
    S::Future: Send + 'static,
{
    type Response = Value;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Value, BoxError>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, invocation: Invocation) -> Self::Future {
        let is_http = invocation.is_http();

        let response: Self::Future = if invocation.is_truthy(&self.options.token_param) {
            // Take the service that was driven to readiness
            let clone = self.inner.clone();
            let inner = std::mem::replace(&mut self.inner, clone);
            let options = self.options.clone();
            let instrumentation = self.instrumentation.clone();

            Box::pin(async move {
                let instrumentation = instrumentation
                    .get()
                    .await
                    .map_err(EpsagonError::from)?
                    .clone();

                let logger: Arc<dyn ActionLogger> = invocation
                    .logger()
                    .cloned()
                    .unwrap_or_else(|| Arc::new(TracingLogger));
                logger.info("instrumenting epsagon.");

                instrumentation
                    .wrap(boxed(inner), options)
                    .oneshot(invocation)
                    .await
            })
        } else {
            debug!("No epsagon token, invoking action directly");
            Box::pin(
                self.inner
                    .call(invocation)
                    .map_err(|err: S::Error| -> BoxError { err.into() }),
            )
        };

        if !is_http {
            return response;
        }

        let activation_id = self.activation_id.clone();
        Box::pin(async move {
            let mut result = response.await?;
            inject_activation_header(&mut result, activation_id.current().as_deref())?;
            Ok(result)
        })
    }
}

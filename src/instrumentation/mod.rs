// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tracing collaborators of the epsagon decorator.
//!
//! Two collaborators wrap the action when an invocation carries the token:
//!
//! 1. A [`StatusTracer`] reports whether the activation succeeded
//! 2. A [`TracingAdapter`] records and exports a trace of the invocation
//!
//! ```text
//! EpsagonService ──► TracingAdapter ──► StatusTracer ──► action
//! ```
//!
//! Both must be transparent: the wrapped action returns exactly what the
//! original action returned, success or error.
//!
//! Neither collaborator is built before the first invocation that asks for
//! instrumentation. [`LazyInstrumentation`] holds the factory and builds
//! them on demand, once per process.
//!
//! # Custom collaborators
//!
//! ```rust,ignore
//! use helix_epsagon::{EpsagonLayer, Instrumentation, LogStatusTracer, SpanTracingAdapter};
//! use std::sync::Arc;
//!
//! let layer = EpsagonLayer::default().with_instrumentation(|| {
//!     Ok(Instrumentation::new(
//!         Arc::new(SpanTracingAdapter::new(Arc::new(MyCollectorExporter::connect()?))),
//!         Arc::new(LogStatusTracer::default()),
//!     ))
//! });
//! ```

use std::{fmt, sync::Arc};

use tokio::sync::OnceCell;

use crate::action::BoxAction;
use crate::activation::ActivationId;
use crate::config::EpsagonOptions;
use crate::errors::InstrumentationError;

mod adapter;
mod export;
mod record;
mod scope;
mod status;

pub use adapter::{SpanTracingAdapter, SpanTracingService};
pub use export::{LogExporter, TraceExporter};
pub use record::{HttpEvent, TraceRecord, TraceStatus};
pub use scope::record_http_event;
pub use status::{
    ActivationStatus, LogStatusTracer, StatusReporter, StatusTracingService,
    TracingStatusReporter,
};

/// Wraps an action so that its invocations are traced.
///
/// The returned action must forward the result of `action` unchanged.
pub trait TracingAdapter: Send + Sync {
    /// Wrap `action` with tracing configured by `options`.
    fn instrument_action(&self, action: BoxAction, options: Arc<EpsagonOptions>) -> BoxAction;

    /// Name of the adapter, for logging.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Wraps an action so that the outcome of its activation is reported.
///
/// The returned action must forward the result of `action` unchanged.
pub trait StatusTracer: Send + Sync {
    /// Wrap `action` with status reporting.
    fn trace_action(&self, action: BoxAction) -> BoxAction;
}

/// The collaborators used for an instrumented invocation.
#[derive(Clone)]
pub struct Instrumentation {
    adapter: Arc<dyn TracingAdapter>,
    status: Arc<dyn StatusTracer>,
}

impl Instrumentation {
    /// Combine a tracing adapter and a status tracer.
    pub fn new(adapter: Arc<dyn TracingAdapter>, status: Arc<dyn StatusTracer>) -> Self {
        Self { adapter, status }
    }

    /// The in-process collaborators: a [`SpanTracingAdapter`] exporting
    /// through `exporter` and a [`LogStatusTracer`] reporting to `reporter`,
    /// both attributing invocations to `activation_id`.
    pub fn in_process(
        exporter: Arc<dyn TraceExporter>,
        reporter: Arc<dyn StatusReporter>,
        activation_id: ActivationId,
    ) -> Self {
        Self::new(
            Arc::new(SpanTracingAdapter::new(exporter).with_activation_id(activation_id.clone())),
            Arc::new(LogStatusTracer::new(reporter).with_activation_id(activation_id)),
        )
    }

    /// Wrap `action` with the status tracer, then with the tracing adapter.
    pub fn wrap(&self, action: BoxAction, options: Arc<EpsagonOptions>) -> BoxAction {
        let traced = self.status.trace_action(action);
        self.adapter.instrument_action(traced, options)
    }
}

impl fmt::Debug for Instrumentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrumentation")
            .field("adapter", &self.adapter.name())
            .finish_non_exhaustive()
    }
}

type InstrumentationFactory =
    dyn Fn() -> Result<Instrumentation, InstrumentationError> + Send + Sync;

/// Builds [`Instrumentation`] on first use.
///
/// The factory is not called until [`get`](Self::get) is awaited. A failing
/// factory leaves the holder empty, so the next call tries again.
pub struct LazyInstrumentation {
    factory: Box<InstrumentationFactory>,
    cell: OnceCell<Instrumentation>,
}

impl LazyInstrumentation {
    /// Create a holder around `factory`.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Instrumentation, InstrumentationError> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            cell: OnceCell::new(),
        }
    }

    /// The instrumentation, building it if this is the first call.
    pub async fn get(&self) -> Result<&Instrumentation, InstrumentationError> {
        self.cell
            .get_or_try_init(|| async {
                let instrumentation = (self.factory)()?;
                tracing::debug!(
                    adapter = instrumentation.adapter.name(),
                    "Initialized epsagon instrumentation"
                );
                Ok(instrumentation)
            })
            .await
    }

    /// Returns true once the factory has run successfully.
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

impl fmt::Debug for LazyInstrumentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyInstrumentation")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

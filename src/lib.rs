// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Epsagon instrumentation for serverless actions.
//!
//! Wraps an action so that invocations carrying an `EPSAGON_TOKEN` parameter
//! run through tracing instrumentation, while all other invocations call the
//! action directly. Web action responses (invocations with `__ow_method`)
//! additionally get an `x-last-activation-id` header, letting callers
//! correlate a response with the activation that produced it.
//!
//! ```rust,no_run
//! use helix_epsagon::{action_fn, epsagon, Invocation};
//! use serde_json::json;
//! use tower::ServiceExt;
//!
//! # async fn run() -> Result<(), tower::BoxError> {
//! let main = epsagon(
//!     action_fn(|params: Invocation| async move {
//!         Ok::<_, std::io::Error>(json!({ "body": params.get("path") }))
//!     }),
//!     Default::default(),
//! );
//!
//! let response = main
//!     .oneshot(Invocation::from_json(json!({ "__ow_method": "get", "path": "/" })))
//!     .await?;
//! assert!(response["headers"].is_object());
//! # Ok(())
//! # }
//! ```

mod action;
mod activation;
pub mod config;
mod errors;
mod headers;
pub mod instrumentation;
mod invocation;
mod layer;
mod spans;

pub use action::{action_fn, boxed, BoxAction};
pub use activation::ActivationId;
pub use config::{EpsagonOptions, EpsagonOptionsBuilder, EpsagonOverrides, KeyPattern};
pub use errors::*;
pub use instrumentation::{
    record_http_event, ActivationStatus, Instrumentation, LazyInstrumentation, LogExporter,
    LogStatusTracer, SpanTracingAdapter, StatusReporter, StatusTracer, TraceExporter,
    TraceRecord, TracingAdapter,
};
pub use invocation::{is_truthy, ActionLogger, Invocation, TracingLogger};
pub use layer::{epsagon, EpsagonLayer, EpsagonService};

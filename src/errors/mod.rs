// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the helix-epsagon library.
//!
//! Errors are split the same way the instrumentation is layered:
//!
//! - [`InstrumentationError`] - the tracing adapter or activation status tracer
//!   could not be constructed
//! - [`ExportError`] - a trace record could not be delivered (never surfaced to
//!   the action's caller, only logged)
//! - [`OptionsError`] - invalid patterns in caller-supplied options
//!
//! [`EpsagonError`] is what the decorator itself can fail with. Errors raised
//! by the wrapped action are *not* wrapped in it: they are returned to the
//! caller as the same boxed value the action produced.
//!
//! # Examples
//!
//! ```rust,ignore
//! use helix_epsagon::{epsagon, EpsagonError, Invocation};
//! use tower::ServiceExt;
//!
//! let decorated = epsagon(action, Default::default());
//! match decorated.oneshot(Invocation::default()).await {
//!     Ok(result) => println!("{result}"),
//!     Err(err) => match err.downcast_ref::<EpsagonError>() {
//!         Some(EpsagonError::MalformedResult { found }) => {
//!             eprintln!("web action returned a {found}");
//!         }
//!         Some(other) => eprintln!("instrumentation failed: {other}"),
//!         None => eprintln!("action failed: {err}"),
//!     },
//! }
//! ```

mod export;
mod instrumentation;
mod options;

pub use export::ExportError;
pub use instrumentation::InstrumentationError;
pub use options::OptionsError;

/// Errors produced by the decorator itself.
///
/// Converted into `tower::BoxError` on the way out of
/// [`EpsagonService`](crate::EpsagonService), so callers recover it with
/// `downcast_ref::<EpsagonError>()`.
#[derive(Debug, thiserror::Error)]
pub enum EpsagonError {
    /// Instrumentation was requested by the token parameter but could not be set up.
    ///
    /// There is no fallback to direct execution in this case.
    #[error("Instrumentation unavailable: {0}")]
    InstrumentationUnavailable(#[from] InstrumentationError),

    /// The result of a web action cannot carry response headers.
    #[error("Action result of type {found} cannot carry response headers")]
    MalformedResult {
        /// JSON type of the offending value (e.g. "string", "array")
        found: &'static str,
    },
}

impl EpsagonError {
    /// Helper to create a `MalformedResult` error describing `value`.
    pub fn malformed_result(value: &serde_json::Value) -> Self {
        EpsagonError::MalformedResult {
            found: json_type_name(value),
        }
    }
}

/// Name of the JSON type of `value`, as used in error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

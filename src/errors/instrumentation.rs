// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Errors raised while setting up instrumentation for a gated invocation.

/// Errors that can occur when the lazily constructed collaborators are built.
///
/// # Examples
///
/// ```rust
/// use helix_epsagon::InstrumentationError;
///
/// let error = InstrumentationError::adapter_init("exporter endpoint not configured");
/// println!("Error: {}", error);
/// ```
#[derive(Debug, thiserror::Error)]
pub enum InstrumentationError {
    /// The tracing adapter could not be constructed.
    #[error("Failed to initialize tracing adapter: {reason}")]
    AdapterInit {
        /// Human readable cause
        reason: String,
    },

    /// The activation status tracer could not be constructed.
    #[error("Failed to initialize activation status tracer: {reason}")]
    StatusTracerInit {
        /// Human readable cause
        reason: String,
    },
}

impl InstrumentationError {
    /// Helper to create an `AdapterInit` error.
    pub fn adapter_init(reason: impl Into<String>) -> Self {
        InstrumentationError::AdapterInit {
            reason: reason.into(),
        }
    }

    /// Helper to create a `StatusTracerInit` error.
    pub fn status_tracer_init(reason: impl Into<String>) -> Self {
        InstrumentationError::StatusTracerInit {
            reason: reason.into(),
        }
    }
}

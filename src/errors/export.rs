// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Trace export errors.
//!
//! These never reach the caller of a decorated action. The adapter logs them
//! and returns the action's own result.

use std::time::Duration;

/// Errors that can occur while delivering a trace record.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The trace record could not be serialized.
    #[error("Failed to serialize trace record")]
    Serialize(#[from] serde_json::Error),

    /// The exporter did not finish within the configured send timeout.
    #[error("Trace export timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The exporter reported a failure.
    #[error("Trace export via {exporter} failed")]
    Exporter {
        /// Name of the exporter that failed
        exporter: String,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ExportError {
    /// Helper to create an `Exporter` error from any error type.
    pub fn exporter(
        exporter: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ExportError::Exporter {
            exporter: exporter.into(),
            source: Box::new(source),
        }
    }
}

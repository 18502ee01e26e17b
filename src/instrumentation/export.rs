// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Trace export.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn, Instrument};

use crate::errors::ExportError;
use crate::spans;

use super::record::TraceRecord;

/// Destination for finished trace records.
///
/// Implement this trait to ship traces to a collector. The adapter bounds
/// every export by the configured send timeout.
#[async_trait]
pub trait TraceExporter: Send + Sync {
    /// Deliver one trace record.
    async fn export(&self, record: &TraceRecord) -> Result<(), ExportError>;

    /// Exporter name for logging
    fn name(&self) -> &'static str;
}

/// Exporter writing trace records as JSON at `DEBUG` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogExporter;

#[async_trait]
impl TraceExporter for LogExporter {
    async fn export(&self, record: &TraceRecord) -> Result<(), ExportError> {
        let trace = serde_json::to_string(record)?;
        debug!(trace = %trace, "epsagon trace");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LogExporter"
    }
}

/// Export `record`, giving up after `timeout`.
///
/// Failures are logged and otherwise dropped.
pub(crate) async fn send_trace(
    exporter: &dyn TraceExporter,
    record: &TraceRecord,
    timeout: Duration,
) -> Result<(), ExportError> {
    let span = spans::export(exporter.name(), timeout);

    async {
        let result = match tokio::time::timeout(timeout, exporter.export(record)).await {
            Ok(result) => result,
            Err(_) => Err(ExportError::Timeout(timeout)),
        };

        if let Err(e) = &result {
            warn!(error = %e, exporter = exporter.name(), "Failed to send trace");
        }
        result
    }
    .instrument(span)
    .await
}

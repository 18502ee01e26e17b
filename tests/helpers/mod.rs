// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for helix-epsagon integration tests
//!
//! Provides counting collaborators so tests can observe when, and how often,
//! the instrumentation stack is used.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use helix_epsagon::{
    action_fn, ActionLogger, ActivationId, ActivationStatus, BoxAction, EpsagonLayer,
    EpsagonOptions, ExportError, Instrumentation, Invocation, StatusReporter, StatusTracer,
    TraceExporter, TraceRecord, TracingAdapter,
};
use serde_json::{json, Value};
use tower::BoxError;

/// Installs a test subscriber once; filter with `RUST_LOG`.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Call counts of the collaborators of one layer.
#[derive(Debug, Default)]
pub struct Counters {
    factory: AtomicUsize,
    adapter: AtomicUsize,
    status: AtomicUsize,
    last_options: Mutex<Option<Arc<EpsagonOptions>>>,
}

#[allow(dead_code)]
impl Counters {
    pub fn factory_calls(&self) -> usize {
        self.factory.load(Ordering::SeqCst)
    }

    pub fn adapter_calls(&self) -> usize {
        self.adapter.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status.load(Ordering::SeqCst)
    }

    /// Options the adapter received on its last call
    pub fn last_options(&self) -> Option<Arc<EpsagonOptions>> {
        self.last_options.lock().unwrap().clone()
    }
}

/// Pass-through adapter counting how often it wraps an action
pub struct CountingAdapter(Arc<Counters>);

impl TracingAdapter for CountingAdapter {
    fn instrument_action(&self, action: BoxAction, options: Arc<EpsagonOptions>) -> BoxAction {
        self.0.adapter.fetch_add(1, Ordering::SeqCst);
        *self.0.last_options.lock().unwrap() = Some(options);
        action
    }

    fn name(&self) -> &'static str {
        "CountingAdapter"
    }
}

/// Pass-through status tracer counting how often it wraps an action
pub struct CountingStatusTracer(Arc<Counters>);

impl StatusTracer for CountingStatusTracer {
    fn trace_action(&self, action: BoxAction) -> BoxAction {
        self.0.status.fetch_add(1, Ordering::SeqCst);
        action
    }
}

/// Layer with counting collaborators and a fixed activation id
#[allow(dead_code)]
pub fn counting_layer(options: EpsagonOptions) -> (EpsagonLayer, Arc<Counters>) {
    let counters = Arc::new(Counters::default());
    let shared = counters.clone();

    let layer = EpsagonLayer::new(options)
        .with_activation_id(ActivationId::fixed("act-123"))
        .with_instrumentation(move || {
            shared.factory.fetch_add(1, Ordering::SeqCst);
            Ok(Instrumentation::new(
                Arc::new(CountingAdapter(shared.clone())),
                Arc::new(CountingStatusTracer(shared.clone())),
            ))
        });

    (layer, counters)
}

/// Logger remembering every line
#[derive(Debug, Default)]
pub struct RecordingLogger {
    lines: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingLogger {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl ActionLogger for RecordingLogger {
    fn info(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }
}

/// Exporter keeping every trace record
#[derive(Debug, Default)]
pub struct CollectingExporter {
    records: Mutex<Vec<TraceRecord>>,
}

#[allow(dead_code)]
impl CollectingExporter {
    pub fn records(&self) -> Vec<TraceRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl TraceExporter for CollectingExporter {
    async fn export(&self, record: &TraceRecord) -> Result<(), ExportError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "CollectingExporter"
    }
}

/// Status reporter keeping every activation outcome
#[derive(Debug, Default)]
pub struct CollectingReporter {
    reports: Mutex<Vec<ActivationStatus>>,
}

#[allow(dead_code)]
impl CollectingReporter {
    pub fn reports(&self) -> Vec<ActivationStatus> {
        self.reports.lock().unwrap().clone()
    }
}

impl StatusReporter for CollectingReporter {
    fn report(&self, status: &ActivationStatus) {
        self.reports.lock().unwrap().push(status.clone());
    }
}

/// Action resolving to `{ "body": "ok" }`
#[allow(dead_code)]
pub fn ok_action() -> BoxAction {
    action_fn(|_: Invocation| async { Ok::<_, BoxError>(json!({ "body": "ok" })) })
}

/// Action resolving to a fixed value
#[allow(dead_code)]
pub fn returning(value: Value) -> BoxAction {
    action_fn(move |_: Invocation| {
        let value = value.clone();
        async move { Ok::<_, BoxError>(value) }
    })
}

/// Error type of failing test actions
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ActionFailure(pub String);

/// Action failing with `ActionFailure(message)`
#[allow(dead_code)]
pub fn failing(message: &'static str) -> BoxAction {
    action_fn(move |_: Invocation| async move {
        Err::<Value, _>(ActionFailure(message.to_string()))
    })
}

// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the epsagon decorator
//!
//! These tests exercise the public API end to end: token gating, lazy
//! instrumentation, header injection on web actions, and error pass-through.

mod helpers;

use std::{sync::Arc, time::Duration};

use helix_epsagon::{
    action_fn, epsagon, ActivationId, EpsagonError, EpsagonLayer, EpsagonOptions,
    EpsagonOptionsBuilder, EpsagonOverrides, Invocation,
};
use helpers::{
    counting_layer, failing, init_tracing, ok_action, returning, ActionFailure,
    CollectingExporter, CollectingReporter, RecordingLogger,
};
use serde_json::json;
use tower::{BoxError, Layer, ServiceExt};

/// No token, no method: the action's result comes back untouched
#[tokio::test]
async fn test_plain_invocation_is_untouched() {
    let result = epsagon(ok_action(), EpsagonOverrides::default())
        .oneshot(Invocation::default())
        .await
        .unwrap();

    assert_eq!(result, json!({ "body": "ok" }));
}

/// Web action without token: headers are added with the activation id
#[tokio::test]
async fn test_web_action_gets_activation_header() {
    let service = EpsagonLayer::default()
        .with_activation_id(ActivationId::fixed("act-42"))
        .layer(ok_action());

    let result = service
        .oneshot(Invocation::default().with_param("__ow_method", "get"))
        .await
        .unwrap();

    assert_eq!(
        result,
        json!({ "body": "ok", "headers": { "x-last-activation-id": "act-42" } })
    );
}

/// Token and method: instrumented once, header set
#[tokio::test]
async fn test_instrumented_web_action() {
    init_tracing();
    let (layer, counters) = counting_layer(EpsagonOptions::default());
    let service = layer.layer(ok_action());

    let result = service
        .oneshot(
            Invocation::default()
                .with_param("EPSAGON_TOKEN", "abc")
                .with_param("__ow_method", "get"),
        )
        .await
        .unwrap();

    assert_eq!(result["headers"]["x-last-activation-id"], "act-123");
    assert_eq!(result["body"], "ok");
    assert_eq!(counters.adapter_calls(), 1);
    assert_eq!(counters.status_calls(), 1);
}

/// A custom token parameter gates instrumentation instead of EPSAGON_TOKEN
#[tokio::test]
async fn test_custom_token_param() {
    let options = EpsagonOptions::resolve(EpsagonOverrides {
        token_param: Some("MY_TOKEN".to_string()),
        ..Default::default()
    });
    let (layer, counters) = counting_layer(options);

    let result = layer
        .layer(ok_action())
        .oneshot(Invocation::default().with_param("EPSAGON_TOKEN", "abc"))
        .await
        .unwrap();
    assert_eq!(result, json!({ "body": "ok" }));
    assert_eq!(counters.adapter_calls(), 0, "EPSAGON_TOKEN must not gate");

    layer
        .layer(ok_action())
        .oneshot(Invocation::default().with_param("MY_TOKEN", "x"))
        .await
        .unwrap();
    assert_eq!(counters.adapter_calls(), 1);
    assert_eq!(counters.last_options().unwrap().token_param, "MY_TOKEN");
}

/// Falsy token values do not trigger instrumentation
#[tokio::test]
async fn test_falsy_token_is_not_gated() {
    let (layer, counters) = counting_layer(EpsagonOptions::default());

    for token in [json!(""), json!(null), json!(false), json!(0)] {
        layer
            .layer(ok_action())
            .oneshot(Invocation::default().with_param("EPSAGON_TOKEN", token))
            .await
            .unwrap();
    }

    assert_eq!(counters.factory_calls(), 0);
    assert_eq!(counters.adapter_calls(), 0);
}

/// Collaborators are built once, but wrap the action on every gated call
#[tokio::test]
async fn test_instrumentation_built_once_per_layer() {
    let (layer, counters) = counting_layer(EpsagonOptions::default());
    let service = layer.layer(ok_action());

    for _ in 0..3 {
        service
            .clone()
            .oneshot(Invocation::default().with_param("EPSAGON_TOKEN", "abc"))
            .await
            .unwrap();
    }

    assert_eq!(counters.factory_calls(), 1);
    assert_eq!(counters.adapter_calls(), 3);
    assert_eq!(counters.status_calls(), 3);
}

/// The adapter receives the resolved options
#[tokio::test]
async fn test_adapter_receives_options() {
    let options = EpsagonOptionsBuilder::new()
        .app_name("Helix Pipeline")
        .metadata_only(true)
        .build();
    let (layer, counters) = counting_layer(options.clone());

    layer
        .layer(ok_action())
        .oneshot(Invocation::default().with_param("EPSAGON_TOKEN", "abc"))
        .await
        .unwrap();

    assert_eq!(*counters.last_options().unwrap(), options);
}

/// Action errors pass through unchanged, without instrumentation
#[tokio::test]
async fn test_error_passes_through_directly() {
    let err = epsagon(failing("boom"), EpsagonOverrides::default())
        .oneshot(Invocation::default())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "boom");
    assert!(err.downcast_ref::<ActionFailure>().is_some());
}

/// Action errors pass through unchanged, with instrumentation
#[tokio::test]
async fn test_error_passes_through_instrumented() {
    let (layer, _) = counting_layer(EpsagonOptions::default());

    let err = layer
        .layer(failing("boom"))
        .oneshot(Invocation::default().with_param("EPSAGON_TOKEN", "abc"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "boom");
    assert!(err.downcast_ref::<ActionFailure>().is_some());
}

/// Errors of web actions pass through without header injection
#[tokio::test]
async fn test_web_action_error_passes_through() {
    let err = EpsagonLayer::default()
        .with_activation_id(ActivationId::fixed("act-1"))
        .layer(failing("not found"))
        .oneshot(Invocation::default().with_param("__ow_method", "get"))
        .await
        .unwrap_err();

    assert!(err.downcast_ref::<ActionFailure>().is_some());
    assert!(err.downcast_ref::<EpsagonError>().is_none());
}

/// The default in-process instrumentation is transparent as well
#[tokio::test]
async fn test_default_instrumentation_is_transparent() -> anyhow::Result<()> {
    init_tracing();
    let service = EpsagonLayer::default()
        .with_activation_id(ActivationId::fixed("act-9"))
        .layer(returning(json!({ "statusCode": 200, "body": "<html/>" })));

    let result = service
        .oneshot(
            Invocation::default()
                .with_param("EPSAGON_TOKEN", "abc")
                .with_param("__ow_method", "post")
                .with_param("owner", "adobe"),
        )
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    assert_eq!(
        result,
        json!({
            "statusCode": 200,
            "body": "<html/>",
            "headers": { "x-last-activation-id": "act-9" },
        })
    );
    Ok(())
}

/// The injected runtime logger gets the instrumentation notice
#[tokio::test]
async fn test_injected_logger_is_used() {
    let (layer, _) = counting_layer(EpsagonOptions::default());
    let logger = Arc::new(RecordingLogger::default());

    layer
        .layer(ok_action())
        .oneshot(
            Invocation::default()
                .with_param("EPSAGON_TOKEN", "abc")
                .with_logger(logger.clone()),
        )
        .await
        .unwrap();

    assert_eq!(logger.lines(), vec!["instrumenting epsagon.".to_string()]);
}

/// Nothing is logged to the injected logger on the direct path
#[tokio::test]
async fn test_logger_silent_without_token() {
    let logger = Arc::new(RecordingLogger::default());

    epsagon(ok_action(), EpsagonOverrides::default())
        .oneshot(Invocation::default().with_logger(logger.clone()))
        .await
        .unwrap();

    assert!(logger.lines().is_empty());
}

/// Existing headers survive injection
#[tokio::test]
async fn test_existing_headers_preserved() {
    let service = EpsagonLayer::default()
        .with_activation_id(ActivationId::fixed("act-2"))
        .layer(returning(json!({
            "statusCode": 302,
            "headers": { "location": "/index.html", "x-last-activation-id": "stale" },
        })));

    let result = service
        .oneshot(Invocation::default().with_param("__ow_method", "get"))
        .await
        .unwrap();

    assert_eq!(
        result["headers"],
        json!({ "location": "/index.html", "x-last-activation-id": "act-2" })
    );
}

/// Results that cannot carry headers fail loudly on web actions
#[tokio::test]
async fn test_string_result_fails_on_web_action() {
    let err = EpsagonLayer::default()
        .with_activation_id(ActivationId::fixed("act-3"))
        .layer(returning(json!("ok")))
        .oneshot(Invocation::default().with_param("__ow_method", "get"))
        .await
        .unwrap_err();

    let err = err.downcast_ref::<EpsagonError>().unwrap();
    assert!(matches!(err, EpsagonError::MalformedResult { found: "string" }));
}

/// Failing instrumentation is fatal, there is no fallback to direct execution
#[tokio::test]
async fn test_instrumentation_failure_is_fatal() {
    let service = EpsagonLayer::default()
        .with_instrumentation(|| {
            Err(helix_epsagon::InstrumentationError::status_tracer_init(
                "status channel unavailable",
            ))
        })
        .layer(ok_action());

    let err = service
        .clone()
        .oneshot(Invocation::default().with_param("EPSAGON_TOKEN", "abc"))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EpsagonError>(),
        Some(EpsagonError::InstrumentationUnavailable(_))
    ));

    // Ungated invocations are unaffected
    let result = service.oneshot(Invocation::default()).await.unwrap();
    assert_eq!(result, json!({ "body": "ok" }));
}

/// Traces and status reports are attributed to the layer's activation id
#[tokio::test]
async fn test_fixed_activation_id_reaches_trace_and_status() {
    let exporter = Arc::new(CollectingExporter::default());
    let reporter = Arc::new(CollectingReporter::default());
    let service = EpsagonLayer::default()
        .with_trace_exporter(exporter.clone())
        .with_status_reporter(reporter.clone())
        .with_activation_id(ActivationId::fixed("act-77"))
        .layer(ok_action());

    let result = service
        .oneshot(
            Invocation::default()
                .with_param("EPSAGON_TOKEN", "abc")
                .with_param("__ow_method", "get"),
        )
        .await
        .unwrap();
    assert_eq!(result["headers"]["x-last-activation-id"], "act-77");

    let records = exporter.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].activation_id.as_deref(), Some("act-77"));

    let reports = reporter.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].activation_id.as_deref(), Some("act-77"));

    // Trace and status agree on the code of a result without statusCode
    assert_eq!(records[0].status_code, 200);
    assert_eq!(reports[0].status_code, Some(200));
}

/// The activation id may be set before the sinks
#[tokio::test]
async fn test_activation_id_survives_sink_changes() {
    let exporter = Arc::new(CollectingExporter::default());
    let reporter = Arc::new(CollectingReporter::default());
    let service = EpsagonLayer::default()
        .with_activation_id(ActivationId::fixed("act-78"))
        .with_trace_exporter(exporter.clone())
        .with_status_reporter(reporter.clone())
        .layer(ok_action());

    service
        .oneshot(Invocation::default().with_param("EPSAGON_TOKEN", "abc"))
        .await
        .unwrap();

    assert_eq!(exporter.records()[0].activation_id.as_deref(), Some("act-78"));
    assert_eq!(reporter.reports()[0].activation_id.as_deref(), Some("act-78"));
}

/// Only the export is bounded by send_timeout, never the action
#[tokio::test(start_paused = true)]
async fn test_slow_action_is_not_timed_out() {
    let exporter = Arc::new(CollectingExporter::default());
    let options = EpsagonOptionsBuilder::new()
        .send_timeout(Duration::from_millis(100))
        .build();
    let service = EpsagonLayer::new(options)
        .with_trace_exporter(exporter.clone())
        .with_activation_id(ActivationId::fixed("act-5"))
        .layer(action_fn(|_: Invocation| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, BoxError>(json!({ "body": "late" }))
        }));

    let start = tokio::time::Instant::now();
    let result = service
        .oneshot(Invocation::default().with_param("EPSAGON_TOKEN", "abc"))
        .await
        .unwrap();

    assert_eq!(result, json!({ "body": "late" }));
    assert!(start.elapsed() >= Duration::from_secs(30));
    assert!(exporter.records()[0].duration_ms >= 30_000);
}

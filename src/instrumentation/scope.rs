// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Task-local trace scope for outbound HTTP events.
//!
//! While a traced action runs, a scope is installed for its task. Code inside
//! the action reports outbound calls with [`record_http_event`]; the adapter
//! collects them into the trace record.

use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use crate::config::EpsagonOptions;

use super::record::HttpEvent;

tokio::task_local! {
    static CURRENT_SCOPE: Arc<TraceScope>;
}

/// Events collected for one traced invocation.
#[derive(Debug)]
pub(crate) struct TraceScope {
    options: Arc<EpsagonOptions>,
    events: Mutex<Vec<HttpEvent>>,
}

impl TraceScope {
    pub(crate) fn new(options: Arc<EpsagonOptions>) -> Arc<Self> {
        Arc::new(Self {
            options,
            events: Mutex::new(Vec::new()),
        })
    }

    /// Run `future` with this scope as the current one.
    pub(crate) async fn run<F: Future>(self: &Arc<Self>, future: F) -> F::Output {
        CURRENT_SCOPE.scope(self.clone(), future).await
    }

    fn record(&self, url: &str, status_code: u16) -> bool {
        if self.options.is_url_ignored(url) {
            return false;
        }
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(HttpEvent {
                url: url.to_string(),
                status_code,
            });
        true
    }

    /// Take the collected events.
    pub(crate) fn take_events(&self) -> Vec<HttpEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Record an outbound HTTP call in the current trace.
///
/// Returns true if the call was recorded. Nothing is recorded outside of a
/// traced invocation, or when `url` matches an ignored URL pattern.
///
/// # Example
///
/// ```rust,ignore
/// use helix_epsagon::{action_fn, record_http_event};
///
/// let action = action_fn(|params| async move {
///     let response = client.get(CONTENT_URL).send().await?;
///     record_http_event(CONTENT_URL, response.status().as_u16());
///     Ok(json!({ "statusCode": 200 }))
/// });
/// ```
pub fn record_http_event(url: &str, status_code: u16) -> bool {
    CURRENT_SCOPE
        .try_with(|scope| scope.record(url, status_code))
        .unwrap_or(false)
}

// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Actions as Tower services.
//!
//! An action is any `tower::Service<Invocation, Response = serde_json::Value>`.
//! Collaborators that wrap actions exchange them type-erased as [`BoxAction`].

use std::future::Future;

use serde_json::Value;
use tower::{util::BoxCloneService, BoxError, Service, ServiceExt};

use crate::invocation::Invocation;

/// A type-erased, cloneable action.
pub type BoxAction = BoxCloneService<Invocation, Value, BoxError>;

/// Turns an async function into an action.
///
/// # Example
///
/// ```rust
/// use helix_epsagon::{action_fn, Invocation};
/// use serde_json::{json, Value};
///
/// let action = action_fn(|params: Invocation| async move {
///     let owner = params.get("owner").cloned().unwrap_or(Value::Null);
///     Ok::<_, std::io::Error>(json!({ "body": owner }))
/// });
/// ```
pub fn action_fn<F, Fut, E>(f: F) -> BoxAction
where
    F: Fn(Invocation) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Result<Value, E>> + Send + 'static,
    E: Into<BoxError> + 'static,
{
    BoxCloneService::new(tower::service_fn(f).map_err(|err: E| err.into()))
}

/// Erases the type of any action service.
pub fn boxed<S>(action: S) -> BoxAction
where
    S: Service<Invocation, Response = Value> + Clone + Send + 'static,
    S::Error: Into<BoxError> + 'static,
    S::Future: Send + 'static,
{
    BoxCloneService::new(action.map_err(|err: S::Error| err.into()))
}

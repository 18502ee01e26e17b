// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Invocation parameters of an action.
//!
//! The action runtime passes a JSON object of parameters to every activation,
//! with reserved `__ow_` keys for runtime data such as the HTTP method of a web
//! action. The runtime logger cannot travel inside JSON, so it has its own
//! typed slot next to the parameters.

use std::{fmt, sync::Arc};

use serde_json::{Map, Value};

use crate::config::constants::runtime::METHOD_PARAM;

/// Logger capability handed to actions by the runtime.
pub trait ActionLogger: Send + Sync {
    /// Log an informational message.
    fn info(&self, message: &str);
}

/// Default logger, writing through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ActionLogger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }
}

/// Parameters of a single action invocation.
///
/// # Example
///
/// ```rust
/// use helix_epsagon::Invocation;
/// use serde_json::json;
///
/// let invocation = Invocation::from_json(json!({
///     "__ow_method": "get",
///     "owner": "adobe",
/// }));
///
/// assert!(invocation.is_http());
/// assert_eq!(invocation.method(), Some("get"));
/// ```
#[derive(Clone, Default)]
pub struct Invocation {
    params: Map<String, Value>,
    logger: Option<Arc<dyn ActionLogger>>,
}

impl Invocation {
    /// Creates an invocation from a parameter map.
    pub fn new(params: Map<String, Value>) -> Self {
        Self {
            params,
            logger: None,
        }
    }

    /// Creates an invocation from a JSON value.
    ///
    /// Anything but an object yields an invocation without parameters.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(params) => Self::new(params),
            _ => Self::default(),
        }
    }

    /// Sets a parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Injects the runtime logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn ActionLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// All parameters.
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// A single parameter.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Returns true if `key` is present with a truthy value.
    pub fn is_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(is_truthy)
    }

    /// The HTTP method of a web action invocation.
    pub fn method(&self) -> Option<&str> {
        self.get(METHOD_PARAM)
            .filter(|value| is_truthy(value))
            .and_then(Value::as_str)
    }

    /// Returns true for web action invocations, whose results are HTTP responses.
    pub fn is_http(&self) -> bool {
        self.is_truthy(METHOD_PARAM)
    }

    /// The logger injected by the runtime, if any.
    pub fn logger(&self) -> Option<&Arc<dyn ActionLogger>> {
        self.logger.as_ref()
    }
}

impl From<Map<String, Value>> for Invocation {
    fn from(params: Map<String, Value>) -> Self {
        Self::new(params)
    }
}

// Parameter values may hold secrets, only keys are printed.
impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("params", &self.params.keys().collect::<Vec<_>>())
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

/// Truthiness of a parameter value as seen by the action runtime.
///
/// `null`, `false`, zero and the empty string are falsy. Everything else is
/// truthy, including empty arrays and objects.
///
/// # Example
///
/// ```rust
/// use helix_epsagon::is_truthy;
/// use serde_json::json;
///
/// assert!(is_truthy(&json!("abc")));
/// assert!(is_truthy(&json!({})));
/// assert!(!is_truthy(&json!("")));
/// assert!(!is_truthy(&json!(0)));
/// ```
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

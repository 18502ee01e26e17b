// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Configuration for the epsagon decorator
//!
//! Options are resolved once, when the decorator is built, by merging caller
//! overrides over the defaults. The result is never mutated afterwards.
//!
//! # Example: Using defaults
//!
//! ```rust
//! use helix_epsagon::EpsagonOptions;
//!
//! let options = EpsagonOptions::default();
//! assert_eq!(options.token_param, "EPSAGON_TOKEN");
//! ```
//!
//! # Example: Overrides from action parameters
//!
//! ```rust
//! use helix_epsagon::{EpsagonOptions, EpsagonOverrides};
//! use serde_json::json;
//!
//! let overrides = EpsagonOverrides::from_json(json!({
//!     "token_param": "MY_TOKEN",
//!     "appName": "Helix Pipeline",
//!     "sendTimeout": 500,
//! }))
//! .unwrap();
//!
//! let options = EpsagonOptions::resolve(overrides);
//! assert_eq!(options.token_param, "MY_TOKEN");
//! assert_eq!(options.send_timeout.as_millis(), 500);
//! ```
//!
//! # Example: Builder
//!
//! ```rust
//! use helix_epsagon::EpsagonOptionsBuilder;
//! use std::time::Duration;
//!
//! let options = EpsagonOptionsBuilder::new()
//!     .app_name("Helix Admin")
//!     .send_timeout(Duration::from_secs(1))
//!     .ignore_key("owner".parse().unwrap())
//!     .build();
//! ```

use std::time::Duration;

use serde::{Deserialize, Deserializer};

pub mod constants;
mod pattern;

pub use pattern::KeyPattern;

use constants::{
    default_ignored_keys, default_url_patterns_to_ignore, DEFAULT_APP_NAME,
    DEFAULT_HTTP_ERROR_STATUS_CODE, DEFAULT_SEND_TIMEOUT, DEFAULT_TOKEN_PARAM,
};

/// Resolved options of the epsagon decorator
///
/// Use [`EpsagonOptionsBuilder`] for a fluent API, or [`EpsagonOptions::resolve`]
/// to apply caller overrides over the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct EpsagonOptions {
    /// Upper bound for sending a trace, enforced by the tracing adapter
    /// Default: 2000ms
    pub send_timeout: Duration,

    /// Invocation parameter whose truthy presence enables instrumentation
    /// Default: `EPSAGON_TOKEN`
    pub token_param: String,

    /// Name of this application in traces
    /// Default: `Helix Services`
    pub app_name: String,

    /// Only send trace metadata (no parameters, no bodies)
    /// Default: false
    pub metadata_only: bool,

    /// Parameter keys kept out of traces
    pub ignored_keys: Vec<KeyPattern>,

    /// Status code attributed to a failed invocation
    /// Default: 500
    pub http_error_status_code: u16,

    /// Outbound URLs kept out of traces
    pub url_patterns_to_ignore: Vec<KeyPattern>,

    /// Do not capture response bodies
    /// Default: true
    pub disable_http_response_body_capture: bool,
}

impl Default for EpsagonOptions {
    fn default() -> Self {
        Self {
            send_timeout: DEFAULT_SEND_TIMEOUT,
            token_param: DEFAULT_TOKEN_PARAM.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            metadata_only: false,
            ignored_keys: default_ignored_keys(),
            http_error_status_code: DEFAULT_HTTP_ERROR_STATUS_CODE,
            url_patterns_to_ignore: default_url_patterns_to_ignore(),
            disable_http_response_body_capture: true,
        }
    }
}

impl EpsagonOptions {
    /// Defaults with `overrides` applied.
    pub fn resolve(overrides: EpsagonOverrides) -> Self {
        Self::default().merge(overrides)
    }

    /// Shallow merge: every override that is set replaces the current value.
    ///
    /// Pattern lists are replaced as a whole, never extended.
    ///
    /// # Example
    ///
    /// ```rust
    /// use helix_epsagon::{EpsagonOptions, EpsagonOverrides, KeyPattern};
    ///
    /// let options = EpsagonOptions::default().merge(EpsagonOverrides {
    ///     ignored_keys: Some(vec![KeyPattern::exact("secret")]),
    ///     ..Default::default()
    /// });
    ///
    /// assert_eq!(options.ignored_keys, vec![KeyPattern::exact("secret")]);
    /// assert_eq!(options.app_name, "Helix Services");
    /// ```
    #[must_use]
    pub fn merge(mut self, overrides: EpsagonOverrides) -> Self {
        let EpsagonOverrides {
            send_timeout,
            token_param,
            app_name,
            metadata_only,
            ignored_keys,
            http_error_status_code,
            url_patterns_to_ignore,
            disable_http_response_body_capture,
        } = overrides;

        if let Some(send_timeout) = send_timeout {
            self.send_timeout = send_timeout;
        }
        if let Some(token_param) = token_param {
            self.token_param = token_param;
        }
        if let Some(app_name) = app_name {
            self.app_name = app_name;
        }
        if let Some(metadata_only) = metadata_only {
            self.metadata_only = metadata_only;
        }
        if let Some(ignored_keys) = ignored_keys {
            self.ignored_keys = ignored_keys;
        }
        if let Some(code) = http_error_status_code {
            self.http_error_status_code = code;
        }
        if let Some(patterns) = url_patterns_to_ignore {
            self.url_patterns_to_ignore = patterns;
        }
        if let Some(disable) = disable_http_response_body_capture {
            self.disable_http_response_body_capture = disable;
        }
        self
    }

    /// Returns true if the parameter `key` must be kept out of traces.
    ///
    /// The token parameter itself is always ignored, even when a custom name
    /// does not match any of the configured patterns.
    pub fn is_key_ignored(&self, key: &str) -> bool {
        key == self.token_param || self.ignored_keys.iter().any(|p| p.matches(key))
    }

    /// Returns true if the outbound `url` must be kept out of traces.
    ///
    /// Exact patterns match anywhere in the URL, so a domain or a path
    /// fragment is enough. Regular expressions are searched in the full URL
    /// and in its host.
    ///
    /// # Example
    ///
    /// ```rust
    /// use helix_epsagon::EpsagonOptions;
    ///
    /// let options = EpsagonOptions::default();
    /// assert!(options.is_url_ignored("https://api.coralogix.com/logs/rest/singles"));
    /// assert!(!options.is_url_ignored("https://adobe.io/"));
    /// ```
    pub fn is_url_ignored(&self, url: &str) -> bool {
        let host = url::Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_owned));

        self.url_patterns_to_ignore.iter().any(|pattern| match pattern {
            KeyPattern::Exact(fragment) => url.contains(fragment.as_str()),
            KeyPattern::Regex(regex) => {
                regex.is_match(url) || host.as_deref().is_some_and(|h| regex.is_match(h))
            }
        })
    }

    /// Whether response bodies end up in traces.
    pub fn captures_response_body(&self) -> bool {
        !self.metadata_only && !self.disable_http_response_body_capture
    }
}

/// Caller-supplied option overrides
///
/// Every field is optional; unset fields keep their default. Deserializes
/// from the camelCase keys used by the action runtime (`sendTimeout` in
/// milliseconds, `token_param`, `appName`, `metadataOnly`, `ignoredKeys`,
/// `httpErrorStatusCode`, `urlPatternsToIgnore`,
/// `disableHttpResponseBodyCapture`). Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EpsagonOverrides {
    /// Override for [`EpsagonOptions::send_timeout`]
    #[serde(deserialize_with = "deserialize_millis")]
    pub send_timeout: Option<Duration>,
    /// Override for [`EpsagonOptions::token_param`]
    #[serde(rename = "token_param")]
    pub token_param: Option<String>,
    /// Override for [`EpsagonOptions::app_name`]
    pub app_name: Option<String>,
    /// Override for [`EpsagonOptions::metadata_only`]
    pub metadata_only: Option<bool>,
    /// Override for [`EpsagonOptions::ignored_keys`]
    pub ignored_keys: Option<Vec<KeyPattern>>,
    /// Override for [`EpsagonOptions::http_error_status_code`]
    pub http_error_status_code: Option<u16>,
    /// Override for [`EpsagonOptions::url_patterns_to_ignore`]
    pub url_patterns_to_ignore: Option<Vec<KeyPattern>>,
    /// Override for [`EpsagonOptions::disable_http_response_body_capture`]
    pub disable_http_response_body_capture: Option<bool>,
}

impl EpsagonOverrides {
    /// Parses overrides from a JSON object.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

fn deserialize_millis<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
}

/// Builder for [`EpsagonOptions`]
///
/// Starts from the defaults.
///
/// # Example
///
/// ```rust
/// use helix_epsagon::EpsagonOptionsBuilder;
///
/// let options = EpsagonOptionsBuilder::new()
///     .token_param("MY_TOKEN")
///     .metadata_only(true)
///     .build();
///
/// assert_eq!(options.token_param, "MY_TOKEN");
/// ```
#[derive(Debug, Default)]
pub struct EpsagonOptionsBuilder {
    options: EpsagonOptions,
}

impl EpsagonOptionsBuilder {
    /// Create a new builder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trace send timeout
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.options.send_timeout = timeout;
        self
    }

    /// Set the name of the token parameter
    pub fn token_param(mut self, name: impl Into<String>) -> Self {
        self.options.token_param = name.into();
        self
    }

    /// Set the application name
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.options.app_name = name.into();
        self
    }

    /// Only send trace metadata
    pub fn metadata_only(mut self, metadata_only: bool) -> Self {
        self.options.metadata_only = metadata_only;
        self
    }

    /// Replace the ignored parameter key patterns
    pub fn ignored_keys(mut self, patterns: Vec<KeyPattern>) -> Self {
        self.options.ignored_keys = patterns;
        self
    }

    /// Convenience: add one ignored parameter key pattern
    pub fn ignore_key(mut self, pattern: KeyPattern) -> Self {
        self.options.ignored_keys.push(pattern);
        self
    }

    /// Set the status code attributed to failed invocations
    pub fn http_error_status_code(mut self, code: u16) -> Self {
        self.options.http_error_status_code = code;
        self
    }

    /// Replace the ignored URL patterns
    pub fn url_patterns_to_ignore(mut self, patterns: Vec<KeyPattern>) -> Self {
        self.options.url_patterns_to_ignore = patterns;
        self
    }

    /// Convenience: add one ignored URL pattern
    pub fn ignore_url(mut self, pattern: KeyPattern) -> Self {
        self.options.url_patterns_to_ignore.push(pattern);
        self
    }

    /// Enable or disable response body capture suppression
    pub fn disable_http_response_body_capture(mut self, disable: bool) -> Self {
        self.options.disable_http_response_body_capture = disable;
        self
    }

    /// Build the final options
    pub fn build(self) -> EpsagonOptions {
        self.options
    }
}

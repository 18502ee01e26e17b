// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Well-known names and default option values
//!
//! This module centralizes the reserved names of the action runtime and the
//! defaults of [`EpsagonOptions`](super::EpsagonOptions).

use std::sync::LazyLock;
use std::time::Duration;

use super::KeyPattern;

/// Reserved parameter and environment names of the action runtime
pub mod runtime {
    /// Parameter carrying the HTTP method of a web action invocation
    pub const METHOD_PARAM: &str = "__ow_method";

    /// Environment variable holding the id of the current activation
    pub const ACTIVATION_ID_ENV: &str = "__OW_ACTIVATION_ID";

    /// Response header correlating a web response with its activation
    pub const LAST_ACTIVATION_ID_HEADER: &str = "x-last-activation-id";
}

/// Default upper bound for sending a trace
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(2000);

/// Default parameter holding the tracing token
pub const DEFAULT_TOKEN_PARAM: &str = "EPSAGON_TOKEN";

/// Default application name reported with every trace
pub const DEFAULT_APP_NAME: &str = "Helix Services";

/// Status code attributed to a successful result without `statusCode`
pub const DEFAULT_SUCCESS_STATUS_CODE: u16 = 200;

/// Default status code attributed to a failed invocation
pub const DEFAULT_HTTP_ERROR_STATUS_CODE: u16 = 500;

/// Telemetry ingestion host that must never be traced
pub const TELEMETRY_INGESTION_HOST: &str = "api.coralogix.com";

static UPPERCASE_KEY: LazyLock<KeyPattern> = LazyLock::new(|| {
    KeyPattern::regex("^[A-Z][A-Z0-9_]+$").expect("uppercase key pattern is a valid regex")
});

static RESERVED_KEY: LazyLock<KeyPattern> = LazyLock::new(|| {
    KeyPattern::regex("^__ow_.*").expect("reserved key pattern is a valid regex")
});

/// Default parameter keys kept out of traces.
///
/// Upper-case identifiers (secrets and tokens by convention), runtime-reserved
/// `__ow_` keys, `authorization` and `request_body`.
pub fn default_ignored_keys() -> Vec<KeyPattern> {
    vec![
        UPPERCASE_KEY.clone(),
        RESERVED_KEY.clone(),
        KeyPattern::exact("authorization"),
        KeyPattern::exact("request_body"),
    ]
}

/// Default outbound URLs kept out of traces.
pub fn default_url_patterns_to_ignore() -> Vec<KeyPattern> {
    vec![KeyPattern::exact(TELEMETRY_INGESTION_HOST)]
}

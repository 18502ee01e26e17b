// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Correlation header injection for web action responses.

use serde_json::{Map, Value};
use tracing::warn;

use crate::config::constants::runtime::LAST_ACTIVATION_ID_HEADER;
use crate::errors::EpsagonError;

/// Ensures `response` has a `headers` object and sets `x-last-activation-id`.
///
/// Other header entries are left untouched. When the activation id is
/// unknown the `headers` object is still created but the correlation header
/// is left out.
///
/// Fails with [`EpsagonError::MalformedResult`] when the response is not an
/// object, or when its `headers` entry is not an object.
pub(crate) fn inject_activation_header(
    response: &mut Value,
    activation_id: Option<&str>,
) -> Result<(), EpsagonError> {
    let Value::Object(fields) = response else {
        return Err(EpsagonError::malformed_result(response));
    };

    let headers = fields
        .entry("headers")
        .or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(headers) = headers else {
        return Err(EpsagonError::malformed_result(headers));
    };

    match activation_id {
        Some(id) => {
            headers.insert(LAST_ACTIVATION_ID_HEADER.to_string(), Value::from(id));
        }
        None => warn!("No activation id available, skipping {LAST_ACTIVATION_ID_HEADER} header"),
    }

    Ok(())
}

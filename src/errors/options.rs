// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Option parsing errors.

/// Errors that can occur when building [`EpsagonOptions`](crate::EpsagonOptions)
/// from caller-supplied values.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    /// A `/…/` pattern is not a valid regular expression.
    #[error("Invalid pattern {pattern}")]
    InvalidPattern {
        /// The pattern as given by the caller
        pattern: String,
        /// The underlying regex error
        #[source]
        source: regex::Error,
    },
}

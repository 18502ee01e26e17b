// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Key and URL patterns used to keep data out of traces.

use std::{fmt, str::FromStr};

use regex::Regex;
use serde::Deserialize;

use crate::errors::OptionsError;

/// A pattern matching parameter keys or outbound URLs.
///
/// Patterns are either an exact string or a regular expression. When parsed
/// from a string, a value wrapped in slashes (`/^__ow_.*/`) is compiled as a
/// regular expression and anything else is taken literally.
///
/// Regular expressions are searched, not anchored: add `^`/`$` to match the
/// whole candidate.
///
/// # Example
///
/// ```rust
/// use helix_epsagon::KeyPattern;
///
/// let exact: KeyPattern = "authorization".parse().unwrap();
/// assert!(exact.matches("authorization"));
/// assert!(!exact.matches("Authorization"));
///
/// let reserved: KeyPattern = "/^__ow_.*/".parse().unwrap();
/// assert!(reserved.matches("__ow_method"));
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "String")]
pub enum KeyPattern {
    /// Matches a candidate equal to the string
    Exact(String),
    /// Matches a candidate the regular expression finds a match in
    Regex(Regex),
}

impl KeyPattern {
    /// Creates a pattern matching exactly `value`.
    pub fn exact(value: impl Into<String>) -> Self {
        KeyPattern::Exact(value.into())
    }

    /// Compiles `pattern` (without surrounding slashes) as a regular expression.
    pub fn regex(pattern: &str) -> Result<Self, OptionsError> {
        Regex::new(pattern)
            .map(KeyPattern::Regex)
            .map_err(|source| OptionsError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Parses the string form: `/…/` is a regular expression, anything else exact.
    pub fn parse(value: &str) -> Result<Self, OptionsError> {
        match value
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
        {
            Some(inner) => Self::regex(inner),
            None => Ok(Self::exact(value)),
        }
    }

    /// Returns true if `candidate` matches this pattern.
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            KeyPattern::Exact(value) => value == candidate,
            KeyPattern::Regex(regex) => regex.is_match(candidate),
        }
    }

    /// Returns true if this is a regular expression pattern.
    pub fn is_regex(&self) -> bool {
        matches!(self, KeyPattern::Regex(_))
    }
}

impl PartialEq for KeyPattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (KeyPattern::Exact(a), KeyPattern::Exact(b)) => a == b,
            (KeyPattern::Regex(a), KeyPattern::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl Eq for KeyPattern {}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPattern::Exact(value) => f.write_str(value),
            KeyPattern::Regex(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

impl FromStr for KeyPattern {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for KeyPattern {
    type Error = OptionsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Regex> for KeyPattern {
    fn from(regex: Regex) -> Self {
        KeyPattern::Regex(regex)
    }
}

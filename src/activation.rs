// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Access to the id of the current activation.
//!
//! The runtime exports the id through the process environment at the start
//! of every activation. All reads of it go through [`ActivationId`], which
//! can also carry a fixed id for hosts that pass it explicitly.

use std::sync::Arc;

use crate::config::constants::runtime::ACTIVATION_ID_ENV;

/// Source of the current activation id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActivationId {
    /// Read `__OW_ACTIVATION_ID` from the environment on every call
    #[default]
    Environment,
    /// Always the given id
    Fixed(Arc<str>),
}

impl ActivationId {
    /// A source that always yields `id`.
    pub fn fixed(id: impl Into<Arc<str>>) -> Self {
        ActivationId::Fixed(id.into())
    }

    /// The current activation id, if known.
    ///
    /// A variable that is set but empty yields `Some("")`.
    pub fn current(&self) -> Option<String> {
        match self {
            ActivationId::Environment => std::env::var(ACTIVATION_ID_ENV).ok(),
            ActivationId::Fixed(id) => Some(id.to_string()),
        }
    }
}

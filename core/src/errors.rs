// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Errors produced by the set engine.
///
/// The parse variants are per-record: the loader reports them and drops
/// the record. Everything else propagates to the top and terminates the
/// run with a nonzero exit.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("invalid netmask '{0}'")]
    InvalidMask(String),

    #[error("invalid prefix {0}")]
    InvalidPrefix(u8),

    #[error(
        "out of range limits: {lo:#x}-{hi:#x} for network {base:#x}/{prefix} (broadcast {bc:#x})"
    )]
    SplitBounds {
        lo: u32,
        hi: u32,
        base: u32,
        prefix: u8,
        bc: u32,
    },

    #[error("{name}: {reason}")]
    Snapshot { name: String, reason: String },

    #[error("cannot resolve '{host}': {reason}")]
    Lookup { host: String, reason: String },

    #[error("resolver unavailable: {reason}")]
    Resolver { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub(crate) fn snapshot(name: &str, reason: impl Into<String>) -> Self {
        Self::Snapshot {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the attribute layer.

use crate::transaction::TransactionState;
use rigplug_scene::SceneError;
use thiserror::Error;

/// Errors raised by attribute reads, writes and graph edits
#[derive(Debug, Error)]
pub enum AttrError {
    /// No write handling exists for the plug's type, or the value kind is wrong for it
    #[error("Unsupported type on {plug}: {detail}")]
    UnsupportedType {
        /// Target plug
        plug: String,
        /// What could not be handled
        detail: String,
    },

    /// Supplied value length differs from the plug's element or child count
    #[error("Arity mismatch on {plug}: expected {expected}, got {got}")]
    ArityMismatch {
        /// Target plug
        plug: String,
        /// Element or child count of the plug
        expected: usize,
        /// Length of the supplied value
        got: usize,
    },

    /// Destination already has an incoming connection and force was off
    #[error("{destination} is already connected from {existing}")]
    AlreadyConnected {
        /// Destination plug
        destination: String,
        /// Current source plug
        existing: String,
    },

    /// Logical index outside the host's valid range
    #[error("Invalid element {index} on {plug}")]
    InvalidElement {
        /// Array plug
        plug: String,
        /// Offending logical index
        index: u32,
    },

    /// Apply called on a transaction that already ran
    #[error("Transaction already {0:?}")]
    TransactionClosed(TransactionState),

    /// Descriptor payload could not be decoded for the target plug
    #[error("Malformed descriptor for {plug}: {detail}")]
    Descriptor {
        /// Target plug
        plug: String,
        /// What was wrong
        detail: String,
    },

    /// Configuration could not be parsed or written
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by the scene host
    #[error(transparent)]
    Scene(SceneError),
}

impl From<SceneError> for AttrError {
    fn from(e: SceneError) -> Self {
        match e {
            SceneError::IndexOutOfRange { plug, index } => Self::InvalidElement { plug, index },
            other => Self::Scene(other),
        }
    }
}

/// Result type for attribute layer operations
pub type Result<T> = std::result::Result<T, AttrError>;

impl AttrError {
    pub(crate) fn unsupported(plug: &impl ToString, detail: impl Into<String>) -> Self {
        Self::UnsupportedType {
            plug: plug.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn arity(plug: &impl ToString, expected: usize, got: usize) -> Self {
        Self::ArityMismatch {
            plug: plug.to_string(),
            expected,
            got,
        }
    }
}

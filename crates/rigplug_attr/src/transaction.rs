// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ordered batches of pending graph edits.
//!
//! A transaction is applied once, strictly in FIFO order. There is no
//! rollback: if an op fails, every op before it stays applied and the
//! transaction ends up `Failed`. Callers that need all-or-nothing semantics
//! snapshot the scene before applying and restore it on error.

use crate::error::{AttrError, Result};
use rigplug_scene::{Plug, SceneError, SceneHost, Value};
use std::fmt;

/// One pending graph edit
#[derive(Debug, Clone, PartialEq)]
pub enum EditOp {
    /// Write a leaf value
    SetValue {
        /// Target leaf plug
        plug: Plug,
        /// Value to store
        value: Value,
    },
    /// Add a connection
    Connect {
        /// Source plug
        source: Plug,
        /// Destination plug
        destination: Plug,
    },
    /// Remove a connection
    Disconnect {
        /// Source plug
        source: Plug,
        /// Destination plug
        destination: Plug,
    },
    /// Change a lock bit
    SetLock {
        /// Target plug
        plug: Plug,
        /// New lock state
        locked: bool,
    },
    /// Remove a materialized array element
    RemoveArrayElement {
        /// Array plug
        array: Plug,
        /// Logical index
        index: u32,
    },
}

impl EditOp {
    /// Execute this op against the host
    pub fn apply<H: SceneHost + ?Sized>(&self, host: &mut H) -> std::result::Result<(), SceneError> {
        match self {
            Self::SetValue { plug, value } => host.set_value(plug, value.clone()),
            Self::Connect {
                source,
                destination,
            } => host.connect(source, destination),
            Self::Disconnect {
                source,
                destination,
            } => host.disconnect(source, destination),
            Self::SetLock { plug, locked } => host.set_locked(plug, *locked),
            Self::RemoveArrayElement { array, index } => host.remove_element(array, *index),
        }
    }
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetValue { plug, value } => write!(f, "set {plug} = {value}"),
            Self::Connect {
                source,
                destination,
            } => write!(f, "connect {source} -> {destination}"),
            Self::Disconnect {
                source,
                destination,
            } => write!(f, "disconnect {source} -> {destination}"),
            Self::SetLock { plug, locked } => write!(f, "lock {plug} = {locked}"),
            Self::RemoveArrayElement { array, index } => write!(f, "remove {array}[{index}]"),
        }
    }
}

/// Lifecycle of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Accepting ops, not yet applied
    Open,
    /// Every op ran
    Applied,
    /// An op failed; earlier ops remain applied
    Failed,
}

/// An ordered list of pending graph edits
#[derive(Debug, Clone)]
pub struct EditTransaction {
    ops: Vec<EditOp>,
    state: TransactionState,
}

impl EditTransaction {
    /// Create an empty open transaction
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            state: TransactionState::Open,
        }
    }

    /// Queue an op
    pub fn push(&mut self, op: EditOp) {
        tracing::trace!(op = %op, "queued graph edit");
        self.ops.push(op);
    }

    /// Queue every op of another transaction, keeping their order
    pub fn extend(&mut self, other: EditTransaction) {
        self.ops.extend(other.ops);
    }

    /// Pending ops in execution order
    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    /// Number of queued ops
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether no ops are queued
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Current lifecycle state
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Run every op in order. Stops at the first failure without undoing
    /// the ops that already ran.
    pub fn apply<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        if self.state != TransactionState::Open {
            return Err(AttrError::TransactionClosed(self.state));
        }
        tracing::debug!(ops = self.ops.len(), "applying graph edits");
        for (position, op) in self.ops.iter().enumerate() {
            if let Err(e) = op.apply(host) {
                tracing::error!(op = %op, position, error = %e, "graph edit failed");
                self.state = TransactionState::Failed;
                return Err(e.into());
            }
        }
        self.state = TransactionState::Applied;
        Ok(())
    }
}

impl Default for EditTransaction {
    fn default() -> Self {
        Self::new()
    }
}

/// Stage ops into a scratch transaction, then either queue them on the
/// caller's transaction or apply them right away.
///
/// Nothing reaches the caller's transaction if staging fails.
pub(crate) fn stage_then_commit<H, F>(
    host: &mut H,
    transaction: Option<&mut EditTransaction>,
    stage: F,
) -> Result<()>
where
    H: SceneHost + ?Sized,
    F: FnOnce(&H, &mut EditTransaction) -> Result<()>,
{
    let mut staged = EditTransaction::new();
    stage(&*host, &mut staged)?;
    match transaction {
        Some(transaction) => {
            transaction.extend(staged);
            Ok(())
        }
        None => staged.apply(host),
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the scene graph.

use crate::plug::Plug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// A directed edge from a source plug to a destination plug
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Source plug
    pub source: Plug,
    /// Destination plug
    pub destination: Plug,
}

impl Connection {
    /// Create a new connection
    pub fn new(source: Plug, destination: Plug) -> Self {
        Self {
            id: ConnectionId::new(),
            source,
            destination,
        }
    }

    /// Check if either end lies on or underneath `plug`
    pub fn touches(&self, plug: &Plug) -> bool {
        self.source.is_within(plug) || self.destination.is_within(plug)
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! The host seam: everything the attribute layer needs from a scene graph.

use crate::attribute::{Attribute, Bound};
use crate::evaluation::EvaluationContext;
use crate::graph::SceneError;
use crate::node::NodeId;
use crate::plug::Plug;
use crate::value::Value;

/// A queryable, mutable node-and-attribute graph.
///
/// Implementations enforce the host-side invariants: a destination has at most
/// one source, and locked plugs refuse value writes and edits to their
/// incoming connection.
pub trait SceneHost {
    /// Schema of the attribute a plug addresses
    fn attribute(&self, plug: &Plug) -> Result<&Attribute, SceneError>;

    /// Top-level plug `name` on `node`, if the node has such an attribute
    fn find_plug(&self, node: NodeId, name: &str) -> Option<Plug>;

    /// Names of a node's top-level attributes in declaration order
    fn attribute_names(&self, node: NodeId) -> Result<Vec<String>, SceneError>;

    /// Value of a leaf plug
    fn value(&self, plug: &Plug, context: &EvaluationContext) -> Result<Value, SceneError>;

    /// Write the value of a leaf plug
    fn set_value(&mut self, plug: &Plug, value: Value) -> Result<(), SceneError>;

    /// Write the declared default of the addressed attribute
    fn set_default(&mut self, plug: &Plug, value: Value) -> Result<(), SceneError>;

    /// Write one bound of the addressed attribute
    fn set_bound(&mut self, plug: &Plug, bound: Bound, value: f64) -> Result<(), SceneError>;

    /// Lock state
    fn is_locked(&self, plug: &Plug) -> bool;

    /// Change the lock state
    fn set_locked(&mut self, plug: &Plug, locked: bool) -> Result<(), SceneError>;

    /// Keyable state
    fn is_keyable(&self, plug: &Plug) -> bool;

    /// Change the keyable state
    fn set_keyable(&mut self, plug: &Plug, keyable: bool) -> Result<(), SceneError>;

    /// Channel box visibility
    fn is_channel_box(&self, plug: &Plug) -> bool;

    /// Change channel box visibility
    fn set_channel_box(&mut self, plug: &Plug, visible: bool) -> Result<(), SceneError>;

    /// Materialized logical indices of an array plug, in physical order
    fn element_indices(&self, array: &Plug) -> Result<Vec<u32>, SceneError>;

    /// Remove a materialized element from an array plug
    fn remove_element(&mut self, array: &Plug, index: u32) -> Result<(), SceneError>;

    /// The single source feeding `plug`, if any
    fn source(&self, plug: &Plug) -> Option<Plug>;

    /// Every destination `plug` feeds
    fn destinations(&self, plug: &Plug) -> Vec<Plug>;

    /// Add a connection
    fn connect(&mut self, source: &Plug, destination: &Plug) -> Result<(), SceneError>;

    /// Remove a connection
    fn disconnect(&mut self, source: &Plug, destination: &Plug) -> Result<(), SceneError>;

    /// Whether `plug` has an incoming connection
    fn is_destination(&self, plug: &Plug) -> bool {
        self.source(plug).is_some()
    }

    /// Whether `plug` has outgoing connections
    fn is_source(&self, plug: &Plug) -> bool {
        !self.destinations(plug).is_empty()
    }

    /// Whether `plug` is connected either way
    fn is_connected(&self, plug: &Plug) -> bool {
        self.is_destination(plug) || self.is_source(plug)
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory scene graph containing nodes, plug state and connections.

use crate::attribute::{Attribute, AttributeKind, Bound};
use crate::connection::{Connection, ConnectionId};
use crate::evaluation::EvaluationContext;
use crate::host::SceneHost;
use crate::node::{Node, NodeId};
use crate::plug::Plug;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Highest logical index an array plug accepts
pub const MAX_LOGICAL_INDEX: u32 = i32::MAX as u32;

/// Runtime state of a single plug
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PlugState {
    value: Option<Value>,
    locked: bool,
    keyable: Option<bool>,
    channel_box: Option<bool>,
}

/// A scene graph held entirely in memory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneGraph {
    /// Scene name
    pub name: String,
    /// Nodes in the scene
    nodes: IndexMap<NodeId, Node>,
    /// Per-plug runtime state
    states: IndexMap<Plug, PlugState>,
    /// Materialized logical indices per array plug
    elements: IndexMap<Plug, BTreeSet<u32>>,
    /// Connections between plugs, in creation order
    connections: IndexMap<ConnectionId, Connection>,
}

impl SceneGraph {
    /// Create a new empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            states: IndexMap::new(),
            elements: IndexMap::new(),
            connections: IndexMap::new(),
        }
    }

    /// Add a node to the scene
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Add a dynamic attribute to a node and return its plug
    pub fn add_attribute(&mut self, node_id: NodeId, attribute: Attribute) -> Result<Plug, SceneError> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(SceneError::NodeNotFound(node_id))?;
        let name = attribute.name.clone();
        if !node.add_attribute(attribute) {
            return Err(SceneError::AttributeExists(name));
        }
        Ok(Plug::new(node_id, name))
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Serialize the whole scene to RON
    pub fn to_ron(&self) -> Result<String, SceneError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::Serialization(e.to_string()))
    }

    /// Load a scene from RON
    pub fn from_ron(ron_str: &str) -> Result<Self, SceneError> {
        ron::from_str(ron_str).map_err(|e| SceneError::Serialization(e.to_string()))
    }

    /// Capture the full scene state
    pub fn snapshot(&self) -> Result<SceneSnapshot, SceneError> {
        let data = bincode::serialize(self)?;
        Ok(SceneSnapshot {
            size: data.len(),
            data,
        })
    }

    /// Return to a previously captured state
    pub fn restore(&mut self, snapshot: &SceneSnapshot) -> Result<(), SceneError> {
        *self = bincode::deserialize(&snapshot.data)?;
        Ok(())
    }

    fn node_or_err(&self, node_id: NodeId) -> Result<&Node, SceneError> {
        self.nodes.get(&node_id).ok_or(SceneError::NodeNotFound(node_id))
    }

    fn resolve(&self, plug: &Plug) -> Result<&Attribute, SceneError> {
        let node = self.node_or_err(plug.node)?;
        let segments = plug.segments();
        let missing = || SceneError::AttributeNotFound(plug.to_string());
        let mut attribute = node.attribute(&segments[0].name).ok_or_else(missing)?;
        for (depth, segment) in segments.iter().enumerate() {
            if depth > 0 {
                attribute = attribute.child(&segment.name).ok_or_else(missing)?;
            }
            let last = depth + 1 == segments.len();
            match segment.index {
                Some(_) if !attribute.array => {
                    return Err(SceneError::InvalidPath(plug.path_name()));
                }
                None if attribute.array && !last => {
                    return Err(SceneError::InvalidPath(plug.path_name()));
                }
                Some(index) if index > MAX_LOGICAL_INDEX => {
                    return Err(SceneError::IndexOutOfRange {
                        plug: plug.to_string(),
                        index,
                    });
                }
                _ => {}
            }
        }
        Ok(attribute)
    }

    fn resolve_mut(&mut self, plug: &Plug) -> Result<&mut Attribute, SceneError> {
        self.resolve(plug)?;
        let missing = || SceneError::AttributeNotFound(plug.to_string());
        let node = self
            .nodes
            .get_mut(&plug.node)
            .ok_or(SceneError::NodeNotFound(plug.node))?;
        let segments = plug.segments();
        let mut attribute = node.attribute_mut(&segments[0].name).ok_or_else(missing)?;
        for segment in &segments[1..] {
            attribute = attribute.child_mut(&segment.name).ok_or_else(missing)?;
        }
        Ok(attribute)
    }

    fn is_array_plug(attribute: &Attribute, plug: &Plug) -> bool {
        attribute.array && plug.logical_index().is_none()
    }

    fn materialize(&mut self, plug: &Plug) {
        for (array, index) in plug.element_steps() {
            self.elements.entry(array).or_default().insert(index);
        }
    }

    fn state_mut(&mut self, plug: &Plug) -> &mut PlugState {
        self.states.entry(plug.clone()).or_default()
    }

    fn ensure_unlocked(&self, plug: &Plug) -> Result<(), SceneError> {
        if self.is_locked(plug) {
            return Err(SceneError::Locked(plug.to_string()));
        }
        Ok(())
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl SceneHost for SceneGraph {
    fn attribute(&self, plug: &Plug) -> Result<&Attribute, SceneError> {
        self.resolve(plug)
    }

    fn find_plug(&self, node: NodeId, name: &str) -> Option<Plug> {
        self.nodes
            .get(&node)?
            .attribute(name)
            .map(|_| Plug::new(node, name))
    }

    fn attribute_names(&self, node: NodeId) -> Result<Vec<String>, SceneError> {
        Ok(self
            .node_or_err(node)?
            .attributes()
            .map(|a| a.name.clone())
            .collect())
    }

    /// The in-memory scene keeps a single state, so every context reads it.
    fn value(&self, plug: &Plug, _context: &EvaluationContext) -> Result<Value, SceneError> {
        let attribute = self.resolve(plug)?;
        if attribute.kind == AttributeKind::Message {
            return Ok(Value::Message(self.source(plug).map(|p| p.node)));
        }
        if attribute.has_children() || Self::is_array_plug(attribute, plug) {
            return Err(SceneError::NotALeaf(plug.to_string()));
        }
        self.states
            .get(plug)
            .and_then(|s| s.value.clone())
            .or_else(|| attribute.default_value())
            .ok_or_else(|| SceneError::NoValue(plug.to_string()))
    }

    fn set_value(&mut self, plug: &Plug, value: Value) -> Result<(), SceneError> {
        let attribute = self.resolve(plug)?;
        if attribute.has_children() || Self::is_array_plug(attribute, plug) {
            return Err(SceneError::NotALeaf(plug.to_string()));
        }
        if !attribute.accepts(&value) {
            return Err(SceneError::TypeMismatch {
                plug: plug.to_string(),
                got: value.kind_name(),
            });
        }
        self.ensure_unlocked(plug)?;
        self.materialize(plug);
        self.state_mut(plug).value = Some(value);
        Ok(())
    }

    fn set_default(&mut self, plug: &Plug, value: Value) -> Result<(), SceneError> {
        self.resolve_mut(plug)?.assign_default(value);
        Ok(())
    }

    fn set_bound(&mut self, plug: &Plug, bound: Bound, value: f64) -> Result<(), SceneError> {
        self.resolve_mut(plug)?.bounds.set(bound, Some(value));
        Ok(())
    }

    fn is_locked(&self, plug: &Plug) -> bool {
        self.states.get(plug).is_some_and(|s| s.locked)
    }

    fn set_locked(&mut self, plug: &Plug, locked: bool) -> Result<(), SceneError> {
        self.resolve(plug)?;
        self.state_mut(plug).locked = locked;
        Ok(())
    }

    fn is_keyable(&self, plug: &Plug) -> bool {
        let declared = self.resolve(plug).is_ok_and(|a| a.keyable);
        self.states
            .get(plug)
            .and_then(|s| s.keyable)
            .unwrap_or(declared)
    }

    fn set_keyable(&mut self, plug: &Plug, keyable: bool) -> Result<(), SceneError> {
        self.resolve(plug)?;
        self.state_mut(plug).keyable = Some(keyable);
        Ok(())
    }

    fn is_channel_box(&self, plug: &Plug) -> bool {
        let declared = self.resolve(plug).is_ok_and(|a| a.channel_box);
        self.states
            .get(plug)
            .and_then(|s| s.channel_box)
            .unwrap_or(declared)
    }

    fn set_channel_box(&mut self, plug: &Plug, visible: bool) -> Result<(), SceneError> {
        self.resolve(plug)?;
        self.state_mut(plug).channel_box = Some(visible);
        Ok(())
    }

    fn element_indices(&self, array: &Plug) -> Result<Vec<u32>, SceneError> {
        let attribute = self.resolve(array)?;
        if !Self::is_array_plug(attribute, array) {
            return Err(SceneError::NotAnArray(array.to_string()));
        }
        Ok(self
            .elements
            .get(array)
            .map(|indices| indices.iter().copied().collect())
            .unwrap_or_default())
    }

    fn remove_element(&mut self, array: &Plug, index: u32) -> Result<(), SceneError> {
        let attribute = self.resolve(array)?;
        if !Self::is_array_plug(attribute, array) {
            return Err(SceneError::NotAnArray(array.to_string()));
        }
        self.ensure_unlocked(array)?;
        let element = array.element(index);
        if self.connections.values().any(|c| c.touches(&element)) {
            return Err(SceneError::ElementConnected(element.to_string()));
        }
        let removed = self
            .elements
            .get_mut(array)
            .is_some_and(|indices| indices.remove(&index));
        if !removed {
            return Err(SceneError::ElementNotFound(element.to_string()));
        }
        self.states.retain(|plug, _| !plug.is_within(&element));
        self.elements.retain(|plug, _| !plug.is_within(&element));
        Ok(())
    }

    fn source(&self, plug: &Plug) -> Option<Plug> {
        self.connections
            .values()
            .find(|c| c.destination == *plug)
            .map(|c| c.source.clone())
    }

    fn destinations(&self, plug: &Plug) -> Vec<Plug> {
        self.connections
            .values()
            .filter(|c| c.source == *plug)
            .map(|c| c.destination.clone())
            .collect()
    }

    fn connect(&mut self, source: &Plug, destination: &Plug) -> Result<(), SceneError> {
        self.resolve(source)?;
        self.resolve(destination)?;
        if source == destination {
            return Err(SceneError::SelfLoop(source.to_string()));
        }
        if let Some(existing) = self.source(destination) {
            return Err(SceneError::AlreadySourced {
                destination: destination.to_string(),
                existing: existing.to_string(),
            });
        }
        self.ensure_unlocked(destination)?;

        self.materialize(source);
        self.materialize(destination);
        let connection = Connection::new(source.clone(), destination.clone());
        self.connections.insert(connection.id, connection);
        Ok(())
    }

    fn disconnect(&mut self, source: &Plug, destination: &Plug) -> Result<(), SceneError> {
        let id = self
            .connections
            .values()
            .find(|c| c.source == *source && c.destination == *destination)
            .map(|c| c.id)
            .ok_or_else(|| SceneError::NotConnected {
                from: source.to_string(),
                destination: destination.to_string(),
            })?;
        self.ensure_unlocked(destination)?;
        self.connections.shift_remove(&id);
        Ok(())
    }
}

/// Binary capture of a scene, used to restore state after a failed batch
#[derive(Debug, Clone)]
pub struct SceneSnapshot {
    /// Serialized scene
    pub data: Vec<u8>,
    /// Size in bytes
    pub size: usize,
}

/// Errors raised by the scene host
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Attribute not found
    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    /// Attribute name already used on the node
    #[error("Attribute already exists: {0}")]
    AttributeExists(String),

    /// Plug path does not match the attribute's shape
    #[error("Invalid plug path: {0}")]
    InvalidPath(String),

    /// Value access on a compound or array plug
    #[error("Plug is not a leaf: {0}")]
    NotALeaf(String),

    /// Element access on a plug that is not an array
    #[error("Plug is not an array: {0}")]
    NotAnArray(String),

    /// Leaf has no storable value
    #[error("Plug holds no value: {0}")]
    NoValue(String),

    /// Value does not match the attribute's native kind
    #[error("Type mismatch on {plug}: cannot store {got}")]
    TypeMismatch {
        /// Target plug
        plug: String,
        /// Kind of the rejected value
        got: &'static str,
    },

    /// Edit refused because the plug is locked
    #[error("Plug is locked: {0}")]
    Locked(String),

    /// Destination already has an incoming connection
    #[error("{destination} is already connected from {existing}")]
    AlreadySourced {
        /// Destination plug
        destination: String,
        /// Existing source plug
        existing: String,
    },

    /// No such connection
    #[error("{from} is not connected to {destination}")]
    NotConnected {
        /// Source plug
        from: String,
        /// Destination plug
        destination: String,
    },

    /// Plug connected to itself
    #[error("Self-loop not allowed: {0}")]
    SelfLoop(String),

    /// Logical index outside the valid range
    #[error("Logical index {index} out of range on {plug}")]
    IndexOutOfRange {
        /// Array plug
        plug: String,
        /// Offending index
        index: u32,
    },

    /// Element removal refused while connections remain
    #[error("Element still connected: {0}")]
    ElementConnected(String),

    /// Element is not materialized
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// RON serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Snapshot encoding error
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::NumericKind;
    use crate::node::NodeType;

    fn scene_with_node() -> (SceneGraph, NodeId) {
        let node_type = NodeType::new("transform")
            .with_attribute(Attribute::numeric("translate", NumericKind::Double3).keyable())
            .with_attribute(Attribute::numeric("weights", NumericKind::Float).array())
            .with_attribute(Attribute::message("message"));
        let mut scene = SceneGraph::new("test");
        let id = scene.add_node(Node::new(&node_type, "a"));
        (scene, id)
    }

    #[test]
    fn test_set_and_read_leaf() {
        let (mut scene, id) = scene_with_node();
        let tx = Plug::parse(id, "translate.translateX").unwrap();
        assert_eq!(scene.value(&tx, &EvaluationContext::current()).unwrap(), Value::Double(0.0));
        scene.set_value(&tx, Value::Double(2.5)).unwrap();
        assert_eq!(scene.value(&tx, &EvaluationContext::current()).unwrap(), Value::Double(2.5));
        assert!(matches!(
            scene.set_value(&tx, Value::Float(1.0)),
            Err(SceneError::TypeMismatch { .. })
        ));
        assert!(matches!(
            scene.set_value(&Plug::new(id, "translate"), Value::Double(1.0)),
            Err(SceneError::NotALeaf(_))
        ));
    }

    #[test]
    fn test_locked_refuses_write() {
        let (mut scene, id) = scene_with_node();
        let tx = Plug::parse(id, "translate.translateX").unwrap();
        scene.set_locked(&tx, true).unwrap();
        assert!(matches!(scene.set_value(&tx, Value::Double(1.0)), Err(SceneError::Locked(_))));
        scene.set_locked(&tx, false).unwrap();
        scene.set_value(&tx, Value::Double(1.0)).unwrap();
    }

    #[test]
    fn test_elements_materialize() {
        let (mut scene, id) = scene_with_node();
        let weights = Plug::new(id, "weights");
        scene.set_value(&weights.element(3), Value::Float(1.0)).unwrap();
        scene.set_value(&weights.element(1), Value::Float(0.5)).unwrap();
        assert_eq!(scene.element_indices(&weights).unwrap(), vec![1, 3]);

        scene.remove_element(&weights, 3).unwrap();
        assert_eq!(scene.element_indices(&weights).unwrap(), vec![1]);
        assert!(matches!(
            scene.remove_element(&weights, 3),
            Err(SceneError::ElementNotFound(_))
        ));
    }

    #[test]
    fn test_single_source_per_destination() {
        let (mut scene, a) = scene_with_node();
        let node_type = NodeType::new("transform")
            .with_attribute(Attribute::numeric("translate", NumericKind::Double3));
        let b = scene.add_node(Node::new(&node_type, "b"));
        let c = scene.add_node(Node::new(&node_type, "c"));

        let dst = Plug::new(c, "translate");
        scene.connect(&Plug::new(a, "translate"), &dst).unwrap();
        assert!(matches!(
            scene.connect(&Plug::new(b, "translate"), &dst),
            Err(SceneError::AlreadySourced { .. })
        ));
        assert_eq!(scene.source(&dst), Some(Plug::new(a, "translate")));

        scene.disconnect(&Plug::new(a, "translate"), &dst).unwrap();
        assert!(!scene.is_connected(&dst));
    }

    #[test]
    fn test_message_reads_source_node() {
        let (mut scene, a) = scene_with_node();
        let node_type = NodeType::new("set").with_attribute(Attribute::message("members"));
        let set = scene.add_node(Node::new(&node_type, "set"));
        let members = Plug::new(set, "members");
        let ctx = EvaluationContext::current();
        assert_eq!(scene.value(&members, &ctx).unwrap(), Value::Message(None));
        scene.connect(&Plug::new(a, "message"), &members).unwrap();
        assert_eq!(scene.value(&members, &ctx).unwrap(), Value::Message(Some(a)));
    }

    #[test]
    fn test_timed_read_sees_current_state() {
        let (mut scene, id) = scene_with_node();
        let tx = Plug::parse(id, "translate.translateX").unwrap();
        scene.set_value(&tx, Value::Double(4.0)).unwrap();
        assert_eq!(scene.value(&tx, &EvaluationContext::at_time(10.0)).unwrap(), Value::Double(4.0));
    }

    #[test]
    fn test_index_out_of_range() {
        let (mut scene, id) = scene_with_node();
        let weights = Plug::new(id, "weights");
        assert!(matches!(
            scene.set_value(&weights.element(MAX_LOGICAL_INDEX + 1), Value::Float(1.0)),
            Err(SceneError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            scene.set_value(&Plug::parse(id, "translate[0]").unwrap(), Value::Double(1.0)),
            Err(SceneError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_snapshot_restore() {
        let (mut scene, id) = scene_with_node();
        let tx = Plug::parse(id, "translate.translateX").unwrap();
        let snapshot = scene.snapshot().unwrap();
        scene.set_value(&tx, Value::Double(9.0)).unwrap();
        scene.restore(&snapshot).unwrap();
        assert_eq!(scene.value(&tx, &EvaluationContext::current()).unwrap(), Value::Double(0.0));
    }

    #[test]
    fn test_ron_roundtrip() {
        let (mut scene, id) = scene_with_node();
        scene.set_value(&Plug::new(id, "weights").element(2), Value::Float(0.25)).unwrap();
        let ron = scene.to_ron().unwrap();
        let loaded = SceneGraph::from_ron(&ron).unwrap();
        assert_eq!(loaded.node_count(), 1);
        assert_eq!(
            loaded.element_indices(&Plug::new(id, "weights")).unwrap(),
            vec![2]
        );
    }
}

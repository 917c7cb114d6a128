// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the scene graph.

use crate::attribute::Attribute;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a node ID from its string form
    pub fn parse(text: &str) -> Option<Self> {
        Uuid::parse_str(text).ok().map(Self)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node type definition: the static attributes every instance shares
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeType {
    /// Unique type identifier
    pub id: String,
    /// Description
    pub description: String,
    /// Static attributes
    pub attributes: Vec<Attribute>,
}

impl NodeType {
    /// Create a node type with no attributes
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            attributes: Vec::new(),
        }
    }

    /// Add a static attribute
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// A node instance in the scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node type ID
    pub node_type: String,
    /// Node name
    pub name: String,
    /// Attributes by name, static first in declaration order, then dynamic
    attributes: IndexMap<String, Attribute>,
}

impl Node {
    /// Create a new node from a type definition
    pub fn new(node_type: &NodeType, name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            node_type: node_type.id.clone(),
            name: name.into(),
            attributes: node_type
                .attributes
                .iter()
                .map(|a| (a.name.clone(), a.clone()))
                .collect(),
        }
    }

    /// Get a top-level attribute by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Get a top-level attribute by name, mutably
    pub(crate) fn attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.get_mut(name)
    }

    /// All top-level attributes in declaration order
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    /// Add a dynamic attribute to this instance. Returns false if the name is taken.
    pub fn add_attribute(&mut self, mut attribute: Attribute) -> bool {
        if self.attributes.contains_key(&attribute.name) {
            return false;
        }
        attribute.mark_dynamic();
        self.attributes.insert(attribute.name.clone(), attribute);
        true
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Plug handles: a node plus a path of attribute names and logical indices.

use crate::graph::SceneError;
use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a plug path: an attribute name with an optional logical index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    /// Attribute (or child attribute) name
    pub name: String,
    /// Logical index into a sparse array
    pub index: Option<u32>,
}

impl Segment {
    /// Create a segment without an index
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }
}

/// A binding of a node to one addressable slot.
///
/// Plugs are cheap views. They are invalidated by structural edits such as
/// element removal and should not be held across them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Plug {
    /// Owning node
    pub node: NodeId,
    path: Vec<Segment>,
}

impl Plug {
    /// Plug on a top-level attribute
    pub fn new(node: NodeId, attribute: impl Into<String>) -> Self {
        Self {
            node,
            path: vec![Segment::new(attribute)],
        }
    }

    /// Parse a path such as `weightList[0].weights[3]`
    pub fn parse(node: NodeId, path: &str) -> Result<Self, SceneError> {
        let invalid = || SceneError::InvalidPath(path.to_string());
        let mut segments = Vec::new();
        for part in path.split('.') {
            let segment = match part.split_once('[') {
                Some((name, rest)) => {
                    let index = rest
                        .strip_suffix(']')
                        .and_then(|digits| digits.parse::<u32>().ok())
                        .ok_or_else(invalid)?;
                    Segment {
                        name: name.to_string(),
                        index: Some(index),
                    }
                }
                None => Segment::new(part),
            };
            if segment.name.is_empty() {
                return Err(invalid());
            }
            segments.push(segment);
        }
        Ok(Self {
            node,
            path: segments,
        })
    }

    /// Path segments, outermost first
    pub fn segments(&self) -> &[Segment] {
        &self.path
    }

    /// Name of the addressed attribute
    pub fn attribute_name(&self) -> &str {
        self.last().name.as_str()
    }

    /// Name of the top-level attribute
    pub fn root_name(&self) -> &str {
        self.path[0].name.as_str()
    }

    /// Logical index of the addressed element, if this is an element plug
    pub fn logical_index(&self) -> Option<u32> {
        self.last().index
    }

    /// Element `index` of this array plug
    pub fn element(&self, index: u32) -> Plug {
        let mut plug = self.clone();
        plug.last_mut().index = Some(index);
        plug
    }

    /// The array plug this element belongs to (or the plug itself)
    pub fn array(&self) -> Plug {
        let mut plug = self.clone();
        plug.last_mut().index = None;
        plug
    }

    /// Child `name` of this compound plug
    pub fn child(&self, name: impl Into<String>) -> Plug {
        let mut plug = self.clone();
        plug.path.push(Segment::new(name));
        plug
    }

    /// This plug's path moved under another top-level plug.
    ///
    /// The node and top-level name come from `root`; the first logical index
    /// and every deeper segment come from `self`.
    pub fn rebased(&self, root: &Plug) -> Plug {
        let mut path = self.path.clone();
        path[0].name = root.root_name().to_string();
        Plug {
            node: root.node,
            path,
        }
    }

    /// Enclosing compound plug, if any
    pub fn parent(&self) -> Option<Plug> {
        if self.path.len() < 2 {
            return None;
        }
        let mut plug = self.clone();
        plug.path.pop();
        Some(plug)
    }

    /// Whether `self` is `other` or lies underneath it
    pub fn is_within(&self, other: &Plug) -> bool {
        if self.node != other.node || self.path.len() < other.path.len() {
            return false;
        }
        let depth = other.path.len();
        let last = depth - 1;
        self.path[..last] == other.path[..last]
            && self.path[last].name == other.path[last].name
            && (other.path[last].index.is_none() || self.path[last].index == other.path[last].index)
    }

    /// Every `(array plug, logical index)` pair this plug's path passes through
    pub fn element_steps(&self) -> Vec<(Plug, u32)> {
        self.path
            .iter()
            .enumerate()
            .filter_map(|(depth, segment)| {
                let index = segment.index?;
                let mut path = self.path[..=depth].to_vec();
                path[depth].index = None;
                Some((
                    Plug {
                        node: self.node,
                        path,
                    },
                    index,
                ))
            })
            .collect()
    }

    /// Path without the node, e.g. `weights[2].x`
    pub fn path_name(&self) -> String {
        self.path
            .iter()
            .map(|segment| match segment.index {
                Some(index) => format!("{}[{index}]", segment.name),
                None => segment.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    fn last(&self) -> &Segment {
        // Plugs are only built with at least one segment.
        &self.path[self.path.len() - 1]
    }

    fn last_mut(&mut self) -> &mut Segment {
        let last = self.path.len() - 1;
        &mut self.path[last]
    }
}

impl fmt::Display for Plug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.path_name())
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene graph host model for `rigplug`.
//!
//! This crate provides the node-and-attribute graph the attribute layer runs
//! against:
//! - Attribute schemas (numeric, unit, enum, typed data, matrix, message, compound)
//! - Plug handles addressing array elements and compound children
//! - Connections with a single source per destination
//! - The [`SceneHost`] trait, and [`SceneGraph`], an in-memory implementation
//!
//! ## Architecture
//!
//! The attribute layer never reaches the scene through global state. Every
//! operation takes the host explicitly, so any graph implementing
//! [`SceneHost`] can stand in for the in-memory one.

pub mod attribute;
pub mod connection;
pub mod evaluation;
pub mod graph;
pub mod host;
pub mod node;
pub mod plug;
pub mod value;

pub use attribute::{Attribute, AttributeKind, Bound, Bounds, DataKind, EnumSpec, NumericKind};
pub use connection::{Connection, ConnectionId};
pub use evaluation::EvaluationContext;
pub use graph::{SceneError, SceneGraph, SceneSnapshot, MAX_LOGICAL_INDEX};
pub use host::SceneHost;
pub use node::{Node, NodeId, NodeType};
pub use plug::{Plug, Segment};
pub use value::{Unit, UnitKind, UnitValue, Value};

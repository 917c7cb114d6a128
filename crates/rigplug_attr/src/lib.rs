// SPDX-License-Identifier: MIT OR Apache-2.0
//! Attribute layer for `rigplug`.
//!
//! Sits between tools and a live scene graph and gives them:
//! - A portable type taxonomy for native attributes ([`TypeTag`])
//! - Reading and writing values through any plug ([`get_value`], [`set_value`])
//! - Compact per-attribute records ([`serialize`], [`apply_descriptor`])
//! - Batched graph edits ([`EditTransaction`]) and connection editing
//! - Lazy walks along same-named connections ([`walk`])
//! - Scoped unlocking of plugs ([`LockGuard`], [`with_unlocked`])
//!
//! ## Architecture
//!
//! Every entry point takes the host explicitly as `&impl SceneHost`, so the
//! layer runs against the in-memory [`rigplug_scene::SceneGraph`] or any other
//! implementation. Writes are staged as [`EditOp`]s and either queued on a
//! caller's transaction or applied right away. Applying is not atomic: take a
//! scene snapshot first when a batch must be all-or-nothing.
//!
//! The layer only logs through `tracing`; installing a subscriber is up to
//! the application.

pub mod codec;
pub mod config;
pub mod connect;
pub mod descriptor;
pub mod error;
pub mod lock;
pub mod transaction;
pub mod types;
pub mod walk;

pub use codec::{decode_json, encode_json, get_value, set_value, Sample};
pub use config::{RigplugConfig, DEFAULT_DEPTH_LIMIT};
pub use connect::{
    connect, connect_with_mask, disconnect, next_available_element_plug, remove_array_element,
    SlotMode, EXTRA_ELEMENT_SLOTS,
};
pub use descriptor::{apply_descriptor, is_elidable, serialize, serialize_node, AttributeDescriptor};
pub use error::{AttrError, Result};
pub use lock::{with_unlocked, LockGuard};
pub use transaction::{EditOp, EditTransaction, TransactionState};
pub use types::{classify, classify_element, classify_plug, enum_names, TypeTag};
pub use walk::{walk, Direction, Walk, WalkOptions};

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection editing on top of edit transactions.
//!
//! Every operation stages its ops first and only then either queues them on
//! the caller's transaction or applies them. A refused edit leaves both the
//! transaction and the scene untouched.

use crate::error::{AttrError, Result};
use crate::lock::with_unlocked;
use crate::transaction::{stage_then_commit, EditOp, EditTransaction};
use rigplug_scene::{Plug, SceneHost, MAX_LOGICAL_INDEX};

/// Slots scanned past the highest materialized index when looking for a
/// free element. The host always exposes one spare slot after the last one.
pub const EXTRA_ELEMENT_SLOTS: u32 = 2;

/// Which side of a connection marks an element as taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotMode {
    /// Element is taken when it feeds something
    Source,
    /// Element is taken when something feeds it
    Destination,
}

/// Connect `source` to `destination`.
///
/// A destination already fed by `source` is left alone. One fed by another
/// plug is rewired when `force` is set and refused otherwise.
pub fn connect<H: SceneHost + ?Sized>(
    host: &mut H,
    source: &Plug,
    destination: &Plug,
    force: bool,
    transaction: Option<&mut EditTransaction>,
) -> Result<()> {
    stage_then_commit(host, transaction, |host, staged| {
        stage_connect(host, source, destination, force, staged)
    })
}

fn stage_connect<H: SceneHost + ?Sized>(
    host: &H,
    source: &Plug,
    destination: &Plug,
    force: bool,
    staged: &mut EditTransaction,
) -> Result<()> {
    match host.source(destination) {
        Some(existing) if existing == *source => {
            tracing::debug!(source = %source, destination = %destination, "already connected");
            return Ok(());
        }
        Some(existing) if !force => {
            return Err(AttrError::AlreadyConnected {
                destination: destination.to_string(),
                existing: existing.to_string(),
            });
        }
        Some(existing) => staged.push(EditOp::Disconnect {
            source: existing,
            destination: destination.clone(),
        }),
        None => {}
    }
    staged.push(EditOp::Connect {
        source: source.clone(),
        destination: destination.clone(),
    });
    Ok(())
}

/// Connect two compounds child by child.
///
/// `mask` holds one flag per child: set children are connected, cleared
/// children are disconnected if something feeds them.
pub fn connect_with_mask<H: SceneHost + ?Sized>(
    host: &mut H,
    source: &Plug,
    destination: &Plug,
    mask: &[bool],
    force: bool,
    transaction: Option<&mut EditTransaction>,
) -> Result<()> {
    stage_then_commit(host, transaction, |host, staged| {
        let source_children = &host.attribute(source)?.children;
        let destination_children = &host.attribute(destination)?.children;
        if destination_children.is_empty() {
            return Err(AttrError::unsupported(destination, "masked connect needs a compound"));
        }
        if mask.len() != destination_children.len() {
            return Err(AttrError::arity(destination, destination_children.len(), mask.len()));
        }
        if source_children.len() != destination_children.len() {
            return Err(AttrError::arity(
                source,
                destination_children.len(),
                source_children.len(),
            ));
        }

        let pairs = source_children.iter().zip(destination_children);
        for ((from, to), enabled) in pairs.zip(mask) {
            let from = source.child(from.name.as_str());
            let to = destination.child(to.name.as_str());
            if *enabled {
                stage_connect(host, &from, &to, force, staged)?;
            } else if let Some(existing) = host.source(&to) {
                staged.push(EditOp::Disconnect {
                    source: existing,
                    destination: to,
                });
            }
        }
        Ok(())
    })
}

/// Break the connections of a plug.
///
/// With `break_source` the incoming edge goes; with `break_destination` every
/// outgoing edge goes. Locked endpoints are unlocked first and stay unlocked.
pub fn disconnect<H: SceneHost + ?Sized>(
    host: &mut H,
    plug: &Plug,
    break_source: bool,
    break_destination: bool,
    transaction: Option<&mut EditTransaction>,
) -> Result<()> {
    stage_then_commit(host, transaction, |host, staged| {
        stage_disconnect(host, plug, break_source, break_destination, staged);
        Ok(())
    })
}

fn stage_disconnect<H: SceneHost + ?Sized>(
    host: &H,
    plug: &Plug,
    break_source: bool,
    break_destination: bool,
    staged: &mut EditTransaction,
) {
    let mut unlocked: Vec<Plug> = Vec::new();
    let mut unlock = |endpoint: &Plug, staged: &mut EditTransaction| {
        if host.is_locked(endpoint) && !unlocked.contains(endpoint) {
            unlocked.push(endpoint.clone());
            staged.push(EditOp::SetLock {
                plug: endpoint.clone(),
                locked: false,
            });
        }
    };

    if break_source {
        if let Some(source) = host.source(plug) {
            unlock(&source, staged);
            unlock(plug, staged);
            staged.push(EditOp::Disconnect {
                source,
                destination: plug.clone(),
            });
        }
    }
    if break_destination {
        for destination in host.destinations(plug) {
            unlock(plug, staged);
            unlock(&destination, staged);
            staged.push(EditOp::Disconnect {
                source: plug.clone(),
                destination,
            });
        }
    }
}

/// Every plug in the subtree rooted at `plug`: itself, its materialized
/// elements and its children, depth first
fn subtree<H: SceneHost + ?Sized>(host: &H, plug: &Plug) -> Vec<Plug> {
    let mut plugs = vec![plug.clone()];
    let Ok(attribute) = host.attribute(plug) else {
        return plugs;
    };
    if attribute.array && plug.logical_index().is_none() {
        for index in host.element_indices(plug).unwrap_or_default() {
            plugs.extend(subtree(host, &plug.element(index)));
        }
    } else {
        for child in &attribute.children {
            plugs.extend(subtree(host, &plug.child(child.name.as_str())));
        }
    }
    plugs
}

/// Remove element `index` of an array plug.
///
/// Every connection in the element's subtree is broken first and the array's
/// lock is bypassed for the duration. Returns `false` when the element was not
/// materialized, which is not an error.
pub fn remove_array_element<H: SceneHost + ?Sized>(
    host: &mut H,
    array: &Plug,
    index: u32,
) -> Result<bool> {
    if index > MAX_LOGICAL_INDEX {
        return Err(AttrError::InvalidElement {
            plug: array.to_string(),
            index,
        });
    }
    if !host.element_indices(array)?.contains(&index) {
        tracing::debug!(array = %array, index, "element not materialized, nothing to remove");
        return Ok(false);
    }

    with_unlocked(host, array, |host| {
        let mut staged = EditTransaction::new();
        for plug in subtree(&*host, &array.element(index)) {
            stage_disconnect(&*host, &plug, true, true, &mut staged);
        }
        // edges inside the subtree are seen from both ends
        let mut transaction = EditTransaction::new();
        for op in staged.ops() {
            if !transaction.ops().contains(op) {
                transaction.push(op.clone());
            }
        }
        transaction.push(EditOp::RemoveArrayElement {
            array: array.clone(),
            index,
        });
        transaction.apply(host)
    })?;
    Ok(true)
}

fn is_taken<H: SceneHost + ?Sized>(host: &H, element: &Plug, mode: SlotMode) -> bool {
    let direct = match mode {
        SlotMode::Source => host.is_source(element),
        SlotMode::Destination => host.is_destination(element),
    };
    direct
        || subtree(host, element)
            .iter()
            .skip(1)
            .any(|child| host.is_connected(child))
}

/// First free element of an array plug.
///
/// Scans logical indices up to [`EXTRA_ELEMENT_SLOTS`] past the highest
/// materialized one. An element is taken when it is connected on the side
/// `mode` names, or when any plug beneath it is connected.
pub fn next_available_element_plug<H: SceneHost + ?Sized>(
    host: &H,
    array: &Plug,
    mode: SlotMode,
) -> Result<Option<Plug>> {
    let indices = host.element_indices(array)?;
    let end = indices
        .last()
        .map_or(1, |max| max.saturating_add(EXTRA_ELEMENT_SLOTS))
        .min(MAX_LOGICAL_INDEX + 1);
    Ok((0..end)
        .map(|index| array.element(index))
        .find(|element| !is_taken(host, element, mode)))
}

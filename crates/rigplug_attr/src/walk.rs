// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lazy traversal of same-named plugs along connections.
//!
//! Each neighbor is entered through the plug at the start plug's path, with
//! the top-level name swapped for the search name. Child names and logical
//! indices carry over, so walks from `translate.translateX` or `out[0]` stay
//! on that child or element.
//!
//! The walk keeps no visited set. A cycle in the graph repeats until the
//! depth limit is reached.

use crate::config::{RigplugConfig, DEFAULT_DEPTH_LIMIT};
use rigplug_scene::{Plug, SceneHost};

/// Which way a walk follows connections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Follow each plug's single source
    Upstream,
    /// Follow every destination, branching
    Downstream,
}

/// Walk settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOptions {
    /// Maximum number of hops from the start plug
    pub depth_limit: usize,
    /// Top-level attribute looked up on each neighbor; defaults to the start
    /// plug's top-level name
    pub search_name: Option<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            depth_limit: DEFAULT_DEPTH_LIMIT,
            search_name: None,
        }
    }
}

impl WalkOptions {
    /// Options using the configured depth limit
    pub fn from_config(config: &RigplugConfig) -> Self {
        Self {
            depth_limit: config.walk_depth_limit,
            search_name: None,
        }
    }

    /// Set the depth limit
    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    /// Look up top-level `name` on neighbors instead of the start plug's
    pub fn with_search_name(mut self, name: impl Into<String>) -> Self {
        self.search_name = Some(name.into());
        self
    }
}

/// Iterator over the plugs reached by a walk, in pre-order.
///
/// Neighbors of a plug are looked up only once the consumer asks for the next
/// item after it.
pub struct Walk<'h, H: SceneHost + ?Sized> {
    host: &'h H,
    direction: Direction,
    search_name: String,
    start: Plug,
    depth_limit: usize,
    stack: Vec<(Plug, usize)>,
    last: Option<(Plug, usize)>,
}

/// Start a walk from `start`. The start plug itself is not yielded.
pub fn walk<'h, H: SceneHost + ?Sized>(
    host: &'h H,
    start: &Plug,
    direction: Direction,
    options: WalkOptions,
) -> Walk<'h, H> {
    let search_name = options
        .search_name
        .unwrap_or_else(|| start.root_name().to_string());
    Walk {
        host,
        direction,
        search_name,
        start: start.clone(),
        depth_limit: options.depth_limit,
        stack: Vec::new(),
        last: Some((start.clone(), 0)),
    }
}

impl<H: SceneHost + ?Sized> Walk<'_, H> {
    /// Matching plugs on the neighbors of `plug`, in connection order
    fn neighbors(&self, plug: &Plug) -> Vec<Plug> {
        let adjacent = match self.direction {
            Direction::Upstream => self.host.source(plug).into_iter().collect(),
            Direction::Downstream => self.host.destinations(plug),
        };
        adjacent
            .into_iter()
            .filter_map(|other| {
                let found = self
                    .host
                    .find_plug(other.node, &self.search_name)
                    .map(|root| self.start.rebased(&root))
                    .filter(|candidate| self.host.attribute(candidate).is_ok());
                if found.is_none() {
                    tracing::trace!(node = %other.node, name = %self.search_name, "walk branch ends");
                }
                found
            })
            .collect()
    }
}

impl<H: SceneHost + ?Sized> Iterator for Walk<'_, H> {
    type Item = Plug;

    fn next(&mut self) -> Option<Plug> {
        if let Some((plug, depth)) = self.last.take() {
            if depth < self.depth_limit {
                let neighbors = self.neighbors(&plug);
                self.stack
                    .extend(neighbors.into_iter().rev().map(|next| (next, depth + 1)));
            }
        }
        let (plug, depth) = self.stack.pop()?;
        self.last = Some((plug.clone(), depth));
        Some(plug)
    }
}

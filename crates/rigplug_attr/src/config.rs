// SPDX-License-Identifier: MIT OR Apache-2.0
//! Layer configuration, stored as RON.

use crate::error::{AttrError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default bound on connection walks
pub const DEFAULT_DEPTH_LIMIT: usize = 256;

/// Settings shared by the attribute layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigplugConfig {
    /// Maximum hops a connection walk follows
    pub walk_depth_limit: usize,
    /// Tolerance when deciding whether a floating value differs from its default
    pub float_epsilon: f64,
}

impl Default for RigplugConfig {
    fn default() -> Self {
        Self {
            walk_depth_limit: DEFAULT_DEPTH_LIMIT,
            float_epsilon: 1e-9,
        }
    }
}

impl RigplugConfig {
    /// Parse from a RON string. Missing fields keep their defaults.
    pub fn from_ron(ron_str: &str) -> Result<Self> {
        ron::from_str(ron_str).map_err(|e| AttrError::Config(e.to_string()))
    }

    /// Serialize to a RON string
    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| AttrError::Config(e.to_string()))
    }

    /// Load from a RON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save to a RON file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

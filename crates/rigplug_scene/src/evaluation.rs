// SPDX-License-Identifier: MIT OR Apache-2.0
//! Evaluation context: which logical time/state a read observes.

use serde::{Deserialize, Serialize};

/// Context for reading plug values
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EvaluationContext {
    /// Time in seconds, `None` for the current state
    time: Option<f64>,
}

impl EvaluationContext {
    /// Read the current state
    pub fn current() -> Self {
        Self { time: None }
    }

    /// Read the state at a given time in seconds
    pub fn at_time(seconds: f64) -> Self {
        Self {
            time: Some(seconds),
        }
    }

    /// Requested time, if not the current state
    pub fn time(&self) -> Option<f64> {
        self.time
    }

    /// Whether this context reads the current state
    pub fn is_current(&self) -> bool {
        self.time.is_none()
    }
}

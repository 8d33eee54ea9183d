//! Depth limits and configuration

use crate::constants::MAX_UNWRAP_DEPTH;
use crate::error::{Result, SeqError};

/// Limits that keep source resolution and tree walking bounded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum wrapper/factory unwrap steps (default: 10, hard: 10)
    pub max_unwrap_depth: usize,
    /// Maximum nesting depth a path walker descends (default: 256, hard: 4,096)
    pub max_tree_depth: usize,
    /// Maximum group path length (default: 32, hard: 256)
    pub max_group_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_unwrap_depth: MAX_UNWRAP_DEPTH,
            max_tree_depth: 256,
            max_group_depth: 32,
        }
    }
}

impl Limits {
    /// Hard maximum limits that cannot be exceeded
    pub fn hard_maximums() -> Self {
        Self {
            max_unwrap_depth: MAX_UNWRAP_DEPTH,
            max_tree_depth: 4_096,
            max_group_depth: 256,
        }
    }

    /// Validate limits against hard maximums
    pub fn validate(&self) -> Result<()> {
        let hard = Self::hard_maximums();
        let checks = [
            ("max_unwrap_depth", self.max_unwrap_depth, hard.max_unwrap_depth),
            ("max_tree_depth", self.max_tree_depth, hard.max_tree_depth),
            ("max_group_depth", self.max_group_depth, hard.max_group_depth),
        ];

        for (name, value, max) in checks {
            if value > max {
                return Err(SeqError::LimitExceeded(format!(
                    "{name} {value} exceeds hard limit {max}"
                )));
            }
            if value == 0 {
                return Err(SeqError::LimitExceeded(format!("{name} must be at least 1")));
            }
        }

        Ok(())
    }
}

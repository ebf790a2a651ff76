//! Resolver configuration

use serde::{Deserialize, Serialize};

/// Resolution settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Budget used when a call does not pass one
    pub default_depth: u32,
}

impl ResolveConfig {
    /// Depth budget applied when none is configured
    pub const DEFAULT_DEPTH: u32 = 8;

    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With default depth
    #[inline]
    #[must_use]
    pub fn with_default_depth(mut self, depth: u32) -> Self {
        self.default_depth = depth;
        self
    }

    /// Effective budget for a call
    #[inline]
    #[must_use]
    pub fn depth(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(self.default_depth)
    }
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            default_depth: Self::DEFAULT_DEPTH,
        }
    }
}

//! Cache configuration.

use std::num::NonZeroUsize;

use serde::Deserialize;

const DEFAULT_LIST_LIMIT: usize = 64;

/// Cache configuration from `scaffale.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the list payload cache. When disabled every list read
    /// computes directly from the store.
    pub enabled: bool,
    /// Maximum cached list pages across both resource kinds.
    pub list_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl CacheConfig {
    /// Returns the list limit as NonZeroUsize, clamping to 1 if zero.
    pub fn list_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.list_limit).unwrap_or(NonZeroUsize::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.list_limit, 64);
    }

    #[test]
    fn non_zero_clamps_to_min() {
        let config = CacheConfig {
            list_limit: 0,
            ..Default::default()
        };
        assert_eq!(config.list_limit_non_zero().get(), 1);
    }
}

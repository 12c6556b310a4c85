//! Coordinator configuration.
//!
//! `OverrideConfig` holds the feature flags and sizing knobs of one
//! coordinator. It deserializes from any serde format and implements
//! [`FeatureFlags`], so a static configuration can be used directly. Hosts
//! with live settings implement [`FeatureFlags`] over their own storage and
//! keep using `OverrideConfig` only for the sizing knobs.

use serde::{Deserialize, Serialize};
use stream_override_core::{ClientType, FeatureFlags};

use crate::cache::DEFAULT_CAPACITY;
use crate::registry::{FetchConfig, TimeoutPolicy};

/// Configuration of an [`OverrideCoordinator`](crate::OverrideCoordinator).
///
/// # Example
///
/// ```
/// use stream_override::OverrideConfig;
///
/// let config: OverrideConfig = serde_json::from_str(r#"{
///     "enabled": true,
///     "annotate_label": true,
///     "client": "android_vr_no_auth",
///     "fetch": { "timeout_policy": { "cancel": "10s" } }
/// }"#).unwrap();
/// assert_eq!(config.duration_cache_capacity, 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct OverrideConfig {
    /// Master switch for every coordinator operation.
    pub enabled: bool,
    /// Append the client name to the diagnostic label.
    pub annotate_label: bool,
    /// Enable diagnostic-only checks such as premature-read warnings.
    pub debug_logging: bool,
    /// Client the replacement data is requested as.
    pub client: ClientType,
    /// Number of identifiers kept in the duration fallback cache.
    pub duration_cache_capacity: usize,
    /// Fetch task configuration.
    pub fetch: FetchConfig,
}

impl Default for OverrideConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            annotate_label: false,
            debug_logging: false,
            client: ClientType::default(),
            duration_cache_capacity: DEFAULT_CAPACITY,
            fetch: FetchConfig::default(),
        }
    }
}

impl OverrideConfig {
    /// Create a new builder for OverrideConfig.
    pub fn builder() -> OverrideConfigBuilder {
        OverrideConfigBuilder::default()
    }

    /// A configuration with the master switch off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl FeatureFlags for OverrideConfig {
    fn override_enabled(&self) -> bool {
        self.enabled
    }

    fn annotate_label_enabled(&self) -> bool {
        self.annotate_label
    }

    fn diagnostic_logging_enabled(&self) -> bool {
        self.debug_logging
    }

    fn client_type(&self) -> ClientType {
        self.client
    }
}

/// Builder for OverrideConfig.
#[derive(Debug, Clone, Default)]
pub struct OverrideConfigBuilder {
    config: OverrideConfig,
}

impl OverrideConfigBuilder {
    /// Turn the master switch on or off.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Enable or disable label annotation.
    pub fn annotate_label(mut self, enabled: bool) -> Self {
        self.config.annotate_label = enabled;
        self
    }

    /// Enable or disable diagnostic checks.
    pub fn debug_logging(mut self, enabled: bool) -> Self {
        self.config.debug_logging = enabled;
        self
    }

    /// Set the client type.
    pub fn client(mut self, client: ClientType) -> Self {
        self.config.client = client;
        self
    }

    /// Set the duration fallback cache capacity.
    pub fn duration_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.duration_cache_capacity = capacity;
        self
    }

    /// Set the fetch timeout policy.
    pub fn fetch_timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.config.fetch = FetchConfig::builder().timeout_policy(policy).build();
        self
    }

    /// Build the OverrideConfig.
    pub fn build(self) -> OverrideConfig {
        self.config
    }
}

//! Fetch task policies and configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Policy for fetches that take too long.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// No timeout - fetch runs until completion.
    #[default]
    None,
    /// Cancel the fetch after the duration; the handle completes without a payload.
    Cancel(#[serde(with = "humantime_serde")] Duration),
    /// Log a warning after the duration but let the fetch continue.
    Warn(#[serde(with = "humantime_serde")] Duration),
}

/// Configuration for the [`FetchRegistry`](super::FetchRegistry).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct FetchConfig {
    /// Timeout policy for fetch tasks.
    #[serde(default)]
    pub timeout_policy: TimeoutPolicy,
}

impl FetchConfig {
    /// Create a new builder for FetchConfig.
    pub fn builder() -> FetchConfigBuilder {
        FetchConfigBuilder::default()
    }
}

/// Builder for FetchConfig.
#[derive(Debug, Clone, Default)]
pub struct FetchConfigBuilder {
    timeout_policy: TimeoutPolicy,
}

impl FetchConfigBuilder {
    /// Set timeout policy.
    pub fn timeout_policy(self, policy: TimeoutPolicy) -> Self {
        Self {
            timeout_policy: policy,
        }
    }

    /// Set timeout with cancel policy.
    pub fn timeout(self, duration: Duration) -> Self {
        self.timeout_policy(TimeoutPolicy::Cancel(duration))
    }

    /// Build the FetchConfig.
    pub fn build(self) -> FetchConfig {
        FetchConfig {
            timeout_policy: self.timeout_policy,
        }
    }
}

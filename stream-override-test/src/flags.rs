//! Feature flags that can be flipped while a coordinator is running.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use stream_override_core::{ClientType, FeatureFlags};

#[derive(Debug)]
struct ToggleState {
    enabled: AtomicBool,
    annotate_label: AtomicBool,
    debug_logging: AtomicBool,
}

/// Shared, live-toggleable [`FeatureFlags`].
///
/// Clones share state, so a test keeps one clone and hands the other to the
/// coordinator builder.
#[derive(Debug, Clone)]
pub struct ToggleFlags {
    state: Arc<ToggleState>,
    client: ClientType,
}

impl ToggleFlags {
    /// Flags with the master switch on and everything else off.
    pub fn enabled() -> Self {
        Self {
            state: Arc::new(ToggleState {
                enabled: AtomicBool::new(true),
                annotate_label: AtomicBool::new(false),
                debug_logging: AtomicBool::new(false),
            }),
            client: ClientType::default(),
        }
    }

    /// Use `client` as the configured client type.
    pub fn with_client(mut self, client: ClientType) -> Self {
        self.client = client;
        self
    }

    pub fn set_enabled(&self, value: bool) {
        self.state.enabled.store(value, Ordering::SeqCst);
    }

    pub fn set_annotate_label(&self, value: bool) {
        self.state.annotate_label.store(value, Ordering::SeqCst);
    }

    pub fn set_debug_logging(&self, value: bool) {
        self.state.debug_logging.store(value, Ordering::SeqCst);
    }
}

impl FeatureFlags for ToggleFlags {
    fn override_enabled(&self) -> bool {
        self.state.enabled.load(Ordering::SeqCst)
    }

    fn annotate_label_enabled(&self) -> bool {
        self.state.annotate_label.load(Ordering::SeqCst)
    }

    fn diagnostic_logging_enabled(&self) -> bool {
        self.state.debug_logging.load(Ordering::SeqCst)
    }

    fn client_type(&self) -> ClientType {
        self.client
    }
}

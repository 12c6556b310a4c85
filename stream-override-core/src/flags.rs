//! Feature flag reads.

use serde::{Deserialize, Serialize};

/// Client identity the replacement streaming data is requested as.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    /// Android VR client.
    #[default]
    AndroidVr,
    /// Android VR client without an account. The only client that offers
    /// audio track language selection.
    AndroidVrNoAuth,
    /// iOS client.
    Ios,
    /// iOS music client.
    IosMusic,
    /// TV client.
    Tv,
    /// Web client.
    Web,
}

impl ClientType {
    /// Returns the client name as sent to the alternate source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AndroidVr => "ANDROID_VR",
            Self::AndroidVrNoAuth => "ANDROID_VR_NO_AUTH",
            Self::Ios => "IOS",
            Self::IosMusic => "IOS_MUSIC",
            Self::Tv => "TVHTML5",
            Self::Web => "WEB",
        }
    }
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of feature flags consulted on every coordinator call.
///
/// Implement this over whatever settings storage the host player uses.
/// Reads must be cheap and must never block.
pub trait FeatureFlags: Send + Sync {
    /// Master switch. When `false` every coordinator operation is a pass-through.
    fn override_enabled(&self) -> bool;

    /// Whether the client name is appended to the diagnostic label.
    fn annotate_label_enabled(&self) -> bool;

    /// Whether diagnostic-only checks (premature reads) are performed.
    fn diagnostic_logging_enabled(&self) -> bool;

    /// Client the replacement data is requested as.
    fn client_type(&self) -> ClientType {
        ClientType::default()
    }
}

impl<T> FeatureFlags for std::sync::Arc<T>
where
    T: FeatureFlags + ?Sized,
{
    fn override_enabled(&self) -> bool {
        self.as_ref().override_enabled()
    }

    fn annotate_label_enabled(&self) -> bool {
        self.as_ref().annotate_label_enabled()
    }

    fn diagnostic_logging_enabled(&self) -> bool {
        self.as_ref().diagnostic_logging_enabled()
    }

    fn client_type(&self) -> ClientType {
        self.as_ref().client_type()
    }
}

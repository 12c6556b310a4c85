//! Content identifier type.
//!
//! `VideoId` is a newtype wrapper around `SmolStr`. Identifiers are short
//! (11 characters for most content), so they stay inline without allocating.

use smol_str::SmolStr;
use std::fmt;

/// Identifier of one piece of content for which streaming data may be overridden.
///
/// Used as the key of both the fetch registry and the duration fallback cache.
/// An empty identifier is never actionable; see [`VideoId::parse`].
///
/// # Example
/// ```
/// use stream_override_core::VideoId;
///
/// let id = VideoId::new("dQw4w9WgXcQ");
/// assert_eq!(id.as_str(), "dQw4w9WgXcQ");
/// assert!(VideoId::parse("").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VideoId(SmolStr);

impl VideoId {
    /// Creates a new identifier without validation.
    #[inline]
    pub fn new(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    /// Creates an identifier from a static string (no allocation).
    #[inline]
    pub const fn new_static(s: &'static str) -> Self {
        Self(SmolStr::new_static(s))
    }

    /// Creates an identifier, returning `None` for an empty string.
    #[inline]
    pub fn parse(s: &str) -> Option<Self> {
        if s.is_empty() {
            None
        } else {
            Some(Self(SmolStr::new(s)))
        }
    }

    /// Returns the identifier as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for VideoId {
    #[inline]
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}

impl From<String> for VideoId {
    #[inline]
    fn from(s: String) -> Self {
        Self(SmolStr::from(s))
    }
}

impl From<SmolStr> for VideoId {
    #[inline]
    fn from(s: SmolStr) -> Self {
        Self(s)
    }
}

impl AsRef<str> for VideoId {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for VideoId {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

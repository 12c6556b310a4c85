//! Alternate token warm-up.

use async_trait::async_trait;

use crate::WarmupError;

/// Best-effort initialization of the alternate token source.
///
/// Run once at startup so the first real fetch does not pay for creating the
/// token generator. A failure only means the first fetch is slower.
#[async_trait]
pub trait TokenWarmup: Send + Sync {
    /// Prepare the token source.
    async fn warm_up(&self) -> Result<(), WarmupError>;
}

#[async_trait]
impl<T> TokenWarmup for std::sync::Arc<T>
where
    T: TokenWarmup + ?Sized,
{
    async fn warm_up(&self) -> Result<(), WarmupError> {
        self.as_ref().warm_up().await
    }
}

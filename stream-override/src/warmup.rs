//! Best-effort startup warm-up of the alternate token source.

use std::time::Instant;

use stream_override_core::{FeatureFlags, TokenWarmup};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info_span};

/// Spawn the token warm-up on `runtime`.
///
/// Does nothing and returns `None` when the master switch is off. The task
/// shares no state with any coordinator: a failure is logged and affects
/// nothing but the latency of the first fetch.
pub fn spawn_warmup<W>(
    runtime: &Handle,
    flags: &dyn FeatureFlags,
    warmup: W,
) -> Option<JoinHandle<()>>
where
    W: TokenWarmup + 'static,
{
    if !flags.override_enabled() {
        return None;
    }

    let span = info_span!("stream_override.warmup");
    Some(runtime.spawn(
        async move {
            let start = Instant::now();
            match warmup.warm_up().await {
                Ok(()) => debug!(
                    elapsed_ms = start.elapsed().as_millis(),
                    "Token source warmed up"
                ),
                Err(err) => error!(error = %err, "Failed to warm up token source"),
            }
        }
        .instrument(span),
    ))
}

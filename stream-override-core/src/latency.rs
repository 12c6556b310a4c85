//! Classification of latency-sensitive threads.
//!
//! Reads of an incomplete fetch are always non-blocking. When such a read
//! happens on a thread that must never stall (a rendering or decoding
//! thread), the coordinator reports it as a diagnostic condition. A
//! [`ThreadProbe`] tells it which threads those are.

use std::cell::Cell;

thread_local! {
    static LATENCY_SENSITIVE: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as latency-sensitive.
///
/// Call once at the start of a rendering or decoding thread. The mark lasts
/// until [`unmark_latency_sensitive`] is called or the thread exits.
pub fn mark_latency_sensitive() {
    LATENCY_SENSITIVE.with(|flag| flag.set(true));
}

/// Removes the latency-sensitive mark from the current thread.
pub fn unmark_latency_sensitive() {
    LATENCY_SENSITIVE.with(|flag| flag.set(false));
}

/// Returns `true` if the current thread was marked latency-sensitive.
pub fn is_marked_latency_sensitive() -> bool {
    LATENCY_SENSITIVE.with(Cell::get)
}

/// Trait for deciding whether the calling thread is latency-sensitive.
pub trait ThreadProbe: Send + Sync {
    /// Returns `true` if the current thread must not block.
    fn is_latency_sensitive(&self) -> bool;
}

/// Default probe: reports threads marked with [`mark_latency_sensitive`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LatencyMarkedThreads;

impl ThreadProbe for LatencyMarkedThreads {
    fn is_latency_sensitive(&self) -> bool {
        is_marked_latency_sensitive()
    }
}

impl<T> ThreadProbe for std::sync::Arc<T>
where
    T: ThreadProbe + ?Sized,
{
    fn is_latency_sensitive(&self) -> bool {
        self.as_ref().is_latency_sensitive()
    }
}

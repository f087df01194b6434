//! Hot-swappable holder for the active database handle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::{ArcSwap, Guard};

/// Holds the current handle for one logical database.
///
/// Readers never block: [`get`](Self::get) and [`current`](Self::current) are
/// lock-free loads and observe either the old or the new handle, never a torn
/// one. Writers are serialized against each other. A slot is always ready; it
/// is constructed from its initial handle.
///
/// Handles are reference counted, so the handle returned by [`swap`](Self::swap)
/// stays alive until the caller and every in-flight reader have dropped it.
pub struct ResourceSlot<T> {
    current: ArcSwap<T>,
    writer: Mutex<()>,
    generation: AtomicU64,
}

impl<T> ResourceSlot<T> {
    pub fn new(initial: Arc<T>) -> Self {
        Self {
            current: ArcSwap::new(initial),
            writer: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Returns an owned reference to the handle current at the time of the call.
    pub fn get(&self) -> Arc<T> {
        self.current.load_full()
    }

    /// Returns a short-lived guard to the current handle.
    ///
    /// Same contract as [`get`](Self::get), without touching the reference
    /// count on the fast path. Do not hold the guard across long operations.
    pub fn current(&self) -> Guard<Arc<T>> {
        self.current.load()
    }

    /// Installs `new` as the current handle and returns the previous one
    /// together with the generation `new` was installed as.
    ///
    /// Every `get` that starts after this returns observes `new`.
    pub fn swap(&self, new: Arc<T>) -> (Arc<T>, u64) {
        // the mutex only orders writers, it guards no data
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let old = self.current.swap(new);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        (old, generation)
    }

    /// Number of completed swaps since the slot was created.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

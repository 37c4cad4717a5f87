/*!
 * Per-Thread Data
 *
 * Lazily created context per thread, keyed by thread id. A context is only
 * ever touched by the thread that owns it.
 */

use super::traits::ThreadDataSubsystem;
use crate::core::errors::{SubsystemError, SubsystemResult};
use crate::core::limits::{DEFAULT_MAX_THREAD_CONTEXTS, FIRST_CONTEXT_HANDLE};
use crate::core::types::ContextHandle;
use ahash::RandomState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Context owned by one thread
#[derive(Debug)]
pub struct ThreadContext {
    handle: ContextHandle,
    thread: ThreadId,
    thread_name: Option<String>,
    created_at: Instant,
}

impl ThreadContext {
    fn for_current_thread(handle: ContextHandle) -> Self {
        let current = thread::current();
        Self {
            handle,
            thread: current.id(),
            thread_name: current.name().map(str::to_owned),
            created_at: Instant::now(),
        }
    }

    #[inline]
    pub fn handle(&self) -> ContextHandle {
        self.handle
    }

    #[inline]
    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    pub fn thread_name(&self) -> Option<&str> {
        self.thread_name.as_deref()
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

/// Default per-thread-data subsystem
pub struct ThreadDataStore {
    contexts: DashMap<ThreadId, Arc<ThreadContext>, RandomState>,
    /// Slots claimed against `max_contexts`, taken before inserting
    reserved: AtomicUsize,
    initialized: AtomicBool,
    next_handle: AtomicU64,
    max_contexts: usize,
}

impl ThreadDataStore {
    pub fn new(max_contexts: usize) -> Self {
        Self {
            contexts: DashMap::with_hasher(RandomState::new()),
            reserved: AtomicUsize::new(0),
            initialized: AtomicBool::new(false),
            next_handle: AtomicU64::new(FIRST_CONTEXT_HANDLE),
            max_contexts,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// The calling thread's context, without creating one
    pub fn current(&self) -> Option<Arc<ThreadContext>> {
        self.contexts
            .get(&thread::current().id())
            .map(|entry| Arc::clone(entry.value()))
    }

    fn reserve_slot(&self) -> bool {
        self.reserved
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                (used < self.max_contexts).then_some(used + 1)
            })
            .is_ok()
    }

    fn release_slot(&self) {
        let _ = self
            .reserved
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| used.checked_sub(1));
    }
}

impl Default for ThreadDataStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_THREAD_CONTEXTS)
    }
}

impl ThreadDataSubsystem for ThreadDataStore {
    fn initialize(&self) -> SubsystemResult<()> {
        if self.max_contexts == 0 {
            return Err(SubsystemError::ResourceExhausted(
                "per-thread context capacity is zero".into(),
            ));
        }

        self.initialized.store(true, Ordering::Release);
        debug!(max_contexts = self.max_contexts, "Per-thread data initialized");
        Ok(())
    }

    fn uninitialize(&self) {
        let was_initialized = self.initialized.swap(false, Ordering::AcqRel);
        let released = self.contexts.len();
        self.contexts.clear();
        self.reserved.store(0, Ordering::Release);

        if was_initialized {
            debug!(released, "Per-thread data released");
        }
    }

    fn get_or_create_nonexiting(&self) -> Option<ContextHandle> {
        if !self.is_initialized() {
            debug!("Per-thread context requested before per-thread data was initialized");
            return None;
        }

        let thread = thread::current().id();
        if let Some(existing) = self.contexts.get(&thread) {
            return Some(existing.handle);
        }

        if !self.reserve_slot() {
            warn!(
                max_contexts = self.max_contexts,
                "Per-thread context table full"
            );
            return None;
        }

        match self.contexts.entry(thread) {
            Entry::Occupied(existing) => {
                self.release_slot();
                Some(existing.get().handle)
            }
            Entry::Vacant(slot) => {
                let handle = ContextHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
                slot.insert(Arc::new(ThreadContext::for_current_thread(handle)));
                debug!(handle = %handle, "Per-thread context created");
                Some(handle)
            }
        }
    }

    fn free(&self, handle: Option<ContextHandle>) {
        let thread = thread::current().id();
        let removed = match handle {
            None => self.contexts.remove(&thread),
            Some(handle) => self
                .contexts
                .remove_if(&thread, |_, context| context.handle == handle),
        };

        if let Some((_, context)) = removed {
            self.release_slot();
            debug!(handle = %context.handle, "Per-thread context freed");
        }
    }

    fn live_contexts(&self) -> usize {
        self.contexts.len()
    }
}

/*!
 * Thread Lifecycle Hooks
 * Per-thread attach/detach and the RAII attachment guard
 */

use super::orchestrator::ProcessLifecycle;
use crate::core::errors::{LifecycleError, LifecycleResult};
use crate::core::types::ContextHandle;
use std::marker::PhantomData;
use tracing::{trace, warn};

impl ProcessLifecycle {
    /// Ensure the calling thread has a per-thread context
    ///
    /// Idempotent: an attached thread gets its existing context back.
    pub fn on_thread_attach(&self) -> LifecycleResult<ContextHandle> {
        match self.thread_data.get_or_create_nonexiting() {
            Some(handle) => {
                trace!(handle = %handle, "Thread attached");
                Ok(handle)
            }
            None => {
                warn!(state = %self.state(), "Thread attach failed, no per-thread context");
                Err(LifecycleError::ThreadAttachFailed(
                    "per-thread context could not be created".into(),
                ))
            }
        }
    }

    /// Release the calling thread's context; a no-op if it has none
    pub fn on_thread_detach(&self) {
        self.thread_data.free(None);
        trace!("Thread detached");
    }

    /// Attach the calling thread until the returned guard drops
    pub fn attach_current_thread(&self) -> LifecycleResult<ThreadAttachment<'_>> {
        let handle = self.on_thread_attach()?;
        Ok(ThreadAttachment {
            lifecycle: self,
            handle,
            _not_send: PhantomData,
        })
    }
}

/// Detaches the owning thread on drop
///
/// Not `Send`: detach frees the context of whichever thread runs it.
#[must_use = "dropping the attachment detaches the thread immediately"]
pub struct ThreadAttachment<'a> {
    lifecycle: &'a ProcessLifecycle,
    handle: ContextHandle,
    _not_send: PhantomData<*const ()>,
}

impl ThreadAttachment<'_> {
    #[inline]
    pub fn handle(&self) -> ContextHandle {
        self.handle
    }
}

impl Drop for ThreadAttachment<'_> {
    fn drop(&mut self) {
        self.lifecycle.on_thread_detach();
    }
}

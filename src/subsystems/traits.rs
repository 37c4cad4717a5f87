/*!
 * Subsystem Traits
 *
 * Contracts the orchestrator consumes. Implementations own their internals;
 * the orchestrator only sequences these entry points.
 */

use crate::core::errors::SubsystemResult;
use crate::core::types::ContextHandle;

/// Process-wide lock table
///
/// `uninitialize` must be idempotent and safe when `initialize` never
/// succeeded.
#[cfg_attr(test, mockall::automock)]
pub trait LockSubsystem: Send + Sync {
    fn initialize(&self) -> SubsystemResult<()>;

    fn uninitialize(&self);
}

/// Per-thread data
///
/// `uninitialize` must tolerate a never-initialized state: the critical
/// teardown path calls it without knowing how far initialization got.
#[cfg_attr(test, mockall::automock)]
pub trait ThreadDataSubsystem: Send + Sync {
    fn initialize(&self) -> SubsystemResult<()>;

    fn uninitialize(&self);

    /// Get the calling thread's context, creating it if absent
    ///
    /// Reports failure with `None` instead of terminating the process.
    fn get_or_create_nonexiting(&self) -> Option<ContextHandle>;

    /// Release the calling thread's context. `Some(handle)` only matches
    /// the calling thread's own context; other threads' contexts are never
    /// touched.
    fn free(&self, handle: Option<ContextHandle>);

    /// Number of threads currently holding a context
    fn live_contexts(&self) -> usize;
}

/// API indirection thunks
#[cfg_attr(test, mockall::automock)]
pub trait ApiThunks: Send + Sync {
    fn install(&self);

    /// `terminating` lets the thunk table decide how much to release
    fn uninstall(&self, terminating: bool);
}

/// Best-effort telemetry provider; never reports failure
#[cfg_attr(test, mockall::automock)]
pub trait TelemetryProvider: Send + Sync {
    fn register(&self);

    fn unregister(&self);
}

/// Pure-virtual-call fault trap
#[cfg_attr(test, mockall::automock)]
pub trait FaultTrap: Send + Sync {
    fn install(&self);
}

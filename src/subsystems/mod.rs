/*!
 * Runtime Subsystems
 *
 * Collaborator contracts consumed by the lifecycle orchestrator, plus the
 * default implementation of each:
 * - Lock table (fallible init)
 * - Per-thread data (fallible init, lazy per-thread contexts)
 * - API indirection thunks
 * - Telemetry provider (best-effort)
 * - Pure call fault trap
 */

mod fault;
mod locks;
mod telemetry;
mod thread_data;
mod thunks;
pub mod traits;

pub use fault::{PureCallHandler, PureCallTrap};
pub use locks::{LockId, LockTable};
pub use telemetry::TracingTelemetry;
pub use thread_data::{ThreadContext, ThreadDataStore};
pub use thunks::{host_resolver, Resolution, Resolver, ThunkId, ThunkTable};
pub use traits::{ApiThunks, FaultTrap, LockSubsystem, TelemetryProvider, ThreadDataSubsystem};

#[cfg(test)]
pub use traits::{
    MockApiThunks, MockFaultTrap, MockLockSubsystem, MockTelemetryProvider,
    MockThreadDataSubsystem,
};

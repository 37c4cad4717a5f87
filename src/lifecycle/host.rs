/*!
 * Host Entry Points
 *
 * Process-wide runtime singleton and the boolean entry points a loader calls
 * at process attach/detach and thread attach/detach. The singleton is built
 * lazily on first use from `LifecycleConfig::from_env()`.
 */

use super::config::LifecycleConfig;
use super::orchestrator::ProcessLifecycle;
use crate::dispatch::{self, HostProbe};
use crate::subsystems::{LockTable, PureCallTrap, ThreadDataStore, ThunkTable, TracingTelemetry};
use std::sync::{Arc, OnceLock};
use tracing::error;

/// The orchestrator together with the default subsystems it drives
pub struct Runtime {
    lifecycle: ProcessLifecycle,
    locks: Arc<LockTable>,
    thread_data: Arc<ThreadDataStore>,
    thunks: Arc<ThunkTable>,
    telemetry: Arc<TracingTelemetry>,
    fault_trap: Arc<PureCallTrap>,
}

impl Runtime {
    pub fn new(config: LifecycleConfig) -> Self {
        let locks = Arc::new(LockTable::new());
        let thread_data = Arc::new(ThreadDataStore::new(config.max_thread_contexts));
        let thunks = Arc::new(ThunkTable::new());
        let telemetry = Arc::new(TracingTelemetry::new());
        let fault_trap = Arc::new(PureCallTrap::new());

        let lifecycle = ProcessLifecycle::builder()
            .with_config(config)
            .with_dispatcher(Arc::clone(dispatch::dispatcher()))
            .with_probe(Arc::new(HostProbe))
            .with_fault_trap(fault_trap.clone())
            .with_thunks(thunks.clone())
            .with_locks(locks.clone())
            .with_thread_data(thread_data.clone())
            .with_telemetry(telemetry.clone())
            .build();

        Self {
            lifecycle,
            locks,
            thread_data,
            thunks,
            telemetry,
            fault_trap,
        }
    }

    pub fn lifecycle(&self) -> &ProcessLifecycle {
        &self.lifecycle
    }

    pub fn locks(&self) -> &LockTable {
        &self.locks
    }

    pub fn thread_data(&self) -> &ThreadDataStore {
        &self.thread_data
    }

    pub fn thunks(&self) -> &ThunkTable {
        &self.thunks
    }

    pub fn telemetry(&self) -> &TracingTelemetry {
        &self.telemetry
    }

    pub fn fault_trap(&self) -> &PureCallTrap {
        &self.fault_trap
    }
}

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Get the process-wide runtime, building it on first use
pub fn runtime() -> &'static Runtime {
    RUNTIME.get_or_init(|| Runtime::new(LifecycleConfig::from_env()))
}

/// Process attach
pub fn initialize_process() -> bool {
    match runtime().lifecycle().initialize_process() {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, "Process attach failed");
            false
        }
    }
}

/// Process detach; always succeeds
pub fn uninitialize_process(terminating: bool) -> bool {
    if let Some(runtime) = RUNTIME.get() {
        runtime.lifecycle().uninitialize_process(terminating);
    }
    true
}

/// Abnormal exit; always succeeds, even if the runtime was never built
pub fn uninitialize_process_critical() -> bool {
    if let Some(runtime) = RUNTIME.get() {
        runtime.lifecycle().uninitialize_process_critical();
    }
    true
}

/// Thread attach
pub fn on_thread_attach() -> bool {
    match runtime().lifecycle().on_thread_attach() {
        Ok(_) => true,
        Err(e) => {
            error!(error = %e, "Thread attach failed");
            false
        }
    }
}

/// Thread detach; always succeeds
pub fn on_thread_detach() -> bool {
    if let Some(runtime) = RUNTIME.get() {
        runtime.lifecycle().on_thread_detach();
    }
    true
}

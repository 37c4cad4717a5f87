/*!
 * Process Lifecycle Orchestrator
 *
 * Brings the runtime up once per process and tears it down once.
 *
 * # Initialization order
 *
 * 1. Platform feature table (loadable-module builds only)
 * 2. Capability dispatch (bulk copy family)
 * 3. Pure call trap
 * 4. API thunks
 * 5. Locks (fallible)
 * 6. Per-thread data (fallible, rolls back locks)
 * 7. Telemetry (best-effort)
 *
 * Steps 5-7 form the tracked registry: a failure leaves none of them live.
 *
 * # Teardown
 *
 * Telemetry always goes first. The rest (per-thread data, locks, thunks) is
 * skipped when the process is terminating unless strict cleanup is on.
 */

use super::config::LifecycleConfig;
use super::sequence::{InitSequence, Stage};
use super::state::{LiveSet, StateCell};
use crate::core::errors::{LifecycleError, LifecycleResult};
use crate::core::types::{LifecycleState, SubsystemId};
use crate::dispatch::{
    self, init_isa_table, isa_table, CapabilityDispatcher, CapabilityProbe, CopyFamily, HostProbe,
    IsaFeatures,
};
use crate::subsystems::{
    ApiThunks, FaultTrap, LockSubsystem, LockTable, PureCallTrap, TelemetryProvider,
    ThreadDataStore, ThreadDataSubsystem, ThunkTable, TracingTelemetry,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Rollback-tracked subsystems, in initialization order
const TRACKED: [SubsystemId; 3] = [
    SubsystemId::Locks,
    SubsystemId::ThreadData,
    SubsystemId::Telemetry,
];

/// What a teardown call actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Teardown {
    /// The process was not ready; nothing was touched
    NotReady,
    /// Terminating without strict cleanup: only telemetry was released
    TelemetryOnly,
    /// Telemetry, per-thread data, locks and thunks were released
    Full,
}

/// Serializable view of the lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleSnapshot {
    pub state: LifecycleState,
    pub copy_family: CopyFamily,
    pub copy_family_selected: bool,
    pub strict_cleanup: bool,
    pub feature_table: Option<IsaFeatures>,
    /// Tracked subsystems still live, in initialization order
    pub live_subsystems: Vec<SubsystemId>,
    pub attached_threads: usize,
}

/// Process lifecycle coordinator
pub struct ProcessLifecycle {
    config: LifecycleConfig,
    state: StateCell,
    live: LiveSet,
    dispatcher: Arc<CapabilityDispatcher>,
    probe: Arc<dyn CapabilityProbe>,
    fault_trap: Arc<dyn FaultTrap>,
    thunks: Arc<dyn ApiThunks>,
    locks: Arc<dyn LockSubsystem>,
    pub(super) thread_data: Arc<dyn ThreadDataSubsystem>,
    telemetry: Arc<dyn TelemetryProvider>,
}

impl ProcessLifecycle {
    pub fn builder() -> ProcessLifecycleBuilder {
        ProcessLifecycleBuilder::new()
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.state.load()
    }

    pub fn dispatcher(&self) -> &Arc<CapabilityDispatcher> {
        &self.dispatcher
    }

    pub fn snapshot(&self) -> LifecycleSnapshot {
        LifecycleSnapshot {
            state: self.state.load(),
            copy_family: self.dispatcher.binding().family(),
            copy_family_selected: self.dispatcher.is_selected(),
            strict_cleanup: self.config.strict_cleanup,
            feature_table: isa_table().copied(),
            live_subsystems: self.live.members(&TRACKED),
            attached_threads: self.thread_data.live_contexts(),
        }
    }

    fn registry(&self) -> InitSequence<'_> {
        InitSequence::new()
            .stage(Stage::fallible(
                SubsystemId::Locks,
                || self.locks.initialize(),
                || self.locks.uninitialize(),
            ))
            .stage(Stage::fallible(
                SubsystemId::ThreadData,
                || self.thread_data.initialize(),
                || self.thread_data.uninitialize(),
            ))
            .stage(Stage::infallible(
                SubsystemId::Telemetry,
                || self.telemetry.register(),
                || self.telemetry.unregister(),
            ))
    }

    /// Initialize the runtime for this process
    ///
    /// On failure every tracked subsystem that had started is rolled back
    /// and the state becomes `InitFailed`; the host may retry.
    #[instrument(skip(self), level = "debug")]
    pub fn initialize_process(&self) -> LifecycleResult<()> {
        self.state.transition(
            LifecycleState::can_initialize,
            LifecycleState::Initializing,
            "initialize_process",
        )?;

        info!(
            strict_cleanup = self.config.strict_cleanup,
            loadable_module = self.config.loadable_module,
            "Initializing process runtime"
        );

        if self.config.loadable_module {
            init_isa_table();
        }

        let binding = self.dispatcher.select_fast_path(self.probe.as_ref());
        debug!(family = %binding.family(), "Capability dispatch complete");

        self.fault_trap.install();
        self.thunks.install();

        match self.registry().initialize() {
            Ok(count) => {
                self.live.insert_all(&TRACKED);
                self.state.store(LifecycleState::Ready);
                info!(subsystems = count, "Process runtime ready");
                Ok(())
            }
            Err(failure) => {
                self.live.clear();
                self.state.store(LifecycleState::InitFailed);
                error!(
                    subsystem = %failure.failed,
                    rolled_back = ?failure.rolled_back,
                    error = %failure.error,
                    "Process runtime initialization failed"
                );
                Err(LifecycleError::InitializationFailed {
                    subsystem: failure.failed,
                    reason: failure.error.to_string(),
                })
            }
        }
    }

    /// Tear the runtime down at process detach
    ///
    /// Never fails. The returned value says which path ran.
    #[instrument(skip(self), level = "debug")]
    pub fn uninitialize_process(&self, terminating: bool) -> Teardown {
        if let Err(e) = self.state.transition(
            |state| state == LifecycleState::Ready,
            LifecycleState::Uninitializing,
            "uninitialize_process",
        ) {
            warn!(error = %e, "Process teardown requested while not ready, nothing to release");
            return Teardown::NotReady;
        }

        self.telemetry.unregister();
        self.live.remove(SubsystemId::Telemetry);

        let teardown = if !terminating || self.config.strict_cleanup {
            self.thread_data.uninitialize();
            self.locks.uninitialize();
            self.thunks.uninstall(terminating);
            self.live.clear();
            Teardown::Full
        } else {
            debug!("Process terminating, leaving reclamation to the OS");
            Teardown::TelemetryOnly
        };

        self.state.store(LifecycleState::TornDown);
        info!(terminating, teardown = ?teardown, "Process runtime uninitialized");
        teardown
    }

    /// Emergency teardown for abnormal exit
    ///
    /// Touches only per-thread data. Safe whether or not initialization ran.
    pub fn uninitialize_process_critical(&self) {
        // No logging: the faulting thread may own the subscriber's locks.
        self.thread_data.uninitialize();
        self.live.remove(SubsystemId::ThreadData);
    }
}

/// Builder for [`ProcessLifecycle`]; unset collaborators get defaults
#[derive(Default)]
pub struct ProcessLifecycleBuilder {
    config: Option<LifecycleConfig>,
    dispatcher: Option<Arc<CapabilityDispatcher>>,
    probe: Option<Arc<dyn CapabilityProbe>>,
    fault_trap: Option<Arc<dyn FaultTrap>>,
    thunks: Option<Arc<dyn ApiThunks>>,
    locks: Option<Arc<dyn LockSubsystem>>,
    thread_data: Option<Arc<dyn ThreadDataSubsystem>>,
    telemetry: Option<Arc<dyn TelemetryProvider>>,
}

impl ProcessLifecycleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(mut self, config: LifecycleConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Defaults to the process-wide dispatcher
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Arc<CapabilityDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn CapabilityProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    #[must_use]
    pub fn with_fault_trap(mut self, trap: Arc<dyn FaultTrap>) -> Self {
        self.fault_trap = Some(trap);
        self
    }

    #[must_use]
    pub fn with_thunks(mut self, thunks: Arc<dyn ApiThunks>) -> Self {
        self.thunks = Some(thunks);
        self
    }

    #[must_use]
    pub fn with_locks(mut self, locks: Arc<dyn LockSubsystem>) -> Self {
        self.locks = Some(locks);
        self
    }

    #[must_use]
    pub fn with_thread_data(mut self, thread_data: Arc<dyn ThreadDataSubsystem>) -> Self {
        self.thread_data = Some(thread_data);
        self
    }

    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetryProvider>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn build(self) -> ProcessLifecycle {
        let config = self.config.unwrap_or_default();
        let max_thread_contexts = config.max_thread_contexts;

        ProcessLifecycle {
            state: StateCell::new(),
            live: LiveSet::new(),
            dispatcher: self
                .dispatcher
                .unwrap_or_else(|| Arc::clone(dispatch::dispatcher())),
            probe: self.probe.unwrap_or_else(|| Arc::new(HostProbe)),
            fault_trap: self
                .fault_trap
                .unwrap_or_else(|| Arc::new(PureCallTrap::new())),
            thunks: self.thunks.unwrap_or_else(|| Arc::new(ThunkTable::new())),
            locks: self.locks.unwrap_or_else(|| Arc::new(LockTable::new())),
            thread_data: self
                .thread_data
                .unwrap_or_else(|| Arc::new(ThreadDataStore::new(max_thread_contexts))),
            telemetry: self
                .telemetry
                .unwrap_or_else(|| Arc::new(TracingTelemetry::new())),
            config,
        }
    }
}

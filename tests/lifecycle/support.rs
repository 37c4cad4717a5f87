/*!
 * Recording fakes shared by the lifecycle tests
 */

use parking_lot::Mutex;
use runtime_lifecycle::dispatch::{CapabilityDispatcher, CapabilityProbe, FeatureId};
use runtime_lifecycle::subsystems::{
    ApiThunks, FaultTrap, LockSubsystem, TelemetryProvider, ThreadDataSubsystem,
};
use runtime_lifecycle::{
    ContextHandle, LifecycleConfig, ProcessLifecycle, SubsystemError, SubsystemResult,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Probe,
    TrapInstall,
    ThunksInstall,
    ThunksUninstall { terminating: bool },
    LocksInit,
    LocksUninit,
    ThreadDataInit,
    ThreadDataUninit,
    ContextCreate,
    ContextFree { handle: Option<ContextHandle> },
    TelemetryRegister,
    TelemetryUnregister,
}

#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.lock().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }

    pub fn count(&self, event: Event) -> usize {
        self.0.lock().iter().filter(|e| **e == event).count()
    }
}

pub struct FakeProbe {
    log: EventLog,
    external_cache: AtomicBool,
}

impl FakeProbe {
    pub fn set_external_cache(&self, present: bool) {
        self.external_cache.store(present, Ordering::SeqCst);
    }
}

impl CapabilityProbe for FakeProbe {
    fn present(&self, feature: FeatureId) -> bool {
        self.log.push(Event::Probe);
        feature == FeatureId::ExternalCache && self.external_cache.load(Ordering::SeqCst)
    }
}

pub struct FakeTrap {
    log: EventLog,
}

impl FaultTrap for FakeTrap {
    fn install(&self) {
        self.log.push(Event::TrapInstall);
    }
}

pub struct FakeThunks {
    log: EventLog,
    pub installed: AtomicBool,
}

impl ApiThunks for FakeThunks {
    fn install(&self) {
        self.log.push(Event::ThunksInstall);
        self.installed.store(true, Ordering::SeqCst);
    }

    fn uninstall(&self, terminating: bool) {
        self.log.push(Event::ThunksUninstall { terminating });
        self.installed.store(false, Ordering::SeqCst);
    }
}

pub struct FakeLocks {
    log: EventLog,
    pub fail: AtomicBool,
    pub initialized: AtomicBool,
}

impl LockSubsystem for FakeLocks {
    fn initialize(&self) -> SubsystemResult<()> {
        self.log.push(Event::LocksInit);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SubsystemError::AllocationFailed("fake locks".into()));
        }
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn uninitialize(&self) {
        self.log.push(Event::LocksUninit);
        self.initialized.store(false, Ordering::SeqCst);
    }
}

pub struct FakeThreadData {
    log: EventLog,
    pub fail: AtomicBool,
    pub fail_create: AtomicBool,
    pub initialized: AtomicBool,
    contexts: Mutex<HashMap<ThreadId, ContextHandle>>,
    next: AtomicU64,
    pub created: AtomicUsize,
}

impl FakeThreadData {
    pub fn live_contexts(&self) -> usize {
        self.contexts.lock().len()
    }
}

impl ThreadDataSubsystem for FakeThreadData {
    fn initialize(&self) -> SubsystemResult<()> {
        self.log.push(Event::ThreadDataInit);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SubsystemError::ResourceExhausted("fake slots".into()));
        }
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn uninitialize(&self) {
        self.log.push(Event::ThreadDataUninit);
        self.initialized.store(false, Ordering::SeqCst);
        self.contexts.lock().clear();
    }

    fn get_or_create_nonexiting(&self) -> Option<ContextHandle> {
        let mut contexts = self.contexts.lock();
        let thread = thread::current().id();
        if let Some(handle) = contexts.get(&thread) {
            return Some(*handle);
        }
        if self.fail_create.load(Ordering::SeqCst) {
            return None;
        }

        self.log.push(Event::ContextCreate);
        self.created.fetch_add(1, Ordering::SeqCst);
        let handle = ContextHandle::new(self.next.fetch_add(1, Ordering::SeqCst) + 1);
        contexts.insert(thread, handle);
        Some(handle)
    }

    fn free(&self, handle: Option<ContextHandle>) {
        self.log.push(Event::ContextFree { handle });
        self.contexts.lock().remove(&thread::current().id());
    }

    fn live_contexts(&self) -> usize {
        self.contexts.lock().len()
    }
}

pub struct FakeTelemetry {
    log: EventLog,
    pub registered: AtomicBool,
}

impl TelemetryProvider for FakeTelemetry {
    fn register(&self) {
        self.log.push(Event::TelemetryRegister);
        self.registered.store(true, Ordering::SeqCst);
    }

    fn unregister(&self) {
        self.log.push(Event::TelemetryUnregister);
        self.registered.store(false, Ordering::SeqCst);
    }
}

/// A lifecycle wired to recording fakes
pub struct Harness {
    pub log: EventLog,
    pub probe: Arc<FakeProbe>,
    pub dispatcher: Arc<CapabilityDispatcher>,
    pub thunks: Arc<FakeThunks>,
    pub locks: Arc<FakeLocks>,
    pub thread_data: Arc<FakeThreadData>,
    pub telemetry: Arc<FakeTelemetry>,
    pub lifecycle: ProcessLifecycle,
}

impl Harness {
    pub fn new(config: LifecycleConfig) -> Self {
        Self::with_failures(config, false, false)
    }

    pub fn with_failures(config: LifecycleConfig, fail_locks: bool, fail_thread_data: bool) -> Self {
        let log = EventLog::default();
        let probe = Arc::new(FakeProbe {
            log: log.clone(),
            external_cache: AtomicBool::new(false),
        });
        let dispatcher = Arc::new(CapabilityDispatcher::new());
        let trap = Arc::new(FakeTrap { log: log.clone() });
        let thunks = Arc::new(FakeThunks {
            log: log.clone(),
            installed: AtomicBool::new(false),
        });
        let locks = Arc::new(FakeLocks {
            log: log.clone(),
            fail: AtomicBool::new(fail_locks),
            initialized: AtomicBool::new(false),
        });
        let thread_data = Arc::new(FakeThreadData {
            log: log.clone(),
            fail: AtomicBool::new(fail_thread_data),
            fail_create: AtomicBool::new(false),
            initialized: AtomicBool::new(false),
            contexts: Mutex::new(HashMap::new()),
            next: AtomicU64::new(0),
            created: AtomicUsize::new(0),
        });
        let telemetry = Arc::new(FakeTelemetry {
            log: log.clone(),
            registered: AtomicBool::new(false),
        });

        let lifecycle = ProcessLifecycle::builder()
            .with_config(config.with_loadable_module(false))
            .with_dispatcher(dispatcher.clone())
            .with_probe(probe.clone())
            .with_fault_trap(trap)
            .with_thunks(thunks.clone())
            .with_locks(locks.clone())
            .with_thread_data(thread_data.clone())
            .with_telemetry(telemetry.clone())
            .build();

        Self {
            log,
            probe,
            dispatcher,
            thunks,
            locks,
            thread_data,
            telemetry,
            lifecycle,
        }
    }

    /// Initialize, then forget the init events
    pub fn ready(config: LifecycleConfig) -> Self {
        let harness = Self::new(config);
        harness
            .lifecycle
            .initialize_process()
            .expect("fake subsystems initialize");
        harness.log.clear();
        harness
    }

    pub fn locks_live(&self) -> bool {
        self.locks.initialized.load(Ordering::SeqCst)
    }

    pub fn thread_data_live(&self) -> bool {
        self.thread_data.initialized.load(Ordering::SeqCst)
    }

    pub fn telemetry_live(&self) -> bool {
        self.telemetry.registered.load(Ordering::SeqCst)
    }
}

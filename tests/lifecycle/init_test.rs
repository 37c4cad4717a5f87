/*!
 * Process Initialization Tests
 * Ordering, rollback and state transitions of initialize_process
 */

use super::support::{Event, Harness};
use pretty_assertions::assert_eq;
use runtime_lifecycle::{
    CopyFamily, LifecycleConfig, LifecycleError, LifecycleState, SubsystemId,
};

#[test]
fn test_initialize_runs_fixed_order() {
    let harness = Harness::new(LifecycleConfig::release());
    harness.lifecycle.initialize_process().unwrap();

    assert_eq!(
        harness.log.events(),
        vec![
            Event::Probe,
            Event::TrapInstall,
            Event::ThunksInstall,
            Event::LocksInit,
            Event::ThreadDataInit,
            Event::TelemetryRegister,
        ]
    );
    assert_eq!(harness.lifecycle.state(), LifecycleState::Ready);
}

#[test]
fn test_thread_data_failure_scenario() {
    let harness = Harness::with_failures(LifecycleConfig::release(), false, true);
    let err = harness.lifecycle.initialize_process().unwrap_err();

    assert!(matches!(
        err,
        LifecycleError::InitializationFailed {
            subsystem: SubsystemId::ThreadData,
            ..
        }
    ));
    assert!(!harness.locks_live());
    assert!(!harness.thread_data_live());
    assert!(!harness.telemetry_live());
    assert_eq!(harness.log.count(Event::TelemetryRegister), 0);
    assert_eq!(harness.log.count(Event::LocksUninit), 1);
    assert_eq!(harness.lifecycle.state(), LifecycleState::InitFailed);
}

#[test]
fn test_lock_failure_stops_before_thread_data() {
    let harness = Harness::with_failures(LifecycleConfig::release(), true, false);
    assert!(harness.lifecycle.initialize_process().is_err());

    let events = harness.log.events();
    assert_eq!(events.last(), Some(&Event::LocksInit));
    assert_eq!(harness.log.count(Event::ThreadDataInit), 0);
    assert_eq!(harness.log.count(Event::LocksUninit), 0);
}

#[test]
fn test_retry_after_failure() {
    let harness = Harness::with_failures(LifecycleConfig::release(), false, true);
    assert!(harness.lifecycle.initialize_process().is_err());

    harness
        .thread_data
        .fail
        .store(false, std::sync::atomic::Ordering::SeqCst);
    harness.lifecycle.initialize_process().unwrap();

    assert!(harness.locks_live());
    assert!(harness.thread_data_live());
    assert!(harness.telemetry_live());
    assert_eq!(harness.lifecycle.state(), LifecycleState::Ready);
}

#[test]
fn test_capability_binding_is_one_shot() {
    let harness = Harness::new(LifecycleConfig::release());
    harness.probe.set_external_cache(true);
    harness.lifecycle.initialize_process().unwrap();
    assert_eq!(harness.dispatcher.binding().family(), CopyFamily::Integer);

    harness.lifecycle.uninitialize_process(false);
    harness.probe.set_external_cache(false);
    harness.lifecycle.initialize_process().unwrap();

    assert_eq!(harness.dispatcher.binding().family(), CopyFamily::Integer);
    assert_eq!(harness.log.count(Event::Probe), 1);
}

#[test]
fn test_no_external_cache_keeps_vector_family() {
    let harness = Harness::new(LifecycleConfig::release());
    harness.lifecycle.initialize_process().unwrap();
    assert_eq!(harness.dispatcher.binding().family(), CopyFamily::Vector);
    assert!(harness.dispatcher.is_selected());
}

/*!
 * Thread Hook Tests
 * Attach idempotence, total detach, concurrent threads
 */

use super::support::{Event, Harness};
use pretty_assertions::assert_eq;
use runtime_lifecycle::{LifecycleConfig, LifecycleError};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

#[test]
fn test_double_attach_creates_one_context() {
    let harness = Harness::ready(LifecycleConfig::release());

    let first = harness.lifecycle.on_thread_attach().unwrap();
    let second = harness.lifecycle.on_thread_attach().unwrap();

    assert_eq!(first, second);
    assert_eq!(harness.log.count(Event::ContextCreate), 1);
    assert_eq!(harness.thread_data.created.load(Ordering::SeqCst), 1);
}

#[test]
fn test_detach_without_attach_frees_nothing_foreign() {
    let harness = Harness::ready(LifecycleConfig::release());

    harness.lifecycle.on_thread_detach();

    assert_eq!(
        harness.log.events(),
        vec![Event::ContextFree { handle: None }]
    );
    assert_eq!(harness.thread_data.live_contexts(), 0);
}

#[test]
fn test_attach_failure_propagates() {
    let harness = Harness::ready(LifecycleConfig::release());
    harness.thread_data.fail_create.store(true, Ordering::SeqCst);

    assert!(matches!(
        harness.lifecycle.on_thread_attach(),
        Err(LifecycleError::ThreadAttachFailed(_))
    ));
}

#[test]
fn test_detach_then_attach_creates_fresh_context() {
    let harness = Harness::ready(LifecycleConfig::release());

    let first = harness.lifecycle.on_thread_attach().unwrap();
    harness.lifecycle.on_thread_detach();
    let second = harness.lifecycle.on_thread_attach().unwrap();

    assert_ne!(first, second);
    assert_eq!(harness.log.count(Event::ContextCreate), 2);
}

#[test]
fn test_threads_attach_concurrently() {
    let harness = Arc::new(Harness::ready(LifecycleConfig::release()));

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let harness = Arc::clone(&harness);
            thread::spawn(move || {
                let attachment = harness.lifecycle.attach_current_thread().unwrap();
                let again = harness.lifecycle.on_thread_attach().unwrap();
                assert_eq!(attachment.handle(), again);
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(harness.thread_data.created.load(Ordering::SeqCst), 8);
    assert_eq!(harness.thread_data.live_contexts(), 0);
}

/*!
 * Runtime Lifecycle
 * Process and thread lifecycle orchestration for a runtime-support library
 */

pub mod core;
pub mod dispatch;
pub mod lifecycle;
pub mod monitoring;
pub mod subsystems;

// Re-exports
pub use crate::core::errors::*;
pub use crate::core::types::*;
pub use dispatch::{bulk_copy, CapabilityDispatcher, CapabilityProbe, CopyFamily, FeatureId};
pub use lifecycle::host::{
    initialize_process, on_thread_attach, on_thread_detach, uninitialize_process,
    uninitialize_process_critical,
};
pub use lifecycle::{LifecycleConfig, ProcessLifecycle, Teardown, ThreadAttachment};
pub use monitoring::init_tracing;

/*!
 * Process and Thread Lifecycle
 * Ordered initialization, rollback, teardown policy and thread hooks
 */

pub mod config;
pub mod host;
pub mod orchestrator;
pub mod sequence;
mod state;
mod thread;

// Re-export public types
pub use config::LifecycleConfig;
pub use host::Runtime;
pub use orchestrator::{LifecycleSnapshot, ProcessLifecycle, ProcessLifecycleBuilder, Teardown};
pub use sequence::{InitSequence, SequenceFailure, Stage};
pub use thread::ThreadAttachment;

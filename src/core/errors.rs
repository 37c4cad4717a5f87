/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::{LifecycleState, SubsystemId};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by collaborator subsystems
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SubsystemError {
    #[error("Resource exhausted: {0}")]
    #[diagnostic(
        code(subsystem::resource_exhausted),
        help("The subsystem has no capacity left. Raise its configured limit or release resources.")
    )]
    ResourceExhausted(String),

    #[error("Subsystem not initialized: {0}")]
    #[diagnostic(
        code(subsystem::not_initialized),
        help("Call initialize_process before using this subsystem.")
    )]
    NotInitialized(String),

    #[error("Allocation failed: {0}")]
    #[diagnostic(
        code(subsystem::allocation_failed),
        help("System may be low on memory.")
    )]
    AllocationFailed(String),
}

/// Errors surfaced by the process lifecycle orchestrator
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum LifecycleError {
    #[error("Initialization failed for {subsystem}: {reason}")]
    #[diagnostic(
        code(lifecycle::initialization_failed),
        help("Every subsystem that had started was rolled back. The host may retry initialization.")
    )]
    InitializationFailed {
        subsystem: SubsystemId,
        reason: String,
    },

    #[error("Invalid lifecycle state transition: cannot {operation} while {state}")]
    #[diagnostic(
        code(lifecycle::invalid_state),
        help("Process initialization and teardown must be serialized by the host.")
    )]
    InvalidStateTransition {
        state: LifecycleState,
        operation: String,
    },

    #[error("Thread attach failed: {0}")]
    #[diagnostic(
        code(lifecycle::thread_attach_failed),
        help("The per-thread context could not be created. The thread should not proceed.")
    )]
    ThreadAttachFailed(String),
}

/// Errors from the bulk copy dispatch layer
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum DispatchError {
    #[error("Copy of {len} bytes from {src} to {dst} exceeds buffer of {buffer_len} bytes")]
    #[diagnostic(code(dispatch::out_of_bounds))]
    OutOfBounds {
        src: usize,
        dst: usize,
        len: usize,
        buffer_len: usize,
    },
}

pub type SubsystemResult<T> = Result<T, SubsystemError>;
pub type LifecycleResult<T> = Result<T, LifecycleError>;
pub type DispatchResult<T> = Result<T, DispatchError>;

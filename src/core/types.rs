/*!
 * Core Types
 * Identifiers and state shared by the dispatcher, subsystems and orchestrator
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named lifecycle step, in the order the orchestrator brings them up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsystemId {
    FeatureTable,
    CapabilityDispatch,
    FaultTrap,
    ApiThunks,
    Locks,
    ThreadData,
    Telemetry,
}

impl SubsystemId {
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            SubsystemId::FeatureTable => "feature-table",
            SubsystemId::CapabilityDispatch => "capability-dispatch",
            SubsystemId::FaultTrap => "fault-trap",
            SubsystemId::ApiThunks => "api-thunks",
            SubsystemId::Locks => "locks",
            SubsystemId::ThreadData => "thread-data",
            SubsystemId::Telemetry => "telemetry",
        }
    }
}

impl fmt::Display for SubsystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Process lifecycle state
///
/// ```text
/// Uninitialized -> Initializing -> Ready -> Uninitializing -> TornDown
///                        |
///                        +-> InitFailed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LifecycleState {
    Uninitialized = 0,
    Initializing = 1,
    Ready = 2,
    Uninitializing = 3,
    TornDown = 4,
    InitFailed = 5,
}

impl LifecycleState {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(LifecycleState::Uninitialized),
            1 => Some(LifecycleState::Initializing),
            2 => Some(LifecycleState::Ready),
            3 => Some(LifecycleState::Uninitializing),
            4 => Some(LifecycleState::TornDown),
            5 => Some(LifecycleState::InitFailed),
            _ => None,
        }
    }

    /// States from which `initialize_process` may start
    ///
    /// `InitFailed` and `TornDown` permit a host retry or a module reload.
    #[inline]
    pub const fn can_initialize(self) -> bool {
        matches!(
            self,
            LifecycleState::Uninitialized | LifecycleState::InitFailed | LifecycleState::TornDown
        )
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Initializing => "initializing",
            LifecycleState::Ready => "ready",
            LifecycleState::Uninitializing => "uninitializing",
            LifecycleState::TornDown => "torn_down",
            LifecycleState::InitFailed => "init_failed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle to a per-thread context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextHandle(u64);

impl ContextHandle {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

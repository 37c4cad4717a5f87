/*!
 * Lifecycle State Cell
 *
 * Atomic holders for the process lifecycle state and the set of live tracked
 * subsystems. Lock-free so the critical teardown path can update them while
 * other locks may be held or corrupted.
 */

use crate::core::errors::{LifecycleError, LifecycleResult};
use crate::core::types::{LifecycleState, SubsystemId};
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) const fn new() -> Self {
        Self(AtomicU8::new(LifecycleState::Uninitialized as u8))
    }

    #[inline]
    pub(crate) fn load(&self) -> LifecycleState {
        LifecycleState::from_u8(self.0.load(Ordering::Acquire))
            .unwrap_or(LifecycleState::Uninitialized)
    }

    #[inline]
    pub(crate) fn store(&self, state: LifecycleState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Move to `next` if the current state satisfies `allowed`
    ///
    /// Returns the state that was left.
    pub(crate) fn transition(
        &self,
        allowed: impl Fn(LifecycleState) -> bool,
        next: LifecycleState,
        operation: &str,
    ) -> LifecycleResult<LifecycleState> {
        let mut current = self.load();
        loop {
            if !allowed(current) {
                return Err(LifecycleError::InvalidStateTransition {
                    state: current,
                    operation: operation.to_string(),
                });
            }

            match self.0.compare_exchange(
                current as u8,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(current),
                Err(actual) => {
                    current =
                        LifecycleState::from_u8(actual).unwrap_or(LifecycleState::Uninitialized);
                }
            }
        }
    }
}

/// Bit set of live subsystems, one bit per `SubsystemId`
#[derive(Debug, Default)]
pub(crate) struct LiveSet(AtomicU8);

impl LiveSet {
    pub(crate) const fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    #[inline]
    const fn bit(id: SubsystemId) -> u8 {
        1 << (id as u8)
    }

    pub(crate) fn insert_all(&self, ids: &[SubsystemId]) {
        let bits = ids.iter().fold(0u8, |acc, id| acc | Self::bit(*id));
        self.0.fetch_or(bits, Ordering::AcqRel);
    }

    pub(crate) fn remove(&self, id: SubsystemId) {
        self.0.fetch_and(!Self::bit(id), Ordering::AcqRel);
    }

    pub(crate) fn clear(&self) {
        self.0.store(0, Ordering::Release);
    }

    /// Live members of `order`, in that order
    pub(crate) fn members(&self, order: &[SubsystemId]) -> Vec<SubsystemId> {
        let bits = self.0.load(Ordering::Acquire);
        order
            .iter()
            .copied()
            .filter(|id| bits & Self::bit(*id) != 0)
            .collect()
    }
}

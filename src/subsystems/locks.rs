/*!
 * Lock Table
 * Fixed set of process-wide mutexes, allocated at init and dropped at uninit
 */

use super::traits::LockSubsystem;
use crate::core::errors::{SubsystemError, SubsystemResult};
use parking_lot::{Mutex, RwLock};
use tracing::debug;

/// Named slots in the process-wide lock table
///
/// The table only provides the mutexes. Host code that needs process-wide
/// serialization takes one through [`LockTable::with_lock`]; the built-in
/// thunk table and telemetry session keep their own locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockId {
    Undecorate,
    ThunkResolution,
    TelemetrySession,
}

impl LockId {
    pub const ALL: [LockId; 3] = [
        LockId::Undecorate,
        LockId::ThunkResolution,
        LockId::TelemetrySession,
    ];

    pub const COUNT: usize = Self::ALL.len();

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

/// Default lock subsystem
#[derive(Default)]
pub struct LockTable {
    locks: RwLock<Option<Box<[Mutex<()>]>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.locks.read().is_some()
    }

    /// Run `f` while holding lock `id`
    pub fn with_lock<R>(&self, id: LockId, f: impl FnOnce() -> R) -> SubsystemResult<R> {
        let table = self.locks.read();
        let locks = table
            .as_ref()
            .ok_or_else(|| SubsystemError::NotInitialized("lock table".into()))?;
        let _held = locks[id.index()].lock();
        Ok(f())
    }
}

impl LockSubsystem for LockTable {
    fn initialize(&self) -> SubsystemResult<()> {
        let mut table = self.locks.write();
        if table.is_some() {
            return Ok(());
        }

        let mut locks = Vec::new();
        locks
            .try_reserve_exact(LockId::COUNT)
            .map_err(|e| SubsystemError::AllocationFailed(format!("lock table: {}", e)))?;
        locks.extend(LockId::ALL.iter().map(|_| Mutex::new(())));

        *table = Some(locks.into_boxed_slice());
        debug!(count = LockId::COUNT, "Lock table initialized");
        Ok(())
    }

    fn uninitialize(&self) {
        if self.locks.write().take().is_some() {
            debug!("Lock table released");
        }
    }
}

/*!
 * API Indirection Thunks
 *
 * Entries for the thread-storage API family start out pending and are
 * resolved on first use, either to the native entry point or to the fallback
 * built on the older API. Native resolution pins a module reference that is
 * released at uninstall unless the process is terminating.
 */

use super::traits::ApiThunks;
use ahash::RandomState;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

/// Indirected API entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThunkId {
    StorageAlloc,
    StorageFree,
    StorageGet,
    StorageSet,
}

impl ThunkId {
    pub const ALL: [ThunkId; 4] = [
        ThunkId::StorageAlloc,
        ThunkId::StorageFree,
        ThunkId::StorageGet,
        ThunkId::StorageSet,
    ];
}

/// How a thunk was bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Native,
    Fallback,
}

/// Maps an entry point to its resolution
pub type Resolver = fn(ThunkId) -> Resolution;

/// Fiber-local storage is a Windows API; everywhere else the thread-local
/// fallback is used.
pub fn host_resolver(_id: ThunkId) -> Resolution {
    if cfg!(windows) {
        Resolution::Native
    } else {
        Resolution::Fallback
    }
}

type ThunkMap = HashMap<ThunkId, Option<Resolution>, RandomState>;

/// Default API indirection subsystem
pub struct ThunkTable {
    entries: RwLock<Option<ThunkMap>>,
    module_refs: AtomicUsize,
    resolver: Resolver,
}

impl ThunkTable {
    pub fn new() -> Self {
        Self::with_resolver(host_resolver)
    }

    pub fn with_resolver(resolver: Resolver) -> Self {
        Self {
            entries: RwLock::new(None),
            module_refs: AtomicUsize::new(0),
            resolver,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.entries.read().is_some()
    }

    /// Module references pinned by native resolutions
    pub fn held_module_refs(&self) -> usize {
        self.module_refs.load(Ordering::Acquire)
    }

    /// Resolve `id`, binding it on first use
    ///
    /// Returns `None` when the table is not installed.
    pub fn resolve(&self, id: ThunkId) -> Option<Resolution> {
        {
            let entries = self.entries.read();
            if let Some(Some(resolution)) = entries.as_ref()?.get(&id) {
                return Some(*resolution);
            }
        }

        let mut entries = self.entries.write();
        let slot = entries.as_mut()?.entry(id).or_insert(None);
        if let Some(resolution) = *slot {
            return Some(resolution);
        }

        let resolution = (self.resolver)(id);
        if resolution == Resolution::Native {
            self.module_refs.fetch_add(1, Ordering::AcqRel);
        }
        *slot = Some(resolution);
        trace!(thunk = ?id, resolution = ?resolution, "Thunk resolved");
        Some(resolution)
    }
}

impl Default for ThunkTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiThunks for ThunkTable {
    fn install(&self) {
        let mut entries = self.entries.write();
        if entries.is_some() {
            return;
        }

        let mut map = ThunkMap::with_capacity_and_hasher(ThunkId::ALL.len(), RandomState::new());
        map.extend(ThunkId::ALL.iter().map(|id| (*id, None)));
        *entries = Some(map);
        debug!(entries = ThunkId::ALL.len(), "API thunks installed");
    }

    fn uninstall(&self, terminating: bool) {
        if self.entries.write().take().is_none() {
            return;
        }

        if terminating {
            debug!(
                held = self.held_module_refs(),
                "API thunks uninstalled, module references left to process exit"
            );
        } else {
            let released = self.module_refs.swap(0, Ordering::AcqRel);
            debug!(released, "API thunks uninstalled");
        }
    }
}

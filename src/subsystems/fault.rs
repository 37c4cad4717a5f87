/*!
 * Pure Call Trap
 *
 * Handler slot invoked when a call reaches an unimplemented abstract method.
 * Installing the trap resets the slot to the default action: report and
 * abort. If a custom handler returns, the process still aborts.
 */

use super::traits::FaultTrap;
use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

/// Custom pure call handler
pub struct PureCallHandler(Box<dyn Fn() + Send + Sync>);

impl PureCallHandler {
    pub fn new(handler: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Box::new(handler))
    }
}

/// Default fault trap
#[derive(Default)]
pub struct PureCallTrap {
    handler: ArcSwapOption<PureCallHandler>,
    installed: AtomicBool,
}

impl PureCallTrap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::Acquire)
    }

    pub fn has_custom_handler(&self) -> bool {
        self.handler.load().is_some()
    }

    /// Replace the handler, returning whether a custom one was set before
    pub fn set_handler(&self, handler: PureCallHandler) -> bool {
        self.handler.swap(Some(Arc::new(handler))).is_some()
    }

    /// Trap a pure virtual call
    pub fn raise_pure_call(&self) -> ! {
        if let Some(handler) = self.handler.load_full() {
            (handler.0)();
        }

        error!("Pure virtual function call, aborting");
        std::process::abort()
    }
}

impl FaultTrap for PureCallTrap {
    fn install(&self) {
        self.handler.store(None);
        self.installed.store(true, Ordering::Release);
        debug!("Pure call trap installed");
    }
}

/*!
 * Capability Dispatch
 *
 * Probes one platform capability at process init and binds the bulk copy
 * slots (forward and reverse) to the matching implementation family.
 */

mod binding;
mod operations;
mod platform;

pub use binding::{CapabilityDispatcher, CopyBinding, CopyFamily};
pub use operations::{forward_integer, forward_vector, reverse_integer, reverse_vector, CopyFn};
pub use platform::{
    detect_isa_features, init_isa_table, isa_table, CapabilityProbe, FeatureId, HostProbe,
    IsaFeatures,
};

#[cfg(test)]
pub use platform::MockCapabilityProbe;

use crate::core::errors::DispatchResult;
use std::sync::{Arc, OnceLock};

/// Process-wide dispatcher
static COPY_DISPATCH: OnceLock<Arc<CapabilityDispatcher>> = OnceLock::new();

/// Get the process-wide dispatcher
pub fn dispatcher() -> &'static Arc<CapabilityDispatcher> {
    COPY_DISPATCH.get_or_init(|| Arc::new(CapabilityDispatcher::new()))
}

/// Move bytes inside `buf` through the process-wide binding
pub fn bulk_copy(buf: &mut [u8], src: usize, dst: usize, len: usize) -> DispatchResult<usize> {
    dispatcher().bulk_copy(buf, src, dst, len)
}

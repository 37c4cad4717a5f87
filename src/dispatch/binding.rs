/*!
 * Copy Family Binding
 *
 * The forward/reverse copy slots are bound once per dispatcher. Before a
 * selection is made readers see the vector family; after it the binding never
 * changes, whatever a later probe would report.
 */

use super::operations::{forward_integer, forward_vector, reverse_integer, reverse_vector, CopyFn};
use super::platform::{CapabilityProbe, FeatureId};
use crate::core::errors::{DispatchError, DispatchResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Implementation family behind the copy slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyFamily {
    /// Default: cache-line blocks
    Vector,
    /// Selected when an external cache is present: register-width blocks
    Integer,
}

impl CopyFamily {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            CopyFamily::Vector => "vector",
            CopyFamily::Integer => "integer",
        }
    }
}

impl fmt::Display for CopyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bound pair of copy slots
#[derive(Debug, Clone, Copy)]
pub struct CopyBinding {
    family: CopyFamily,
    forward: CopyFn,
    reverse: CopyFn,
}

impl CopyBinding {
    pub const VECTOR: CopyBinding = CopyBinding {
        family: CopyFamily::Vector,
        forward: forward_vector,
        reverse: reverse_vector,
    };

    pub const INTEGER: CopyBinding = CopyBinding {
        family: CopyFamily::Integer,
        forward: forward_integer,
        reverse: reverse_integer,
    };

    #[inline]
    pub fn family(&self) -> CopyFamily {
        self.family
    }

    #[inline]
    pub fn forward(&self) -> CopyFn {
        self.forward
    }

    #[inline]
    pub fn reverse(&self) -> CopyFn {
        self.reverse
    }
}

static DEFAULT_BINDING: CopyBinding = CopyBinding::VECTOR;

/// Holds the one-shot copy family selection
#[derive(Debug, Default)]
pub struct CapabilityDispatcher {
    binding: OnceLock<CopyBinding>,
}

impl CapabilityDispatcher {
    pub const fn new() -> Self {
        Self {
            binding: OnceLock::new(),
        }
    }

    /// Probe for an external cache and bind the matching family
    ///
    /// Only the first call consults the probe. Later calls return the
    /// existing binding untouched.
    pub fn select_fast_path(&self, probe: &dyn CapabilityProbe) -> &CopyBinding {
        let mut selected_now = false;
        let binding = self.binding.get_or_init(|| {
            selected_now = true;
            if probe.present(FeatureId::ExternalCache) {
                CopyBinding::INTEGER
            } else {
                CopyBinding::VECTOR
            }
        });

        if selected_now {
            info!(family = %binding.family(), "Bulk copy family bound");
        } else {
            debug!(family = %binding.family(), "Bulk copy family already bound, probe skipped");
        }
        binding
    }

    #[inline]
    pub fn is_selected(&self) -> bool {
        self.binding.get().is_some()
    }

    /// Current binding, the vector family until a selection is made
    #[inline]
    pub fn binding(&self) -> &CopyBinding {
        self.binding.get().unwrap_or(&DEFAULT_BINDING)
    }

    /// Move `len` bytes inside `buf` from `src` to `dst`, overlap allowed
    ///
    /// Returns the number of bytes moved.
    pub fn bulk_copy(&self, buf: &mut [u8], src: usize, dst: usize, len: usize) -> DispatchResult<usize> {
        let in_bounds = |start: usize| start.checked_add(len).is_some_and(|end| end <= buf.len());
        if !in_bounds(src) || !in_bounds(dst) {
            return Err(DispatchError::OutOfBounds {
                src,
                dst,
                len,
                buffer_len: buf.len(),
            });
        }

        if len == 0 || src == dst {
            return Ok(len);
        }

        let binding = self.binding();
        if dst < src {
            (binding.forward())(buf, src, dst, len);
        } else {
            (binding.reverse())(buf, src, dst, len);
        }
        Ok(len)
    }
}

/*!
 * Runtime Limits and Constants
 *
 * Centralized location for lifecycle-wide limits, thresholds, and magic numbers.
 *
 * - Performance-critical constants are marked with [PERF]
 * - Platform-specific values are marked with [PLATFORM]
 */

// =============================================================================
// BULK COPY
// =============================================================================

/// Vector family block width (64 bytes)
/// [PERF] One cache line, matching the widest vector register on AVX-512 hosts
pub const VECTOR_BLOCK: usize = 64;

/// Integer family block width (one machine word)
/// [PERF] General-purpose register width, avoids vector unit warm-up on hosts
/// whose external cache makes wide stores a loss
pub const INTEGER_WORD: usize = std::mem::size_of::<usize>();

// =============================================================================
// CAPABILITY PROBE
// =============================================================================

/// Minimum cache level treated as an external cache
/// [PLATFORM] L1/L2 are core-local on ARM; L3 and beyond sit outside the core
pub const EXTERNAL_CACHE_MIN_LEVEL: u8 = 3;

/// sysfs directory listing cache levels of the first CPU
/// [PLATFORM] Linux only
pub const SYSFS_CPU_CACHE_DIR: &str = "/sys/devices/system/cpu/cpu0/cache";

// =============================================================================
// PER-THREAD DATA
// =============================================================================

/// Maximum number of live per-thread contexts (4096)
/// Bounds the context table so a thread storm fails attach instead of
/// growing without limit
pub const DEFAULT_MAX_THREAD_CONTEXTS: usize = 4096;

/// First handle value issued to a per-thread context
/// Zero stays unused so a zeroed handle never aliases a live context
pub const FIRST_CONTEXT_HANDLE: u64 = 1;

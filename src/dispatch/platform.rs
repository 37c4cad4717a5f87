/*!
 * Platform Feature Detection
 * Detects instruction set levels and answers capability probes
 */

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Capabilities a probe can be asked about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureId {
    Sse2,
    Avx2,
    Avx512,
    Neon,
    /// A cache outside the core is attached (ARM)
    ExternalCache,
}

/// One-shot hardware capability query
#[cfg_attr(test, mockall::automock)]
pub trait CapabilityProbe: Send + Sync {
    fn present(&self, feature: FeatureId) -> bool;
}

/// Instruction set levels available on the platform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsaFeatures {
    /// SSE2 support (x86_64)
    pub sse2: bool,
    /// SSE4.2 support (x86_64)
    pub sse4_2: bool,
    /// AVX support (x86_64)
    pub avx: bool,
    /// AVX2 support (x86_64)
    pub avx2: bool,
    /// AVX-512 foundation support (x86_64)
    pub avx512f: bool,
    /// NEON support (aarch64)
    pub neon: bool,
}

impl IsaFeatures {
    /// Widest vector register in bytes, 8 when no vector unit was found
    pub fn max_vector_bytes(&self) -> usize {
        if self.avx512f {
            64
        } else if self.avx2 || self.avx {
            32
        } else if self.sse2 || self.neon {
            16
        } else {
            8
        }
    }
}

/// Detect available instruction sets
pub fn detect_isa_features() -> IsaFeatures {
    #[cfg(target_arch = "x86_64")]
    {
        IsaFeatures {
            sse2: is_x86_feature_detected!("sse2"),
            sse4_2: is_x86_feature_detected!("sse4.2"),
            avx: is_x86_feature_detected!("avx"),
            avx2: is_x86_feature_detected!("avx2"),
            avx512f: is_x86_feature_detected!("avx512f"),
            neon: false,
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        IsaFeatures {
            neon: std::arch::is_aarch64_feature_detected!("neon"),
            ..IsaFeatures::default()
        }
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        IsaFeatures::default()
    }
}

static ISA_TABLE: OnceLock<IsaFeatures> = OnceLock::new();

/// Fill the process-wide feature table
pub fn init_isa_table() -> &'static IsaFeatures {
    ISA_TABLE.get_or_init(|| {
        let isa = detect_isa_features();
        tracing::info!(
            sse2 = isa.sse2,
            sse4_2 = isa.sse4_2,
            avx = isa.avx,
            avx2 = isa.avx2,
            avx512f = isa.avx512f,
            neon = isa.neon,
            max_vector_bytes = isa.max_vector_bytes(),
            "Platform feature table initialized"
        );
        isa
    })
}

/// Feature table, if it has been filled
pub fn isa_table() -> Option<&'static IsaFeatures> {
    ISA_TABLE.get()
}

/// Probe backed by the running host
#[derive(Debug, Clone, Copy, Default)]
pub struct HostProbe;

impl CapabilityProbe for HostProbe {
    fn present(&self, feature: FeatureId) -> bool {
        let isa = isa_table().copied().unwrap_or_else(detect_isa_features);
        match feature {
            FeatureId::Sse2 => isa.sse2,
            FeatureId::Avx2 => isa.avx2,
            FeatureId::Avx512 => isa.avx512f,
            FeatureId::Neon => isa.neon,
            FeatureId::ExternalCache => external_cache_available(),
        }
    }
}

#[cfg(all(target_os = "linux", any(target_arch = "arm", target_arch = "aarch64")))]
fn external_cache_available() -> bool {
    use crate::core::limits::{EXTERNAL_CACHE_MIN_LEVEL, SYSFS_CPU_CACHE_DIR};

    let Ok(entries) = std::fs::read_dir(SYSFS_CPU_CACHE_DIR) else {
        return false;
    };

    entries
        .filter_map(Result::ok)
        .filter_map(|entry| std::fs::read_to_string(entry.path().join("level")).ok())
        .filter_map(|level| level.trim().parse::<u8>().ok())
        .any(|level| level >= EXTERNAL_CACHE_MIN_LEVEL)
}

/// No external cache concept off ARM: the default family stays bound
#[cfg(not(all(target_os = "linux", any(target_arch = "arm", target_arch = "aarch64"))))]
fn external_cache_available() -> bool {
    false
}

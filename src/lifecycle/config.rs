/*!
 * Lifecycle Configuration
 * Build-mode and capacity inputs to the orchestrator
 */

use crate::core::limits::DEFAULT_MAX_THREAD_CONTEXTS;
use serde::{Deserialize, Serialize};

pub const STRICT_CLEANUP_ENV: &str = "RUNTIME_STRICT_CLEANUP";
pub const LOADABLE_MODULE_ENV: &str = "RUNTIME_LOADABLE_MODULE";
pub const MAX_THREAD_CONTEXTS_ENV: &str = "RUNTIME_MAX_THREAD_CONTEXTS";

/// Configuration for process lifecycle orchestration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Tear everything down even when the process is terminating.
    /// Debug builds default to on so leaks and outstanding locks surface.
    pub strict_cleanup: bool,
    /// Fill the platform feature table during init
    pub loadable_module: bool,
    /// Capacity of the per-thread context table
    pub max_thread_contexts: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            strict_cleanup: cfg!(debug_assertions),
            loadable_module: true,
            max_thread_contexts: DEFAULT_MAX_THREAD_CONTEXTS,
        }
    }
}

impl LifecycleConfig {
    /// Release-build behavior: skip teardown on termination
    #[inline]
    #[must_use]
    pub fn release() -> Self {
        Self {
            strict_cleanup: false,
            ..Self::default()
        }
    }

    /// Debug-build behavior: always tear down
    #[inline]
    #[must_use]
    pub fn debug() -> Self {
        Self {
            strict_cleanup: true,
            ..Self::default()
        }
    }

    /// Defaults overridden by `RUNTIME_*` environment variables
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(strict) = env_flag(STRICT_CLEANUP_ENV) {
            config.strict_cleanup = strict;
        }
        if let Some(loadable) = env_flag(LOADABLE_MODULE_ENV) {
            config.loadable_module = loadable;
        }
        if let Some(max) = env_usize(MAX_THREAD_CONTEXTS_ENV) {
            config.max_thread_contexts = max;
        }
        config
    }

    #[inline]
    #[must_use]
    pub fn with_strict_cleanup(mut self, strict: bool) -> Self {
        self.strict_cleanup = strict;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_loadable_module(mut self, loadable: bool) -> Self {
        self.loadable_module = loadable;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_max_thread_contexts(mut self, max: usize) -> Self {
        self.max_thread_contexts = max;
        self
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let raw = std::env::var(name).ok()?;
    parse_flag(&raw).or_else(|| {
        tracing::warn!(variable = name, value = %raw, "Ignoring unparseable flag");
        None
    })
}

fn env_usize(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(variable = name, value = %raw, error = %e, "Ignoring unparseable count");
            None
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

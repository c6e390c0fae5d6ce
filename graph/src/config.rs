//! Compiler configuration.

/// What layout inference does with a primitive port that has no primitive
/// edges although its logical port is connected.
///
/// This happens when two connected composite ports share the same number of
/// sub-resources under different names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrphanPolicy {
    /// Fail with `ORPHANED_PRIMITIVE_PORT`.
    #[default]
    Error,
    /// Treat the port as a root whose contents start out undefined.
    Undefined,
}

/// Options for a single compilation.
///
/// ```
/// use framegraph::{CompilerConfig, OrphanPolicy};
///
/// let config = CompilerConfig::default()
///     .with_orphan_policy(OrphanPolicy::Undefined)
///     .with_warn_undefined_reads(false);
/// assert_eq!(config.orphan_policy, OrphanPolicy::Undefined);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompilerConfig {
    pub orphan_policy: OrphanPolicy,
    /// Emit a warning when a consuming image port reads contents that were
    /// never written inside the graph.
    pub warn_undefined_reads: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            orphan_policy: OrphanPolicy::Error,
            warn_undefined_reads: true,
        }
    }
}

impl CompilerConfig {
    pub fn with_orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.orphan_policy = policy;
        self
    }

    pub fn with_warn_undefined_reads(mut self, warn: bool) -> Self {
        self.warn_undefined_reads = warn;
        self
    }
}

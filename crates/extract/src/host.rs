//! The narrow host-bundler contract the transform consumes, and the data
//! types exchanged through the plugin hooks.

use client_extract_core::error::Result;
use std::path::Path;

/// A host-issued placeholder substituted with the final asset URL at bundle
/// time. The transform splices it verbatim into `import.meta.<token>`.
pub type RefToken = String;

/// A chunk emission request: a new bundle entry whose source the host will
/// fetch back through the plugin's load hook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmittedChunk {
    /// The inline module id the load hook recognizes.
    pub id: String,
    /// Proposed output file name, under `assets/`.
    pub file_name: String,
    /// Always `false`: the synthesized module is pure.
    pub module_side_effects: bool,
}

/// A resolution produced by the host (or the plugin's own fallback).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedId {
    pub id: String,
    pub external: bool,
}

impl ResolvedId {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), external: false }
    }
}

/// What the host must supply. One implementation per bundler integration;
/// tests drive the pipeline through a mock.
pub trait Host {
    /// Registers a new bundle entry and returns the reference token that
    /// will expand to the emitted asset's URL.
    fn emit_chunk(&self, chunk: EmittedChunk) -> Result<RefToken>;

    /// Registers a file dependency so edits retrigger the transform.
    fn add_watch_file(&self, path: &Path);

    /// Resolves `id` relative to `importer` through the host's resolver,
    /// skipping this plugin when `skip_self` is set.
    fn resolve_external(
        &self,
        id: &str,
        importer: Option<&str>,
        skip_self: bool,
    ) -> Option<ResolvedId>;

    /// Diagnostic channel for non-fatal findings.
    fn warn(&self, message: &str);

    /// Diagnostic channel for fatal findings. The transform also returns the
    /// error, so a throwing implementation is fine.
    fn error(&self, message: &str);
}

/// One chunk emitted during a transform call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkRef {
    /// Inline module id stored in the registry.
    pub id: String,
    /// Proposed output file name.
    pub file_name: String,
    /// Host-issued reference token spliced into the rewritten source.
    pub token: RefToken,
}

/// Result of a transform call that found handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformOutput {
    /// The rewritten server module.
    pub code: String,
    /// Always `None`; source maps for the rewritten module are out of scope.
    pub map: Option<String>,
    /// Chunks emitted for this module, in handler source order.
    pub chunks: Vec<ChunkRef>,
}

/// Result of a load-hook call for an inline module id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadOutput {
    /// The synthesized client module.
    pub code: String,
    /// Always `None`.
    pub map: Option<String>,
    /// Module type hint for the host; synthesized modules are TSX.
    pub module_type: &'static str,
}

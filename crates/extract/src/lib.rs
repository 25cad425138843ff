#![doc = include_str!("../README.md")]
#![warn(rustdoc::all)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod chunk;
mod config;
mod globals;
mod host;
mod index;
mod locate;
mod parse;
mod rewrite;
mod safety;
mod scope;
mod span;
mod synth;
mod transform;

pub use chunk::{is_inline_id, parse_inline_id, ChunkRegistry, CLIENT_EXT, INLINE_PREFIX};
pub use client_extract_core::{
    error::{CallableUse, ExtractError, Result},
    utils,
};
pub use config::{DebugSink, FilterConfig, PluginOptions, UnresolvedPolicy};
pub use host::{ChunkRef, EmittedChunk, Host, LoadOutput, RefToken, ResolvedId, TransformOutput};

use config::CompiledFilter;
use std::path::Path;

/// The directive-driven client-code extraction plugin.
///
/// One value per bundler configuration. The inline-module registry inside is
/// instance state: two plugin instances never observe each other's chunks.
#[derive(Debug)]
pub struct ClientExtractPlugin {
    opts: PluginOptions,
    filter: CompiledFilter,
    registry: ChunkRegistry,
}

impl ClientExtractPlugin {
    pub fn new(opts: PluginOptions) -> Result<Self> {
        let filter = CompiledFilter::new(&opts.filter)?;
        Ok(Self { opts, filter, registry: ChunkRegistry::default() })
    }

    pub fn options(&self) -> &PluginOptions {
        &self.opts
    }

    /// The per-instance registry of synthesized client modules.
    pub fn registry(&self) -> &ChunkRegistry {
        &self.registry
    }

    /// Build-start hook: drops the chunks of the previous build.
    pub fn build_start(&self) {
        trace!("clearing inline module registry");
        self.registry.clear();
    }

    /// Transform hook. Returns `Ok(None)` when the module is filtered out,
    /// fails to parse in non-strict mode, or contains no handlers; the host
    /// keeps the module unchanged in that case.
    pub fn transform<H: Host>(
        &self,
        host: &H,
        code: &str,
        id: &Path,
    ) -> Result<Option<TransformOutput>> {
        if !self.filter.is_match(&id.to_string_lossy()) {
            return Ok(None);
        }
        transform::transform_module(&self.opts, &self.registry, host, code, id)
    }

    /// Resolve hook. Inline ids resolve to themselves; imports originating
    /// from an inline module are delegated to the host's resolver rooted at
    /// the synthesized path, falling back to plain absolute/relative
    /// handling.
    pub fn resolve_id<H: Host>(
        &self,
        host: &H,
        id: &str,
        importer: Option<&str>,
    ) -> Option<ResolvedId> {
        if is_inline_id(id) {
            return Some(ResolvedId::new(id));
        }
        let importer_path = importer.and_then(parse_inline_id)?;
        if let Some(resolved) = host.resolve_external(id, Some(importer_path), true) {
            return Some(resolved);
        }
        if id.starts_with('/') {
            return Some(ResolvedId::new(id));
        }
        if id.starts_with("./") || id.starts_with("../") {
            let base = Path::new(importer_path).parent().unwrap_or(Path::new("/"));
            return Some(ResolvedId::new(join_normalized(base, id)));
        }
        None
    }

    /// Load hook: serves synthesized modules out of this instance's
    /// registry, declining everything else.
    pub fn load(&self, id: &str) -> Option<LoadOutput> {
        if !is_inline_id(id) {
            return None;
        }
        let code = self.registry.get(id)?;
        Some(LoadOutput { code, map: None, module_type: CLIENT_EXT })
    }
}

/// Lexical join of a relative specifier onto an absolute base directory.
fn join_normalized(base: &Path, rel: &str) -> String {
    let base = utils::slash_path(base);
    let mut stack: Vec<&str> =
        base.split('/').filter(|part| !part.is_empty() && *part != ".").collect();
    for part in rel.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            part => stack.push(part),
        }
    }
    format!("/{}", stack.join("/"))
}

//! The transform pipeline: parse, locate, validate, synthesize, emit,
//! rewrite.

use crate::{
    chunk::{self, ChunkRegistry},
    config::{PluginOptions, UnresolvedPolicy},
    host::{ChunkRef, EmittedChunk, Host, TransformOutput},
    index::{DeclIndex, ImportIndex},
    locate::{self, HandlerForm},
    parse,
    rewrite::{self, Replacement},
    safety, span, synth,
};
use client_extract_core::{
    error::{ExtractError, Result},
    utils,
};
use std::path::Path;

pub(crate) fn transform_module<H: Host>(
    opts: &PluginOptions,
    registry: &ChunkRegistry,
    host: &H,
    code: &str,
    id: &Path,
) -> Result<Option<TransformOutput>> {
    // Fast path: nothing that could be a directive.
    if !code.contains("use client") {
        return Ok(None);
    }
    // Work over BOM-less text so parser offsets and splice offsets agree.
    let code = code.strip_prefix('\u{feff}').unwrap_or(code);

    let parsed = match parse::parse_module(code, id) {
        Ok(parsed) => parsed,
        Err(err) => {
            let message = err.to_string();
            if opts.strict {
                host.error(&message);
                return Err(err);
            }
            warn!("{message}");
            host.warn(&message);
            return Ok(None);
        }
    };

    let handlers = locate::locate_handlers(&parsed.module);
    if handlers.is_empty() {
        trace!(id = %id.display(), "no client handlers");
        return Ok(None);
    }
    debug!(id = %id.display(), count = handlers.len(), "extracting client handlers");

    if let Err(err) = safety::check_side_effect_imports(&parsed.module, &parsed.span_map, code, id)
    {
        host.error(&err.to_string());
        return Err(err);
    }
    if let Err(err) = safety::check_callable_uses(&parsed.module, &handlers, id) {
        host.error(&err.to_string());
        return Err(err);
    }

    let imports = ImportIndex::build(&parsed.module, &parsed.span_map, code);
    let decls = DeclIndex::build(&parsed.module, &parsed.span_map, code);
    let canonical = utils::slash_path(&utils::canonicalized(id));

    let mut replacements = Vec::with_capacity(handlers.len());
    let mut chunks = Vec::with_capacity(handlers.len());

    for handler in &handlers {
        let Some(range) = parsed.span_map.range(handler.span) else {
            opts.debug
                .log(|| format!("skipping handler with unusable span in {}", id.display()));
            continue;
        };
        let start = span::widen_leading_paren(code, range.start);
        let end = match handler.form {
            HandlerForm::Expr => range.end,
            _ => span::extend_past_semicolon(code, range.end),
        };
        if start >= end || end > code.len() {
            opts.debug.log(|| format!("skipping handler with empty range in {}", id.display()));
            continue;
        }

        let synthesized =
            synth::synthesize_handler(handler, &imports, &decls, &opts.extra_globals, &parsed.cm)?;
        if !synthesized.unresolved.is_empty() {
            let err = ExtractError::UnresolvedReferences {
                id: id.to_path_buf(),
                handler: handler.name_str().map(str::to_string),
                names: synthesized.unresolved.clone(),
            };
            match opts.unresolved_policy() {
                UnresolvedPolicy::Error => {
                    host.error(&err.to_string());
                    return Err(err);
                }
                UnresolvedPolicy::Warn => host.warn(&err.to_string()),
                UnresolvedPolicy::Ignore => {}
            }
        }

        let chunk_name = chunk::chunk_name(code, start, &canonical);
        let inline_id = chunk::inline_module_id(id, &chunk_name);
        registry.insert(inline_id.clone(), synthesized.code);

        let file_name = chunk::asset_file_name(&chunk_name);
        let token = host.emit_chunk(EmittedChunk {
            id: inline_id.clone(),
            file_name: file_name.clone(),
            module_side_effects: false,
        })?;
        let url = format!("new URL(import.meta.{token}).pathname");
        replacements.push(Replacement {
            start,
            end,
            text: rewrite::replacement_text(handler.form, handler.name_str(), &url),
        });
        chunks.push(ChunkRef { id: inline_id, file_name, token });
    }

    if replacements.is_empty() {
        return Ok(None);
    }
    host.add_watch_file(id);

    let rewritten = rewrite::apply_replacements(code, replacements);
    Ok(Some(TransformOutput { code: rewritten, map: None, chunks }))
}

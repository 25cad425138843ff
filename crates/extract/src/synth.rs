//! Synthesis of one standalone client module per handler.
//!
//! The handler is printed as the default export of a fresh module; every
//! import and top-level declaration it transitively names is carried over
//! verbatim, in original source order.

use crate::{
    globals,
    index::{DeclIndex, ImportIndex},
    locate::{block_has_directive, Handler, HandlerFunc},
    scope::handler_free_idents,
};
use client_extract_core::error::{ExtractError, Result};
use itertools::Itertools;
use rustc_hash::FxHashSet;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use swc_core::{
    common::{sync::Lrc, SourceMap, DUMMY_SP},
    ecma::{
        ast::{
            BlockStmt, BlockStmtOrExpr, Expr, ExportDefaultExpr, FnExpr, ModuleDecl, ModuleItem,
        },
        codegen::{self, text_writer::JsWriter, Emitter, Node},
    },
};

/// The assembled client module, plus any names the closure failed to
/// resolve. Policy for the latter is the caller's call.
pub(crate) struct Synthesized {
    pub(crate) code: String,
    pub(crate) unresolved: Vec<String>,
}

pub(crate) fn synthesize_handler(
    handler: &Handler,
    imports: &ImportIndex,
    decls: &DeclIndex,
    extra_globals: &[String],
    cm: &Lrc<SourceMap>,
) -> Result<Synthesized> {
    let printed = print_default_export(handler, cm)?;
    let free = handler_free_idents(&handler.func);

    let mut seen = FxHashSet::default();
    let mut queue = VecDeque::new();
    for name in free.iter().sorted_by(|a, b| a.as_ref().cmp(b.as_ref())) {
        if globals::is_global(name.as_ref(), extra_globals) {
            continue;
        }
        if seen.insert(name.clone()) {
            queue.push_back(name.clone());
        }
    }

    // Worklist closure over the two tables. Imports are terminal: the
    // statement is carried as-is and never descended into.
    let mut required_imports: BTreeMap<usize, String> = BTreeMap::new();
    let mut required_decls: BTreeMap<usize, String> = BTreeMap::new();
    let mut required_indices = FxHashSet::default();
    let mut unresolved = BTreeSet::new();

    while let Some(name) = queue.pop_front() {
        if let Some(entry) = imports.get(&name) {
            required_imports.entry(entry.start).or_insert_with(|| entry.text.clone());
        } else if let Some((idx, entry)) = decls.get(&name) {
            if required_indices.insert(idx) {
                required_decls.insert(entry.start, entry.text.clone());
                for dep in entry.deps.iter().sorted_by(|a, b| a.as_ref().cmp(b.as_ref())) {
                    if globals::is_global(dep.as_ref(), extra_globals) {
                        continue;
                    }
                    if seen.insert(dep.clone()) {
                        queue.push_back(dep.clone());
                    }
                }
            }
        } else {
            unresolved.insert(name.to_string());
        }
    }

    let mut code = String::from("\"use client\";\n\n");
    for text in required_imports.values() {
        code.push_str(text);
        code.push('\n');
    }
    if !required_imports.is_empty() {
        code.push('\n');
    }
    for text in required_decls.values() {
        code.push_str(text);
        code.push_str("\n\n");
    }
    code.push_str(printed.trim_end());
    code.push('\n');

    Ok(Synthesized { code, unresolved: unresolved.into_iter().collect() })
}

/// Prints the handler as `export default <function>;`, with the directive
/// removed from the body and declaration forms reshaped into (named)
/// function expressions. The printer preserves TS annotations and JSX.
fn print_default_export(handler: &Handler, cm: &Lrc<SourceMap>) -> Result<String> {
    let expr = match &handler.func {
        HandlerFunc::Arrow(arrow) => {
            let mut arrow = arrow.clone();
            if let BlockStmtOrExpr::BlockStmt(block) = &mut *arrow.body {
                strip_directive(block);
            }
            Expr::Arrow(arrow)
        }
        HandlerFunc::Func { ident, function } => {
            let mut function = function.clone();
            if let Some(body) = &mut function.body {
                strip_directive(body);
            }
            Expr::Fn(FnExpr { ident: ident.clone(), function: Box::new(function) })
        }
    };
    let item = ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(ExportDefaultExpr {
        span: DUMMY_SP,
        expr: Box::new(expr),
    }));

    let mut buf = Vec::new();
    {
        let wr = JsWriter::new(cm.clone(), "\n", &mut buf, None);
        let mut emitter =
            Emitter { cfg: codegen::Config::default(), cm: cm.clone(), comments: None, wr };
        item.emit_with(&mut emitter)
            .map_err(|err| ExtractError::msg(format!("failed to print client handler: {err}")))?;
    }
    String::from_utf8(buf)
        .map_err(|_| ExtractError::msg("printed client handler is not valid UTF-8"))
}

fn strip_directive(block: &mut BlockStmt) {
    if block_has_directive(block) {
        block.stmts.remove(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{locate::locate_handlers, parse::parse_module};
    use std::path::Path;

    fn synthesize(code: &str) -> Synthesized {
        let parsed = parse_module(code, Path::new("/t/mod.tsx")).unwrap();
        let handlers = locate_handlers(&parsed.module);
        assert_eq!(handlers.len(), 1, "fixture must contain exactly one handler");
        let imports = ImportIndex::build(&parsed.module, &parsed.span_map, code);
        let decls = DeclIndex::build(&parsed.module, &parsed.span_map, code);
        synthesize_handler(&handlers[0], &imports, &decls, &[], &parsed.cm).unwrap()
    }

    #[test]
    fn emits_directive_then_default_export() {
        let out = synthesize(r#"export const h = () => { "use client"; return 1; };"#);
        assert!(out.code.starts_with("\"use client\";\n\n"));
        assert!(out.code.contains("export default"));
        assert!(out.code.contains("return 1"));
        // The directive appears exactly once: as the module prologue.
        assert_eq!(out.code.matches("use client").count(), 1);
        assert!(out.unresolved.is_empty());
    }

    #[test]
    fn closes_over_imports_and_declarations() {
        let code = r#"import { submit } from "./c.ts";
const label = "x";
export const h = () => { "use client"; submit(label); };
"#;
        let out = synthesize(code);
        assert!(out.code.contains(r#"import { submit } from "./c.ts";"#));
        assert!(out.code.contains(r#"const label = "x";"#));
        let import_pos = out.code.find("import").unwrap();
        let decl_pos = out.code.find("const label").unwrap();
        let export_pos = out.code.find("export default").unwrap();
        assert!(import_pos < decl_pos && decl_pos < export_pos);
        assert!(out.unresolved.is_empty());
    }

    #[test]
    fn closure_is_transitive_and_once_only() {
        let code = r#"const base = 1;
const derived = base + 1;
const twice = derived + derived;
export const h = () => { "use client"; return twice + derived; };
"#;
        let out = synthesize(code);
        assert_eq!(out.code.matches("const base = 1;").count(), 1);
        assert_eq!(out.code.matches("const derived = base + 1;").count(), 1);
        assert_eq!(out.code.matches("const twice = derived + derived;").count(), 1);
        assert!(out.unresolved.is_empty());
    }

    #[test]
    fn globals_are_not_dependencies() {
        let out = synthesize(
            r#"export const h = () => { "use client"; console.log(Math.max(1, 2), fetch); };"#,
        );
        assert!(out.unresolved.is_empty());
        // No import or declaration was pulled in, only the handler itself.
        assert!(out.code.starts_with("\"use client\";\n\nexport default"));
    }

    #[test]
    fn unknown_names_are_reported_sorted() {
        let out = synthesize(r#"const h = () => { "use client"; zeta(alpha); };"#);
        assert_eq!(out.unresolved, ["alpha", "zeta"]);
    }

    #[test]
    fn named_declaration_handlers_keep_their_name() {
        let out = synthesize(r#"function top(n) { "use client"; return n > 0 ? top(n - 1) : 0; }"#);
        assert!(out.code.contains("export default function top"));
        assert!(out.unresolved.is_empty());
    }

    #[test]
    fn declaration_dependencies_use_the_unwrapped_form() {
        let code = r#"export const label = "x";
export const h = () => { "use client"; return label; };
"#;
        let out = synthesize(code);
        assert!(out.code.contains("\nconst label = \"x\";"));
        assert!(!out.code.contains("export const label"));
    }
}

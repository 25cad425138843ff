//! Per-module indexes of value-bringing imports and top-level value
//! declarations, the two sources the synthesizer closes over.

use crate::{
    scope::{free_idents, pat_idents},
    span::SpanMap,
};
use rustc_hash::{FxHashMap, FxHashSet};
use swc_core::{
    atoms::Atom,
    ecma::ast::{Decl, ImportSpecifier, Module, ModuleDecl, ModuleItem, Stmt},
};

/// How an import binds its local name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ImportKind {
    Default,
    Named,
    Namespace,
}

/// One value-producing local binding introduced by an import declaration.
///
/// The text is the verbatim slice of the *entire* statement: keeping the
/// original statement avoids rewriting imports and preserves any observable
/// side effects within it, even when only one of its bindings is used.
#[derive(Clone, Debug)]
pub(crate) struct ImportEntry {
    pub(crate) text: String,
    pub(crate) start: usize,
    #[allow(dead_code)]
    pub(crate) kind: ImportKind,
}

/// Value-bringing imports indexed by local name.
#[derive(Debug, Default)]
pub(crate) struct ImportIndex {
    entries: FxHashMap<Atom, ImportEntry>,
}

impl ImportIndex {
    pub(crate) fn build(module: &Module, spans: &SpanMap, source: &str) -> Self {
        let mut entries = FxHashMap::default();
        for item in &module.body {
            let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else { continue };
            if import.type_only || import.specifiers.is_empty() {
                continue;
            }
            let Some(range) = spans.range(import.span) else { continue };
            let start = range.start;
            let text = &source[range];
            for specifier in &import.specifiers {
                let (local, kind) = match specifier {
                    ImportSpecifier::Named(named) => {
                        if named.is_type_only {
                            continue;
                        }
                        (&named.local, ImportKind::Named)
                    }
                    ImportSpecifier::Default(default) => (&default.local, ImportKind::Default),
                    ImportSpecifier::Namespace(ns) => (&ns.local, ImportKind::Namespace),
                };
                entries.insert(
                    local.sym.clone(),
                    ImportEntry { text: text.to_string(), start, kind },
                );
            }
        }
        Self { entries }
    }

    pub(crate) fn get(&self, name: &Atom) -> Option<&ImportEntry> {
        self.entries.get(name)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// One top-level value declaration: its verbatim text, the names it
/// introduces, and the free names it depends on.
#[derive(Clone, Debug)]
pub(crate) struct DeclEntry {
    pub(crate) text: String,
    pub(crate) start: usize,
    /// Names introduced by this statement; disjoint from `deps` by
    /// construction.
    #[allow(dead_code)]
    pub(crate) declared: FxHashSet<Atom>,
    pub(crate) deps: FxHashSet<Atom>,
}

/// Top-level value declarations indexed by every name they introduce.
#[derive(Debug, Default)]
pub(crate) struct DeclIndex {
    entries: Vec<DeclEntry>,
    by_name: FxHashMap<Atom, usize>,
}

impl DeclIndex {
    pub(crate) fn build(module: &Module, spans: &SpanMap, source: &str) -> Self {
        let mut index = Self::default();
        for item in &module.body {
            // Unwrap a single `export` wrapper; the synthesized client module
            // uses the unwrapped form.
            let decl = match item {
                ModuleItem::Stmt(Stmt::Decl(decl)) => decl,
                ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => &export.decl,
                _ => continue,
            };
            let (declared, span) = match decl {
                Decl::Fn(func) => {
                    if func.declare || func.function.body.is_none() {
                        continue;
                    }
                    let mut declared = FxHashSet::default();
                    declared.insert(func.ident.sym.clone());
                    (declared, func.function.span)
                }
                Decl::Class(class) => {
                    if class.declare {
                        continue;
                    }
                    let mut declared = FxHashSet::default();
                    declared.insert(class.ident.sym.clone());
                    (declared, class.class.span)
                }
                Decl::Var(var) => {
                    if var.declare {
                        continue;
                    }
                    let mut names = Vec::new();
                    for declarator in &var.decls {
                        pat_idents(&declarator.name, &mut names);
                    }
                    (names.into_iter().collect(), var.span)
                }
                Decl::TsEnum(ts_enum) => {
                    if ts_enum.declare {
                        continue;
                    }
                    let mut declared = FxHashSet::default();
                    declared.insert(ts_enum.id.sym.clone());
                    (declared, ts_enum.span)
                }
                _ => continue,
            };
            let Some(range) = spans.range(span) else { continue };

            // Seeding the scope with the declared names keeps self and
            // intra-statement references out of `deps`.
            let mut deps = match decl {
                Decl::Fn(func) => free_idents(func, declared.clone()),
                Decl::Class(class) => free_idents(class, declared.clone()),
                Decl::Var(var) => free_idents(&**var, declared.clone()),
                Decl::TsEnum(ts_enum) => free_idents(&**ts_enum, declared.clone()),
                _ => continue,
            };
            for name in &declared {
                deps.remove(name);
            }

            let idx = index.entries.len();
            index.entries.push(DeclEntry {
                text: source[range.clone()].to_string(),
                start: range.start,
                declared: declared.clone(),
                deps,
            });
            for name in declared {
                index.by_name.entry(name).or_insert(idx);
            }
        }
        index
    }

    pub(crate) fn get(&self, name: &Atom) -> Option<(usize, &DeclEntry)> {
        let idx = *self.by_name.get(name)?;
        Some((idx, &self.entries[idx]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_module;
    use std::path::Path;

    fn indexes(code: &str) -> (ImportIndex, DeclIndex, String) {
        let parsed = parse_module(code, Path::new("/t/mod.tsx")).unwrap();
        let imports = ImportIndex::build(&parsed.module, &parsed.span_map, code);
        let decls = DeclIndex::build(&parsed.module, &parsed.span_map, code);
        (imports, decls, code.to_string())
    }

    #[test]
    fn indexes_value_imports_with_verbatim_statements() {
        let code = r#"import def, { named, other as alias } from "./a";
import * as ns from "./b";
"#;
        let (imports, _, _) = indexes(code);
        assert_eq!(imports.len(), 4);
        let entry = imports.get(&Atom::from("alias")).unwrap();
        assert_eq!(entry.text, r#"import def, { named, other as alias } from "./a";"#);
        assert_eq!(entry.kind, ImportKind::Named);
        assert_eq!(imports.get(&Atom::from("def")).unwrap().kind, ImportKind::Default);
        assert_eq!(imports.get(&Atom::from("ns")).unwrap().kind, ImportKind::Namespace);
        assert!(imports.get(&Atom::from("other")).is_none());
    }

    #[test]
    fn type_only_imports_are_excluded() {
        let code = r#"import type { T } from "./types";
import { type U, real } from "./mod";
"#;
        let (imports, _, _) = indexes(code);
        assert_eq!(imports.len(), 1);
        assert!(imports.get(&Atom::from("T")).is_none());
        assert!(imports.get(&Atom::from("U")).is_none());
        assert!(imports.get(&Atom::from("real")).is_some());
    }

    #[test]
    fn declarations_register_under_every_introduced_name() {
        let code = "const { a, b } = pair();\nexport function f() { return a; }\n";
        let (_, decls, _) = indexes(code);
        let (idx_a, entry_a) = decls.get(&Atom::from("a")).unwrap();
        let (idx_b, _) = decls.get(&Atom::from("b")).unwrap();
        assert_eq!(idx_a, idx_b);
        assert_eq!(entry_a.text, "const { a, b } = pair();");
        assert!(entry_a.deps.contains(&Atom::from("pair")));
        assert!(!entry_a.deps.contains(&Atom::from("a")));

        let (_, entry_f) = decls.get(&Atom::from("f")).unwrap();
        assert_eq!(entry_f.text, "function f() { return a; }");
        assert!(entry_f.deps.contains(&Atom::from("a")));
    }

    #[test]
    fn enums_are_value_declarations() {
        let code = "export const enum Mode { On, Off }\nconst current = Mode.On;\n";
        let (_, decls, _) = indexes(code);
        let (_, entry) = decls.get(&Atom::from("Mode")).unwrap();
        assert_eq!(entry.text, "const enum Mode { On, Off }");
        let (_, current) = decls.get(&Atom::from("current")).unwrap();
        assert!(current.deps.contains(&Atom::from("Mode")));
    }

    #[test]
    fn type_declarations_are_not_indexed() {
        let code = "type A = number;\ninterface B { x: number }\ndeclare const amb: number;\n";
        let (_, decls, _) = indexes(code);
        assert!(decls.get(&Atom::from("A")).is_none());
        assert!(decls.get(&Atom::from("B")).is_none());
        assert!(decls.get(&Atom::from("amb")).is_none());
    }
}

//! Preflight checks a module must pass before any handler is extracted.
//!
//! Both rejections are unconditional: neither a side-effect import nor a
//! callable use of a hoisted handler name has a safe interpretation after
//! extraction.

use crate::{
    locate::{Handler, HandlerForm},
    scope::{pat_idents, ScopeStack},
    span::SpanMap,
};
use client_extract_core::error::{CallableUse, ExtractError, Result};
use std::path::Path;
use swc_core::{
    atoms::Atom,
    common::Span,
    ecma::{
        ast::*,
        visit::{noop_visit_type, Visit, VisitWith},
    },
};

/// Rejects the module when it contains a bare `import "...";` that is not
/// type-only.
pub(crate) fn check_side_effect_imports(
    module: &Module,
    spans: &SpanMap,
    source: &str,
    id: &Path,
) -> Result<()> {
    for item in &module.body {
        let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else { continue };
        if !import.type_only && import.specifiers.is_empty() {
            let statement = spans
                .range(import.span)
                .map(|range| source[range].to_string())
                .unwrap_or_else(|| format!("import \"{}\";", import.src.value.to_atom_lossy()));
            return Err(ExtractError::SideEffectImport { id: id.to_path_buf(), statement });
        }
    }
    Ok(())
}

/// Rejects the module when a handler that hoists a name is used as a call
/// target, constructor, or template tag anywhere outside the handler itself.
///
/// Shadowing is respected: uses inside a function or block that rebinds the
/// name are fine.
pub(crate) fn check_callable_uses(module: &Module, handlers: &[Handler], id: &Path) -> Result<()> {
    for handler in handlers {
        let hoists = matches!(handler.form, HandlerForm::Decl { .. } | HandlerForm::DefaultDecl);
        let Some(name) = handler.name.clone().filter(|_| hoists) else { continue };

        let mut scan = CallableScan {
            target: name.clone(),
            skip: handler.span,
            scope: ScopeStack::default(),
            found: None,
        };
        module.visit_with(&mut scan);
        if let Some(usage) = scan.found {
            return Err(ExtractError::UnsafeCallable {
                id: id.to_path_buf(),
                name: name.to_string(),
                usage,
            });
        }
    }
    Ok(())
}

/// Searches for callable uses of one name, tracking every scope that could
/// rebind it.
///
/// The scope stack starts empty, so module-level declarations (the handler
/// itself included) do not count as shadows.
struct CallableScan {
    target: Atom,
    skip: Span,
    scope: ScopeStack,
    found: Option<CallableUse>,
}

impl CallableScan {
    fn check(&mut self, callee: &Expr, use_span: Span, usage: CallableUse) {
        if self.found.is_some() {
            return;
        }
        let Expr::Ident(ident) = callee else { return };
        if ident.sym != self.target
            || self.scope.is_bound(&self.target)
            || contains(self.skip, use_span)
        {
            return;
        }
        self.found = Some(usage);
    }

    fn declare_pat(&mut self, pat: &Pat) {
        let mut names = Vec::new();
        pat_idents(pat, &mut names);
        for name in names {
            self.scope.declare(&name);
        }
    }
}

fn contains(outer: Span, inner: Span) -> bool {
    outer.lo <= inner.lo && inner.hi <= outer.hi
}

impl Visit for CallableScan {
    noop_visit_type!();

    fn visit_call_expr(&mut self, n: &CallExpr) {
        if let Callee::Expr(callee) = &n.callee {
            self.check(callee, n.span, CallableUse::Call);
        }
        n.visit_children_with(self);
    }

    fn visit_new_expr(&mut self, n: &NewExpr) {
        self.check(&n.callee, n.span, CallableUse::Construct);
        n.visit_children_with(self);
    }

    fn visit_tagged_tpl(&mut self, n: &TaggedTpl) {
        self.check(&n.tag, n.span, CallableUse::TemplateTag);
        n.visit_children_with(self);
    }

    fn visit_function(&mut self, n: &Function) {
        self.scope.push();
        for param in &n.params {
            self.declare_pat(&param.pat);
        }
        n.visit_children_with(self);
        self.scope.pop();
    }

    fn visit_arrow_expr(&mut self, n: &ArrowExpr) {
        self.scope.push();
        for pat in &n.params {
            self.declare_pat(pat);
        }
        n.visit_children_with(self);
        self.scope.pop();
    }

    fn visit_fn_decl(&mut self, n: &FnDecl) {
        self.scope.declare(&n.ident.sym);
        n.visit_children_with(self);
    }

    fn visit_fn_expr(&mut self, n: &FnExpr) {
        self.scope.push();
        if let Some(ident) = &n.ident {
            self.scope.declare(&ident.sym);
        }
        n.visit_children_with(self);
        self.scope.pop();
    }

    fn visit_class_decl(&mut self, n: &ClassDecl) {
        self.scope.declare(&n.ident.sym);
        n.visit_children_with(self);
    }

    fn visit_class_expr(&mut self, n: &ClassExpr) {
        self.scope.push();
        if let Some(ident) = &n.ident {
            self.scope.declare(&ident.sym);
        }
        n.visit_children_with(self);
        self.scope.pop();
    }

    fn visit_block_stmt(&mut self, n: &BlockStmt) {
        self.scope.push();
        for stmt in &n.stmts {
            if let Stmt::Decl(Decl::Fn(decl)) = stmt {
                self.scope.declare(&decl.ident.sym);
            }
        }
        n.visit_children_with(self);
        self.scope.pop();
    }

    fn visit_var_declarator(&mut self, n: &VarDeclarator) {
        self.declare_pat(&n.name);
        n.visit_children_with(self);
    }

    fn visit_catch_clause(&mut self, n: &CatchClause) {
        self.scope.push();
        if let Some(param) = &n.param {
            self.declare_pat(param);
        }
        n.visit_children_with(self);
        self.scope.pop();
    }

    fn visit_import_decl(&mut self, _: &ImportDecl) {}
}

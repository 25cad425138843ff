//! Locating `"use client"` handlers: every block-bodied arrow, function
//! expression, or function declaration whose first statement is the
//! directive.

use swc_core::{
    atoms::Atom,
    common::Span,
    ecma::{
        ast::*,
        visit::{noop_visit_type, Visit, VisitWith},
    },
};

/// The syntactic form of a handler, which decides the replacement text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HandlerForm {
    /// Arrow or function expression in any expression position.
    Expr,
    /// `function Name() {}`, optionally behind `export`.
    Decl { exported: bool },
    /// `export default function [Name]() {}`.
    DefaultDecl,
}

/// The function node of a handler, cloned out of the module AST so the
/// synthesizer can reshape it freely.
#[derive(Clone, Debug)]
pub(crate) enum HandlerFunc {
    Arrow(ArrowExpr),
    Func { ident: Option<Ident>, function: Function },
}

/// A located handler: its function, its form, the span the replacement must
/// cover, and its declared name (if any).
#[derive(Clone, Debug)]
pub(crate) struct Handler {
    pub(crate) func: HandlerFunc,
    pub(crate) form: HandlerForm,
    /// Replacement span in parser coordinates. Covers the whole statement
    /// for declaration forms, the bare expression otherwise.
    pub(crate) span: Span,
    pub(crate) name: Option<Atom>,
}

impl Handler {
    pub(crate) fn name_str(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Collects every handler in the module, in source order.
///
/// Statement-level forms are classified against their parent context here,
/// carried on the traversal rather than stored on nodes; everything else is
/// found by [`HandlerFinder`]. A matched handler's body is not searched
/// again, so handlers never nest and replacement ranges never overlap.
pub(crate) fn locate_handlers(module: &Module) -> Vec<Handler> {
    let mut finder = HandlerFinder { handlers: Vec::new() };
    for item in &module.body {
        match item {
            ModuleItem::Stmt(Stmt::Decl(Decl::Fn(decl))) if is_handler_fn(&decl.function) => {
                finder.push_fn_decl(decl, false);
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                match &export.decl {
                    Decl::Fn(decl) if is_handler_fn(&decl.function) => {
                        finder.handlers.push(Handler {
                            func: HandlerFunc::Func {
                                ident: Some(decl.ident.clone()),
                                function: (*decl.function).clone(),
                            },
                            form: HandlerForm::Decl { exported: true },
                            span: export.span,
                            name: Some(decl.ident.sym.clone()),
                        });
                    }
                    _ => item.visit_with(&mut finder),
                }
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => {
                match &export.decl {
                    DefaultDecl::Fn(expr) if is_handler_fn(&expr.function) => {
                        finder.handlers.push(Handler {
                            func: HandlerFunc::Func {
                                ident: expr.ident.clone(),
                                function: (*expr.function).clone(),
                            },
                            form: HandlerForm::DefaultDecl,
                            span: export.span,
                            name: expr.ident.as_ref().map(|i| i.sym.clone()),
                        });
                    }
                    _ => item.visit_with(&mut finder),
                }
            }
            _ => item.visit_with(&mut finder),
        }
    }
    finder.handlers.sort_by_key(|handler| handler.span.lo);
    finder.handlers
}

struct HandlerFinder {
    handlers: Vec<Handler>,
}

impl HandlerFinder {
    fn push_fn_decl(&mut self, decl: &FnDecl, exported: bool) {
        self.handlers.push(Handler {
            func: HandlerFunc::Func {
                ident: Some(decl.ident.clone()),
                function: (*decl.function).clone(),
            },
            form: HandlerForm::Decl { exported },
            span: decl.function.span,
            name: Some(decl.ident.sym.clone()),
        });
    }
}

impl Visit for HandlerFinder {
    noop_visit_type!();

    fn visit_arrow_expr(&mut self, n: &ArrowExpr) {
        if is_handler_arrow(n) {
            self.handlers.push(Handler {
                func: HandlerFunc::Arrow(n.clone()),
                form: HandlerForm::Expr,
                span: n.span,
                name: None,
            });
        } else {
            n.visit_children_with(self);
        }
    }

    fn visit_fn_expr(&mut self, n: &FnExpr) {
        if is_handler_fn(&n.function) {
            self.handlers.push(Handler {
                func: HandlerFunc::Func {
                    ident: n.ident.clone(),
                    function: (*n.function).clone(),
                },
                form: HandlerForm::Expr,
                span: n.function.span,
                name: None,
            });
        } else {
            n.visit_children_with(self);
        }
    }

    // Declarations nested inside other functions and blocks.
    fn visit_fn_decl(&mut self, n: &FnDecl) {
        if is_handler_fn(&n.function) {
            self.push_fn_decl(n, false);
        } else {
            n.visit_children_with(self);
        }
    }
}

/// Generators are rejected: a streaming handler has no meaningful rebinding
/// to an asset URL.
fn is_handler_fn(function: &Function) -> bool {
    !function.is_generator && function.body.as_ref().is_some_and(block_has_directive)
}

fn is_handler_arrow(arrow: &ArrowExpr) -> bool {
    match &*arrow.body {
        BlockStmtOrExpr::BlockStmt(block) => block_has_directive(block),
        BlockStmtOrExpr::Expr(_) => false,
    }
}

pub(crate) fn block_has_directive(block: &BlockStmt) -> bool {
    match block.stmts.first() {
        Some(Stmt::Expr(stmt)) => {
            matches!(&*stmt.expr, Expr::Lit(Lit::Str(lit)) if lit.value == "use client")
        }
        _ => false,
    }
}

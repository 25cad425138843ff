//! Scope-aware collection of free identifier references.
//!
//! [`free_idents`] walks any subtree with a stack of lexical scopes and
//! returns every identifier referenced as a value but not bound by an
//! enclosing scope. Type-only constructs contribute nothing; value-bearing
//! TS wrappers (`as`, `satisfies`, non-null, instantiation) contribute the
//! references of their inner expression.

use crate::locate::HandlerFunc;
use rustc_hash::FxHashSet;
use swc_core::{
    atoms::Atom,
    ecma::{
        ast::*,
        visit::{noop_visit_type, Visit, VisitWith},
    },
};

/// An ordered stack of lexical scopes, innermost last.
///
/// An empty stack swallows declarations, which is exactly what the
/// module-level scan in the safety checks wants: the handler's own top-level
/// binding must not shadow itself.
#[derive(Debug, Default)]
pub(crate) struct ScopeStack {
    scopes: Vec<FxHashSet<Atom>>,
}

impl ScopeStack {
    pub(crate) fn with_seed(seed: FxHashSet<Atom>) -> Self {
        Self { scopes: vec![seed] }
    }

    pub(crate) fn push(&mut self) {
        self.scopes.push(FxHashSet::default());
    }

    pub(crate) fn pop(&mut self) {
        self.scopes.pop();
    }

    pub(crate) fn declare(&mut self, sym: &Atom) {
        if let Some(top) = self.scopes.last_mut() {
            top.insert(sym.clone());
        }
    }

    pub(crate) fn is_bound(&self, sym: &Atom) -> bool {
        self.scopes.iter().any(|scope| scope.contains(sym))
    }
}

/// Collects the names bound by a pattern, without touching default-value
/// expressions or computed keys.
pub(crate) fn pat_idents(pat: &Pat, out: &mut Vec<Atom>) {
    match pat {
        Pat::Ident(binding) => out.push(binding.id.sym.clone()),
        Pat::Array(array) => {
            for elem in array.elems.iter().flatten() {
                pat_idents(elem, out);
            }
        }
        Pat::Rest(rest) => pat_idents(&rest.arg, out),
        Pat::Object(object) => {
            for prop in &object.props {
                match prop {
                    ObjectPatProp::KeyValue(kv) => pat_idents(&kv.value, out),
                    ObjectPatProp::Assign(assign) => out.push(assign.key.id.sym.clone()),
                    ObjectPatProp::Rest(rest) => pat_idents(&rest.arg, out),
                }
            }
        }
        Pat::Assign(assign) => pat_idents(&assign.left, out),
        Pat::Expr(_) | Pat::Invalid(_) => {}
    }
}

/// Returns the free identifier references of `node`, with `seed` as the
/// outermost scope.
pub(crate) fn free_idents<N>(node: &N, seed: FxHashSet<Atom>) -> FxHashSet<Atom>
where
    N: VisitWith<RefCollector>,
{
    let mut collector =
        RefCollector { scope: ScopeStack::with_seed(seed), out: FxHashSet::default() };
    node.visit_with(&mut collector);
    collector.out
}

/// Returns the free references of a located handler, with the handler's own
/// name (if any) pre-bound so self-recursion does not leak out.
pub(crate) fn handler_free_idents(func: &HandlerFunc) -> FxHashSet<Atom> {
    match func {
        HandlerFunc::Arrow(arrow) => free_idents(arrow, FxHashSet::default()),
        HandlerFunc::Func { ident, function } => {
            let mut seed = FxHashSet::default();
            if let Some(ident) = ident {
                seed.insert(ident.sym.clone());
            }
            free_idents(function, seed)
        }
    }
}

pub(crate) struct RefCollector {
    scope: ScopeStack,
    out: FxHashSet<Atom>,
}

impl RefCollector {
    fn reference(&mut self, sym: &Atom) {
        if !self.scope.is_bound(sym) {
            self.out.insert(sym.clone());
        }
    }

    /// Classic hoisting: `function` declarations are visible from the top of
    /// their block.
    fn hoist_fns(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            if let Stmt::Decl(Decl::Fn(decl)) = stmt {
                self.scope.declare(&decl.ident.sym);
            }
        }
    }

    /// Binds a pattern into the innermost scope. Default-value initializers
    /// and computed keys are analyzed with the names bound so far in scope,
    /// so `(a, b = a)` resolves `a` locally.
    fn bind_pat(&mut self, pat: &Pat) {
        match pat {
            Pat::Ident(binding) => self.scope.declare(&binding.id.sym),
            Pat::Array(array) => {
                for elem in array.elems.iter().flatten() {
                    self.bind_pat(elem);
                }
            }
            Pat::Rest(rest) => self.bind_pat(&rest.arg),
            Pat::Object(object) => {
                for prop in &object.props {
                    match prop {
                        ObjectPatProp::KeyValue(kv) => {
                            if let PropName::Computed(key) = &kv.key {
                                key.expr.visit_with(self);
                            }
                            self.bind_pat(&kv.value);
                        }
                        ObjectPatProp::Assign(assign) => {
                            if let Some(value) = &assign.value {
                                value.visit_with(self);
                            }
                            self.scope.declare(&assign.key.id.sym);
                        }
                        ObjectPatProp::Rest(rest) => self.bind_pat(&rest.arg),
                    }
                }
            }
            Pat::Assign(assign) => {
                assign.right.visit_with(self);
                self.bind_pat(&assign.left);
            }
            Pat::Expr(expr) => expr.visit_with(self),
            Pat::Invalid(_) => {}
        }
    }

    fn jsx_root(&mut self, member: &JSXMemberExpr) {
        let mut obj = &member.obj;
        loop {
            match obj {
                JSXObject::Ident(ident) => {
                    self.reference(&ident.sym);
                    break;
                }
                JSXObject::JSXMemberExpr(inner) => obj = &inner.obj,
            }
        }
    }
}

impl Visit for RefCollector {
    noop_visit_type!();

    fn visit_ident(&mut self, n: &Ident) {
        self.reference(&n.sym);
    }

    fn visit_module(&mut self, n: &Module) {
        for item in &n.body {
            if let ModuleItem::Stmt(Stmt::Decl(Decl::Fn(decl))) = item {
                self.scope.declare(&decl.ident.sym);
            }
        }
        n.visit_children_with(self);
    }

    fn visit_function(&mut self, n: &Function) {
        self.scope.push();
        for param in &n.params {
            self.bind_pat(&param.pat);
        }
        if let Some(body) = &n.body {
            body.visit_with(self);
        }
        self.scope.pop();
    }

    fn visit_arrow_expr(&mut self, n: &ArrowExpr) {
        self.scope.push();
        for pat in &n.params {
            self.bind_pat(pat);
        }
        match &*n.body {
            BlockStmtOrExpr::BlockStmt(block) => block.visit_with(self),
            BlockStmtOrExpr::Expr(expr) => expr.visit_with(self),
        }
        self.scope.pop();
    }

    fn visit_fn_decl(&mut self, n: &FnDecl) {
        self.scope.declare(&n.ident.sym);
        n.function.visit_with(self);
    }

    fn visit_fn_expr(&mut self, n: &FnExpr) {
        self.scope.push();
        if let Some(ident) = &n.ident {
            self.scope.declare(&ident.sym);
        }
        n.function.visit_with(self);
        self.scope.pop();
    }

    fn visit_class_decl(&mut self, n: &ClassDecl) {
        self.scope.declare(&n.ident.sym);
        n.class.visit_with(self);
    }

    fn visit_class_expr(&mut self, n: &ClassExpr) {
        self.scope.push();
        if let Some(ident) = &n.ident {
            self.scope.declare(&ident.sym);
        }
        n.class.visit_with(self);
        self.scope.pop();
    }

    fn visit_class(&mut self, n: &Class) {
        if let Some(super_class) = &n.super_class {
            super_class.visit_with(self);
        }
        for member in &n.body {
            member.visit_with(self);
        }
    }

    fn visit_constructor(&mut self, n: &Constructor) {
        self.scope.push();
        for param in &n.params {
            match param {
                ParamOrTsParamProp::Param(param) => self.bind_pat(&param.pat),
                ParamOrTsParamProp::TsParamProp(prop) => match &prop.param {
                    TsParamPropParam::Ident(binding) => self.scope.declare(&binding.id.sym),
                    TsParamPropParam::Assign(assign) => {
                        assign.right.visit_with(self);
                        self.bind_pat(&assign.left);
                    }
                },
            }
        }
        if let Some(body) = &n.body {
            body.visit_with(self);
        }
        self.scope.pop();
    }

    fn visit_block_stmt(&mut self, n: &BlockStmt) {
        self.scope.push();
        self.hoist_fns(&n.stmts);
        for stmt in &n.stmts {
            stmt.visit_with(self);
        }
        self.scope.pop();
    }

    fn visit_var_declarator(&mut self, n: &VarDeclarator) {
        self.bind_pat(&n.name);
        if let Some(init) = &n.init {
            init.visit_with(self);
        }
    }

    fn visit_catch_clause(&mut self, n: &CatchClause) {
        self.scope.push();
        if let Some(param) = &n.param {
            self.bind_pat(param);
        }
        n.body.visit_with(self);
        self.scope.pop();
    }

    fn visit_for_stmt(&mut self, n: &ForStmt) {
        self.scope.push();
        n.visit_children_with(self);
        self.scope.pop();
    }

    fn visit_for_in_stmt(&mut self, n: &ForInStmt) {
        self.scope.push();
        n.visit_children_with(self);
        self.scope.pop();
    }

    fn visit_for_of_stmt(&mut self, n: &ForOfStmt) {
        self.scope.push();
        n.visit_children_with(self);
        self.scope.pop();
    }

    fn visit_switch_stmt(&mut self, n: &SwitchStmt) {
        n.discriminant.visit_with(self);
        self.scope.push();
        for case in &n.cases {
            case.visit_with(self);
        }
        self.scope.pop();
    }

    fn visit_labeled_stmt(&mut self, n: &LabeledStmt) {
        n.body.visit_with(self);
    }

    fn visit_break_stmt(&mut self, _: &BreakStmt) {}

    fn visit_continue_stmt(&mut self, _: &ContinueStmt) {}

    fn visit_getter_prop(&mut self, n: &GetterProp) {
        n.key.visit_with(self);
        self.scope.push();
        if let Some(body) = &n.body {
            body.visit_with(self);
        }
        self.scope.pop();
    }

    fn visit_setter_prop(&mut self, n: &SetterProp) {
        n.key.visit_with(self);
        self.scope.push();
        self.bind_pat(&n.param);
        if let Some(body) = &n.body {
            body.visit_with(self);
        }
        self.scope.pop();
    }

    fn visit_ts_enum_decl(&mut self, n: &TsEnumDecl) {
        self.scope.declare(&n.id.sym);
        self.scope.push();
        for member in &n.members {
            if let Some(init) = &member.init {
                init.visit_with(self);
            }
            if let TsEnumMemberId::Ident(ident) = &member.id {
                self.scope.declare(&ident.sym);
            }
        }
        self.scope.pop();
    }

    fn visit_jsx_element_name(&mut self, n: &JSXElementName) {
        match n {
            JSXElementName::Ident(ident) => {
                // Lower-case names are intrinsic elements, not values.
                if !ident.sym.starts_with(|c: char| c.is_ascii_lowercase()) {
                    self.reference(&ident.sym);
                }
            }
            JSXElementName::JSXMemberExpr(member) => self.jsx_root(member),
            JSXElementName::JSXNamespacedName(_) => {}
        }
    }

    fn visit_jsx_attr(&mut self, n: &JSXAttr) {
        if let Some(value) = &n.value {
            value.visit_with(self);
        }
    }

    fn visit_import_decl(&mut self, _: &ImportDecl) {}

    fn visit_export_specifier(&mut self, _: &ExportSpecifier) {}
}

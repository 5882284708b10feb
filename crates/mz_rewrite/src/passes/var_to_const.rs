//! `var` → `const`, or `let` when a declared name is written again.
//!
//! Names are tracked per var scope (program, function, arrow, constructor,
//! accessor, static block). Writes inside a nested scope count against the
//! enclosing one unless the nested scope declares the name itself. A
//! declaration is left alone when one of its
//! names is declared more than once in the scope (a parameter, a function
//! or another `var`), when it shadows a `catch` parameter, or when it is the
//! whole body of an `if`/loop/label, where lexical declarations are not
//! allowed.
//!
//! Hoisting is not modelled: a name read before its declaration, or
//! captured per iteration by closures in a loop, behaves differently once
//! block scoped.

use std::collections::{HashMap, HashSet};

use mz_ast::{
    ArrowExpr, AssignExpr, CatchClause, ClassDecl, Constructor, Decl, DoWhileStmt, FnDecl,
    ForHead, ForInStmt, ForOfStmt, ForStmt, Function, GetterProp, IfStmt, LabeledStmt,
    SetterProp, StaticBlock, Stmt, UpdateExpr, VarDecl, VarDeclKind, WhileStmt, WithStmt,
};
use mz_parser::{Edit, ParsedProgram};
use swc_common::BytePos;
use swc_ecma_visit::{Visit, VisitWith};

use crate::analysis::liveness::{assign_target_names, bound_names, update_target_name};

pub(crate) fn collect(parsed: &ParsedProgram) -> Vec<Edit> {
    let mut pass = VarToConst {
        parsed,
        scopes: Vec::new(),
        catch_params: Vec::new(),
        bare: HashSet::new(),
        loop_heads: HashSet::new(),
        edits: Vec::new(),
    };
    pass.enter(Vec::new());
    parsed.program.visit_with(&mut pass);
    pass.exit();
    pass.edits
}

#[derive(Default)]
struct Scope {
    declared: HashMap<String, usize>,
    /// Names written in this scope or in nested scopes that do not
    /// declare them.
    written: HashSet<String>,
    sites: Vec<Site>,
}

struct Site {
    start: usize,
    names: Vec<String>,
    uninitialized: bool,
    blocked: bool,
}

struct VarToConst<'p> {
    parsed: &'p ParsedProgram,
    scopes: Vec<Scope>,
    catch_params: Vec<Vec<String>>,
    /// `var` declarations that form the entire body of a statement.
    bare: HashSet<BytePos>,
    /// `var` declarations in a `for…in`/`for…of` head.
    loop_heads: HashSet<BytePos>,
    edits: Vec<Edit>,
}

impl<'p> VarToConst<'p> {
    fn enter(&mut self, params: Vec<String>) {
        let mut scope = Scope::default();
        for name in params {
            *scope.declared.entry(name).or_default() += 1;
        }
        self.scopes.push(scope);
    }

    fn exit(&mut self) {
        let Some(scope) = self.scopes.pop() else {
            return;
        };
        if let Some(parent) = self.scopes.last_mut() {
            parent.written.extend(
                scope
                    .written
                    .iter()
                    .filter(|name| !scope.declared.contains_key(*name))
                    .cloned(),
            );
        }
        for site in scope.sites {
            let redeclared = site
                .names
                .iter()
                .any(|name| scope.declared.get(name).copied().unwrap_or(0) > 1);
            if site.blocked || redeclared {
                tracing::trace!(names = ?site.names, redeclared, "var declaration kept");
                continue;
            }
            let written = site.names.iter().any(|name| scope.written.contains(name));
            let keyword = if site.uninitialized || written {
                "let"
            } else {
                "const"
            };
            self.edits
                .push(Edit::new(site.start..site.start + "var".len()).text(keyword));
        }
    }

    fn declare(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            *scope.declared.entry(name.to_string()).or_default() += 1;
        }
    }

    fn write(&mut self, names: impl IntoIterator<Item = String>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.written.extend(names);
        }
    }

    fn mark_bare(&mut self, body: &Stmt) {
        if let Stmt::Decl(Decl::Var(var)) = body {
            self.bare.insert(var.span.lo);
        }
    }

    fn scoped<N>(&mut self, params: Vec<String>, node: &N)
    where
        N: VisitWith<VarToConst<'p>>,
    {
        self.enter(params);
        node.visit_children_with(self);
        self.exit();
    }
}

impl Visit for VarToConst<'_> {
    fn visit_var_decl(&mut self, node: &VarDecl) {
        node.visit_children_with(self);
        if node.kind != VarDeclKind::Var || node.declare {
            return;
        }
        let range = self.parsed.range(node.span);
        if !self.parsed.text()[range.start..].starts_with("var") {
            return;
        }

        let in_loop_head = self.loop_heads.contains(&node.span.lo);
        let names: Vec<String> = node
            .decls
            .iter()
            .flat_map(|decl| bound_names(&decl.name))
            .collect();
        let shadows_catch = self
            .catch_params
            .iter()
            .flatten()
            .any(|param| names.contains(param));
        let blocked = shadows_catch
            || self.bare.contains(&node.span.lo)
            || (in_loop_head && node.decls.iter().any(|decl| decl.init.is_some()));
        let uninitialized = !in_loop_head && node.decls.iter().any(|decl| decl.init.is_none());

        for name in &names {
            self.declare(name);
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.sites.push(Site {
                start: range.start,
                names,
                uninitialized,
                blocked,
            });
        }
    }

    fn visit_assign_expr(&mut self, node: &AssignExpr) {
        self.write(assign_target_names(&node.left));
        node.visit_children_with(self);
    }

    fn visit_update_expr(&mut self, node: &UpdateExpr) {
        self.write(update_target_name(node));
        node.visit_children_with(self);
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        self.declare(node.ident.sym.as_ref());
        node.function.visit_with(self);
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        self.declare(node.ident.sym.as_ref());
        node.class.visit_with(self);
    }

    fn visit_function(&mut self, node: &Function) {
        let params = node
            .params
            .iter()
            .flat_map(|param| bound_names(&param.pat))
            .collect();
        self.scoped(params, node);
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        let params = bound_names(&node.params);
        self.scoped(params, node);
    }

    fn visit_constructor(&mut self, node: &Constructor) {
        self.scoped(bound_names(&node.params), node);
    }

    fn visit_getter_prop(&mut self, node: &GetterProp) {
        self.scoped(Vec::new(), node);
    }

    fn visit_setter_prop(&mut self, node: &SetterProp) {
        self.scoped(bound_names(&*node.param), node);
    }

    fn visit_static_block(&mut self, node: &StaticBlock) {
        self.scoped(Vec::new(), node);
    }

    fn visit_catch_clause(&mut self, node: &CatchClause) {
        let params = node.param.as_ref().map(bound_names).unwrap_or_default();
        self.catch_params.push(params);
        node.visit_children_with(self);
        self.catch_params.pop();
    }

    fn visit_for_in_stmt(&mut self, node: &ForInStmt) {
        match &node.left {
            ForHead::VarDecl(decl) => {
                self.loop_heads.insert(decl.span.lo);
            }
            ForHead::Pat(pat) => self.write(bound_names(&**pat)),
            ForHead::UsingDecl(_) => {}
        }
        self.mark_bare(&node.body);
        node.visit_children_with(self);
    }

    fn visit_for_of_stmt(&mut self, node: &ForOfStmt) {
        match &node.left {
            ForHead::VarDecl(decl) => {
                self.loop_heads.insert(decl.span.lo);
            }
            ForHead::Pat(pat) => self.write(bound_names(&**pat)),
            ForHead::UsingDecl(_) => {}
        }
        self.mark_bare(&node.body);
        node.visit_children_with(self);
    }

    fn visit_for_stmt(&mut self, node: &ForStmt) {
        self.mark_bare(&node.body);
        node.visit_children_with(self);
    }

    fn visit_while_stmt(&mut self, node: &WhileStmt) {
        self.mark_bare(&node.body);
        node.visit_children_with(self);
    }

    fn visit_do_while_stmt(&mut self, node: &DoWhileStmt) {
        self.mark_bare(&node.body);
        node.visit_children_with(self);
    }

    fn visit_if_stmt(&mut self, node: &IfStmt) {
        self.mark_bare(&node.cons);
        if let Some(alt) = &node.alt {
            self.mark_bare(alt);
        }
        node.visit_children_with(self);
    }

    fn visit_labeled_stmt(&mut self, node: &LabeledStmt) {
        self.mark_bare(&node.body);
        node.visit_children_with(self);
    }

    fn visit_with_stmt(&mut self, node: &WithStmt) {
        self.mark_bare(&node.body);
        node.visit_children_with(self);
    }
}

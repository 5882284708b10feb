//! `new Promise(resolve => resolve(x))` → `Promise.try(() => x)`.
//!
//! Recognised executor bodies, with `resolve` the first parameter:
//!
//! ```text
//! resolve => resolve(expr)           → Promise.try(() => expr)
//! resolve => { resolve(expr); }      → Promise.try(() => expr)
//! resolve => f(resolve)              → Promise.try(f)
//! ```
//!
//! `Promise.try` calls its argument synchronously and settles with what it
//! returns, so `f` is called without the resolver.

use std::collections::HashSet;

use mz_ast::{AwaitExpr, BlockStmt, BlockStmtOrExpr, Callee, Expr, NewExpr, Pat, Stmt};
use mz_parser::{Edit, ParsedProgram};
use swc_common::{BytePos, Spanned};
use swc_ecma_visit::{Visit, VisitWith};

use crate::analysis::free_vars::function_capture;
use crate::analysis::liveness::mentions;
use crate::syntax::{ident_name, pat_ident, plain_args, unparen};

pub(crate) fn collect(parsed: &ParsedProgram) -> Vec<Edit> {
    let mut pass = PromiseTry {
        parsed,
        awaited: HashSet::new(),
        edits: Vec::new(),
    };
    parsed.program.visit_with(&mut pass);
    pass.edits
}

struct PromiseTry<'p> {
    parsed: &'p ParsedProgram,
    awaited: HashSet<BytePos>,
    edits: Vec<Edit>,
}

/// What replaces the executor.
#[derive(Clone, Copy)]
enum Substitute<'a> {
    /// `() => expr`
    Thunk(&'a Expr),
    /// The function that was handed `resolve`.
    Callee(&'a Expr),
}

/// Parameters and the single expression an executor evaluates.
struct Executor<'a> {
    params: Vec<&'a Pat>,
    expr: &'a Expr,
}

fn sole_expression(block: &BlockStmt) -> Option<&Expr> {
    match &block.stmts[..] {
        [Stmt::Expr(stmt)] => Some(&stmt.expr),
        _ => None,
    }
}

fn executor(expr: &Expr) -> Option<Executor<'_>> {
    match unparen(expr) {
        Expr::Arrow(arrow) => {
            if arrow.is_async
                || arrow.is_generator
                || arrow.type_params.is_some()
                || arrow.return_type.is_some()
            {
                return None;
            }
            let expr = match &*arrow.body {
                BlockStmtOrExpr::Expr(expr) => &**expr,
                BlockStmtOrExpr::BlockStmt(block) => sole_expression(block)?,
            };
            Some(Executor {
                params: arrow.params.iter().collect(),
                expr,
            })
        }
        Expr::Fn(fn_expr) => {
            let function = &fn_expr.function;
            if function.is_async
                || function.is_generator
                || function.type_params.is_some()
                || function.return_type.is_some()
                || function_capture(function).is_some()
            {
                return None;
            }
            let expr = sole_expression(function.body.as_ref()?)?;
            if let Some(ident) = &fn_expr.ident {
                if mentions(expr, ident.sym.as_ref()) {
                    return None;
                }
            }
            Some(Executor {
                params: function.params.iter().map(|param| &param.pat).collect(),
                expr,
            })
        }
        _ => None,
    }
}

fn plain_param(pat: &Pat) -> Option<&str> {
    match pat {
        Pat::Ident(binding) if binding.type_ann.is_none() => pat_ident(pat),
        _ => None,
    }
}

fn substitute<'a>(body: &'a Expr, resolve: &str) -> Option<Substitute<'a>> {
    let Expr::Call(call) = unparen(body) else {
        return None;
    };
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    if call.type_args.is_some() {
        return None;
    }
    let [arg] = plain_args(&call.args)?[..] else {
        return None;
    };
    let callee = unparen(callee);
    match ident_name(callee)? {
        name if name == resolve => Some(Substitute::Thunk(arg)),
        _ if ident_name(unparen(arg)) == Some(resolve) => Some(Substitute::Callee(callee)),
        _ => None,
    }
}

impl PromiseTry<'_> {
    fn rewrite(&self, new: &NewExpr) -> Option<Edit> {
        if self.awaited.contains(&new.span.lo)
            || new.type_args.is_some()
            || ident_name(unparen(&new.callee)) != Some("Promise")
        {
            return None;
        }
        let [argument] = plain_args(new.args.as_deref()?)?[..] else {
            return None;
        };
        let executor = executor(argument)?;
        if !(1..=2).contains(&executor.params.len()) {
            return None;
        }
        let names = executor
            .params
            .iter()
            .map(|pat| plain_param(pat))
            .collect::<Option<Vec<_>>>()?;
        let resolve = names[0];

        let substitute = substitute(executor.expr, resolve)?;
        let (Substitute::Thunk(code) | Substitute::Callee(code)) = substitute;
        if names.iter().any(|name| mentions(code, name)) {
            tracing::trace!(span = ?new.span, "executor leaks its resolvers");
            return None;
        }

        let edit = Edit::new(self.parsed.range(new.span)).text("Promise.try(");
        let edit = match substitute {
            Substitute::Thunk(expr) => {
                let object = matches!(expr, Expr::Object(_));
                edit.text(if object { "() => (" } else { "() => " })
                    .source(self.parsed.range(expr.span()))
                    .text(if object { ")" } else { "" })
            }
            Substitute::Callee(callee) => edit.source(self.parsed.range(callee.span())),
        };
        Some(edit.text(")"))
    }
}

impl Visit for PromiseTry<'_> {
    fn visit_await_expr(&mut self, node: &AwaitExpr) {
        if let Expr::New(new) = unparen(&node.arg) {
            self.awaited.insert(new.span.lo);
        }
        node.visit_children_with(self);
    }

    fn visit_new_expr(&mut self, node: &NewExpr) {
        if let Some(edit) = self.rewrite(node) {
            self.edits.push(edit);
        }
        node.visit_children_with(self);
    }
}

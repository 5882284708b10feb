//! Anonymous `function` expressions → arrow functions.
//!
//! A function is converted only when nothing inside it depends on the
//! bindings a plain function introduces (`this`, `arguments`, `super`,
//! `new.target`). Constructor use is only visible when the expression is
//! the direct callee of `new`; a function stored first and constructed
//! later is converted and will throw.

use std::collections::HashSet;

use mz_ast::{Class, Expr, FnExpr, NewExpr};
use mz_parser::{Edit, ParsedProgram};
use swc_common::BytePos;
use swc_ecma_visit::{Visit, VisitWith};

use crate::analysis::free_vars::function_capture;
use crate::analysis::liveness::bound_names;
use crate::parens::{needs_parens, safe_start, Form};
use crate::syntax::unparen;

pub(crate) fn collect(parsed: &ParsedProgram) -> Vec<Edit> {
    let mut pass = FunctionToArrow {
        parsed,
        constructed: HashSet::new(),
        edits: Vec::new(),
    };
    parsed.program.visit_with(&mut pass);
    pass.edits
}

struct FunctionToArrow<'p> {
    parsed: &'p ParsedProgram,
    /// Function expressions used as a `new` callee or as a superclass.
    constructed: HashSet<BytePos>,
    edits: Vec<Edit>,
}

fn has_duplicates(names: &[String]) -> bool {
    let mut seen = HashSet::new();
    names.iter().any(|name| !seen.insert(name))
}

impl FunctionToArrow<'_> {
    fn mark_constructed(&mut self, expr: &Expr) {
        if let Expr::Fn(fn_expr) = unparen(expr) {
            self.constructed.insert(fn_expr.function.span.lo);
        }
    }

    fn rewrite(&self, fn_expr: &FnExpr) -> Option<Edit> {
        let function = &fn_expr.function;
        if fn_expr.ident.is_some()
            || function.is_generator
            || function.type_params.is_some()
            || self.constructed.contains(&function.span.lo)
        {
            return None;
        }
        let body = function.body.as_ref()?;
        let names: Vec<String> = function
            .params
            .iter()
            .flat_map(|param| bound_names(&param.pat))
            .collect();
        if names.iter().any(|name| name == "this") || has_duplicates(&names) {
            return None;
        }
        if let Some(capture) = function_capture(function) {
            tracing::trace!(?capture, span = ?function.span, "function kept");
            return None;
        }

        let range = self.parsed.range(function.span);
        let mut edit = Edit::new(range.clone())
            .text(if function.is_async { "async (" } else { "(" });
        if let (Some(first), Some(last)) = (function.params.first(), function.params.last()) {
            edit = edit.source(self.parsed.range(first.span.to(last.span)));
        }
        edit = edit.text(")");
        if let Some(return_type) = &function.return_type {
            let annotation = self.parsed.range(return_type.span);
            if !self.parsed.text()[annotation.clone()].starts_with(':') {
                edit = edit.text(": ");
            }
            edit = edit.source(annotation);
        }
        let edit = edit
            .text(" => ")
            .source(self.parsed.range(body.span))
            .parenthesized_if(needs_parens(self.parsed.text(), &range, Form::Arrow));
        safe_start(&edit, self.parsed.text()).then_some(edit)
    }
}

impl Visit for FunctionToArrow<'_> {
    fn visit_new_expr(&mut self, node: &NewExpr) {
        self.mark_constructed(&node.callee);
        node.visit_children_with(self);
    }

    fn visit_class(&mut self, node: &Class) {
        if let Some(super_class) = &node.super_class {
            self.mark_constructed(super_class);
        }
        node.visit_children_with(self);
    }

    fn visit_fn_expr(&mut self, node: &FnExpr) {
        if let Some(edit) = self.rewrite(node) {
            self.edits.push(edit);
        }
        node.visit_children_with(self);
    }
}

#[cfg(test)]
mod tests {
    use crate::passes::PassKind;
    use crate::test_support::{rewrite, unchanged};

    const KIND: PassKind = PassKind::FunctionToArrow;

    #[test]
    fn keeps_parameters_and_body() {
        let (output, lines) = rewrite(
            KIND,
            "items.map(function (item, index) {\n  return item * index;\n});\n",
        );
        assert_eq!(output, "items.map((item, index) => {\n  return item * index;\n});\n");
        assert_eq!(lines, vec![1]);
        let (output, _) = rewrite(KIND, "const f = function () {};\n");
        assert_eq!(output, "const f = () => {};\n");
    }

    #[test]
    fn keeps_async_and_annotations() {
        let (output, _) = rewrite(
            KIND,
            "const load = async function (id: string): Promise<Item> { return get(id); };\n",
        );
        assert_eq!(
            output,
            "const load = async (id: string): Promise<Item> => { return get(id); };\n"
        );
    }

    #[test]
    fn parenthesizes_outside_expression_slots() {
        let (output, _) = rewrite(KIND, "const g = function () { return 1; }.call(null);\n");
        assert_eq!(output, "const g = (() => { return 1; }).call(null);\n");
        let (output, _) = rewrite(KIND, "(function () { init(); })();\n");
        assert_eq!(output, "(() => { init(); })();\n");
    }

    #[test]
    fn nested_functions_are_converted_in_one_run() {
        let (output, lines) = rewrite(
            KIND,
            "on(function () {\n  each(function (x) { use(x); });\n});\n",
        );
        assert_eq!(output, "on(() => {\n  each((x) => { use(x); });\n});\n");
        assert_eq!(lines, vec![1, 2]);
    }

    #[test]
    fn captured_bindings_block_the_rewrite() {
        unchanged(KIND, "el.on('click', function () { this.hide(); });\n");
        unchanged(KIND, "f(function () { return arguments.length; });\n");
        unchanged(KIND, "f(function () { return () => this.x; });\n");
        unchanged(KIND, "f(function () { if (!new.target) throw 0; });\n");
        unchanged(KIND, "const o = { m() { return function () { super.m(); }; } };\n");
    }

    #[test]
    fn inner_plain_functions_own_their_this() {
        let (output, _) = rewrite(
            KIND,
            "f(function () { return function () { return this; }; });\n",
        );
        assert_eq!(output, "f(() => { return function () { return this; }; });\n");
    }

    #[test]
    fn skips_other_function_shapes() {
        unchanged(KIND, "const fact = function fact(n) { return n && n * fact(n - 1); };\n");
        unchanged(KIND, "const gen = function* () { yield 1; };\n");
        unchanged(KIND, "const id = function <T>(x: T): T { return x; };\n");
        unchanged(KIND, "f(function (this: Window) { return 1; });\n");
        unchanged(KIND, "const o = new (function () { init(); })();\n");
        unchanged(KIND, "function declared() {}\n");
        unchanged(KIND, "export default function () {}\n");
    }
}

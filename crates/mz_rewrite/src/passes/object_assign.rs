//! `Object.assign({}, a, b)` → `{ ...a, ...b }`.

use mz_ast::Expr;
use mz_parser::{Edit, ParsedProgram};
use swc_common::Spanned;
use swc_ecma_visit::{Visit, VisitWith};

use crate::parens::{needs_parens, safe_start, Form};
use crate::syntax::{plain_args, static_call, unparen};

pub(crate) fn collect(parsed: &ParsedProgram) -> Vec<Edit> {
    let mut pass = ObjectAssign {
        parsed,
        edits: Vec::new(),
    };
    parsed.program.visit_with(&mut pass);
    pass.edits
}

struct ObjectAssign<'p> {
    parsed: &'p ParsedProgram,
    edits: Vec<Edit>,
}

impl ObjectAssign<'_> {
    fn rewrite(&self, expr: &Expr) -> Option<Edit> {
        let call = static_call(expr, "Object", "assign")?;
        let args = plain_args(&call.args)?;
        let (target, sources) = args.split_first()?;
        match unparen(target) {
            Expr::Object(object) if object.props.is_empty() => {}
            _ => return None,
        }

        let range = self.parsed.range(call.span);
        let mut edit = Edit::new(range.clone());
        if sources.is_empty() {
            edit = edit.text("{}");
        } else {
            edit = edit.text("{ ");
            for (idx, source) in sources.iter().enumerate() {
                if idx > 0 {
                    edit = edit.text(", ");
                }
                edit = edit.text("...").source(self.parsed.range(source.span()));
            }
            edit = edit.text(" }");
        }
        let edit = edit.parenthesized_if(needs_parens(self.parsed.text(), &range, Form::Object));
        safe_start(&edit, self.parsed.text()).then_some(edit)
    }
}

impl Visit for ObjectAssign<'_> {
    fn visit_expr(&mut self, expr: &Expr) {
        if let Some(edit) = self.rewrite(expr) {
            self.edits.push(edit);
        }
        expr.visit_children_with(self);
    }
}

#[cfg(test)]
mod tests {
    use crate::passes::PassKind;
    use crate::test_support::{rewrite, unchanged};

    const KIND: PassKind = PassKind::ObjectAssignToSpread;

    #[test]
    fn merges_into_an_object_literal() {
        let (output, lines) = rewrite(KIND, "const merged = Object.assign({}, defaults, options);\n");
        assert_eq!(output, "const merged = { ...defaults, ...options };\n");
        assert_eq!(lines, vec![1]);
        let (output, _) = rewrite(KIND, "f(Object.assign({}));\n");
        assert_eq!(output, "f({});\n");
    }

    #[test]
    fn wraps_in_statement_and_arrow_body_positions() {
        let (output, _) = rewrite(KIND, "const f = (a) => Object.assign({}, a);\n");
        assert_eq!(output, "const f = (a) => ({ ...a });\n");
        let (output, _) = rewrite(KIND, "Object.assign({}, a).x;\n");
        assert_eq!(output, "({ ...a }).x;\n");
    }

    #[test]
    fn requires_an_empty_object_literal_target() {
        unchanged(KIND, "Object.assign(target, a);\n");
        unchanged(KIND, "Object.assign({ a: 1 }, b);\n");
        unchanged(KIND, "Object.assign({}, ...sources);\n");
        unchanged(KIND, "Object.assign();\n");
        unchanged(KIND, "Reflect.assign({}, a);\n");
    }
}

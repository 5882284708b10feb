//! The rewrite passes and their registration order.
//!
//! Each pass reads one parsed program and returns the edits for every
//! candidate it accepts. Candidates are found against the tree as it was at
//! the start of the pass, so one pass never sees its own output.

use std::fmt;
use std::ops::Range;

use mz_ast::Baseline;
use mz_parser::{Edit, ParsedProgram};
use serde::{Deserialize, Serialize};
use swc_common::Span;

use crate::analysis::callback::{InlineCallback, LoopBody};

mod array_concat;
mod array_from_for_each;
mod array_from_spread;
mod dom_for_each;
mod function_to_arrow;
mod indexed_for;
mod math_pow;
mod object_assign;
mod object_keys_for_in;
mod promise_try;
mod string_concat;
mod var_to_const;

/// One rewrite, named the way change records report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PassKind {
    VarToConst,
    ObjectAssignToSpread,
    ArrayFromForEachToForOf,
    ArrayFromToSpread,
    ArrayConcatToSpread,
    MathPowToExponent,
    IndexedForToForOf,
    DomForEachToForOf,
    ObjectKeysForOfToForIn,
    StringConcatToTemplate,
    FunctionToArrow,
    PromiseConstructorToTry,
}

impl PassKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PassKind::VarToConst => "var-to-const",
            PassKind::ObjectAssignToSpread => "object-assign-to-spread",
            PassKind::ArrayFromForEachToForOf => "array-from-for-each-to-for-of",
            PassKind::ArrayFromToSpread => "array-from-to-spread",
            PassKind::ArrayConcatToSpread => "array-concat-to-spread",
            PassKind::MathPowToExponent => "math-pow-to-exponent",
            PassKind::IndexedForToForOf => "indexed-for-to-for-of",
            PassKind::DomForEachToForOf => "dom-for-each-to-for-of",
            PassKind::ObjectKeysForOfToForIn => "object-keys-for-of-to-for-in",
            PassKind::StringConcatToTemplate => "string-concat-to-template",
            PassKind::FunctionToArrow => "function-to-arrow",
            PassKind::PromiseConstructorToTry => "promise-constructor-to-try",
        }
    }
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const WIDELY_AVAILABLE: &[PassKind] = &[
    PassKind::VarToConst,
    PassKind::ObjectAssignToSpread,
    PassKind::ArrayFromForEachToForOf,
    PassKind::ArrayFromToSpread,
    PassKind::ArrayConcatToSpread,
    PassKind::MathPowToExponent,
    PassKind::IndexedForToForOf,
    PassKind::DomForEachToForOf,
    PassKind::ObjectKeysForOfToForIn,
    PassKind::StringConcatToTemplate,
    PassKind::FunctionToArrow,
];

const NEWLY_AVAILABLE: &[PassKind] = &[
    PassKind::VarToConst,
    PassKind::ObjectAssignToSpread,
    PassKind::ArrayFromForEachToForOf,
    PassKind::ArrayFromToSpread,
    PassKind::ArrayConcatToSpread,
    PassKind::MathPowToExponent,
    PassKind::IndexedForToForOf,
    PassKind::DomForEachToForOf,
    PassKind::ObjectKeysForOfToForIn,
    PassKind::StringConcatToTemplate,
    PassKind::FunctionToArrow,
    PassKind::PromiseConstructorToTry,
];

/// Passes allowed under `baseline`, in the order they run.
pub fn passes(baseline: Baseline) -> &'static [PassKind] {
    match baseline {
        Baseline::WidelyAvailable => WIDELY_AVAILABLE,
        Baseline::NewlyAvailable => NEWLY_AVAILABLE,
    }
}

/// Edits `kind` makes to `parsed`.
pub(crate) fn collect(kind: PassKind, parsed: &ParsedProgram) -> Vec<Edit> {
    match kind {
        PassKind::VarToConst => var_to_const::collect(parsed),
        PassKind::ObjectAssignToSpread => object_assign::collect(parsed),
        PassKind::ArrayFromForEachToForOf => array_from_for_each::collect(parsed),
        PassKind::ArrayFromToSpread => array_from_spread::collect(parsed),
        PassKind::ArrayConcatToSpread => array_concat::collect(parsed),
        PassKind::MathPowToExponent => math_pow::collect(parsed),
        PassKind::IndexedForToForOf => indexed_for::collect(parsed),
        PassKind::DomForEachToForOf => dom_for_each::collect(parsed),
        PassKind::ObjectKeysForOfToForIn => object_keys_for_in::collect(parsed),
        PassKind::StringConcatToTemplate => string_concat::collect(parsed),
        PassKind::FunctionToArrow => function_to_arrow::collect(parsed),
        PassKind::PromiseConstructorToTry => promise_try::collect(parsed),
    }
}

/// Range of a statement, including a `;` the span stops short of.
fn statement_range(parsed: &ParsedProgram, span: Span) -> Range<usize> {
    let range = parsed.range(span);
    let text = parsed.text();
    if text[..range.end].ends_with(';') {
        return range;
    }
    let rest = &text[range.end..];
    let gap = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    if rest[gap..].starts_with(';') {
        range.start..range.end + gap + 1
    } else {
        range
    }
}

/// `for (<kw> <binding> of <iterable>) <body>` replacing the statement at
/// `range`.
fn for_of_edit(range: Range<usize>, callback: &InlineCallback, iterable: Range<usize>) -> Edit {
    let edit = Edit::new(range)
        .text(format!("for ({} ", callback.keyword))
        .source(callback.binding.clone())
        .text(" of ")
        .source(iterable)
        .text(") ");
    match &callback.body {
        LoopBody::Block(block) => edit.source(block.clone()),
        LoopBody::Expr(expr) => edit.text("{ ").source(expr.clone()).text("; }"),
    }
}

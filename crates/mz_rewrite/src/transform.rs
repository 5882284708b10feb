//! The pass orchestrator.
//!
//! Parses the input once, then runs each pass of the selected baseline in
//! registration order against the current text. A pass that applied edits
//! forces a reparse before the next pass, so later passes see earlier
//! rewrites. Change records carry the line of the original input.

use mz_ast::{Baseline, Dialect};
use mz_parser::{parse_program, Document};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TransformError;
use crate::passes::{self, PassKind};

/// How often the pass list is run over one input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Convergence {
    /// Every pass runs once. Nested patterns shrink by one level per call.
    #[default]
    SinglePass,
    /// Repeat the pass list until a round changes nothing, at most
    /// `max_rounds` times.
    UntilStable { max_rounds: u32 },
}

impl Convergence {
    fn rounds(self) -> u32 {
        match self {
            Convergence::SinglePass => 1,
            Convergence::UntilStable { max_rounds } => max_rounds.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    pub baseline: Baseline,
    pub dialect: Dialect,
    pub convergence: Convergence,
}

/// One applied rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    #[serde(rename = "type")]
    pub kind: PassKind,
    /// 1-based line of the original input.
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformResult {
    pub code: String,
    pub modified: bool,
    pub changes: Vec<ChangeRecord>,
}

/// Modernize `source` with the passes allowed under `baseline`.
pub fn transform(source: &str, baseline: Baseline) -> Result<TransformResult, TransformError> {
    transform_with(
        source,
        &TransformOptions {
            baseline,
            ..TransformOptions::default()
        },
    )
}

pub fn transform_with(
    source: &str,
    options: &TransformOptions,
) -> Result<TransformResult, TransformError> {
    let mut parsed = parse_program(source, options.dialect)?;
    let mut document = Document::new(source);
    let mut changes = Vec::new();

    for round in 1..=options.convergence.rounds() {
        let before = changes.len();
        for &kind in passes::passes(options.baseline) {
            let lines = document.apply(passes::collect(kind, &parsed));
            debug!(pass = %kind, round, rewrites = lines.len(), "pass finished");
            if lines.is_empty() {
                continue;
            }
            for &line in &lines {
                debug!(pass = %kind, line, "rewrite applied");
            }
            changes.extend(lines.into_iter().map(|line| ChangeRecord { kind, line }));
            parsed = parse_program(document.text(), options.dialect).map_err(|e| {
                TransformError::Rewrite {
                    pass: kind,
                    message: e.to_string(),
                }
            })?;
        }
        if changes.len() == before {
            break;
        }
    }

    Ok(TransformResult {
        modified: !changes.is_empty(),
        code: document.into_text(),
        changes,
    })
}

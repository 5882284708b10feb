use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use mz_ast::{Baseline, Dialect};
use mz_rewrite::{
    transform_with, ChangeRecord, Convergence, PassKind, TransformOptions, TransformResult,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"];

const MAX_ROUNDS: u32 = 16;

#[derive(Parser)]
#[command(
    name = "modernize",
    about = "Rewrite outdated JavaScript/TypeScript idioms with modern syntax"
)]
struct Cli {
    /// Files or directories to process.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// Which tier of rewrites may run.
    #[arg(long, default_value_t = Baseline::WidelyAvailable)]
    baseline: Baseline,
    /// Overwrite modified files instead of only reporting them.
    #[arg(long)]
    write: bool,
    /// Print one JSON object per file.
    #[arg(long)]
    json: bool,
    /// Repeat the passes until nothing changes.
    #[arg(long)]
    until_stable: bool,
    /// Log every applied rewrite.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct FileReport<'a> {
    path: &'a Path,
    modified: bool,
    changes: &'a [ChangeRecord],
}

#[derive(Serialize)]
struct FileFailure<'a> {
    path: &'a Path,
    error: String,
}

#[derive(Default)]
struct Summary {
    pending: usize,
    written: usize,
    failed: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(summary) if summary.failed > 0 => ExitCode::from(2),
        Ok(summary) if summary.pending > 0 => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<Summary> {
    let mut files = Vec::new();
    for path in &cli.paths {
        if path.is_dir() {
            collect_sources(path, &mut files)
                .with_context(|| format!("failed to read directory {}", path.display()))?;
        } else {
            files.push(path.clone());
        }
    }
    files.sort();
    files.dedup();

    let convergence = if cli.until_stable {
        Convergence::UntilStable {
            max_rounds: MAX_ROUNDS,
        }
    } else {
        Convergence::SinglePass
    };

    let mut summary = Summary::default();
    for path in &files {
        let result = process(path, cli.baseline, convergence);
        match result {
            Ok(result) => {
                if cli.json {
                    let report = FileReport {
                        path,
                        modified: result.modified,
                        changes: &result.changes,
                    };
                    println!("{}", serde_json::to_string(&report)?);
                } else if result.modified {
                    print_report(path, &result.changes);
                }
                if !result.modified {
                    continue;
                }
                if cli.write {
                    std::fs::write(path, &result.code)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    summary.written += 1;
                } else {
                    summary.pending += 1;
                }
            }
            Err(e) => {
                summary.failed += 1;
                if cli.json {
                    let failure = FileFailure {
                        path,
                        error: format!("{e:#}"),
                    };
                    println!("{}", serde_json::to_string(&failure)?);
                } else {
                    eprintln!("{}: {e:#}", path.display());
                }
            }
        }
    }

    if !cli.json {
        let verb = if cli.write { "rewrote" } else { "would rewrite" };
        let count = if cli.write { summary.written } else { summary.pending };
        eprintln!(
            "{verb} {count} of {} file(s), {} failed",
            files.len(),
            summary.failed
        );
    }
    Ok(summary)
}

fn process(path: &Path, baseline: Baseline, convergence: Convergence) -> Result<TransformResult> {
    let source =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let options = TransformOptions {
        baseline,
        dialect: dialect_for(path),
        convergence,
    };
    Ok(transform_with(&source, &options)?)
}

fn dialect_for(path: &Path) -> Dialect {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(Dialect::from_extension)
        .unwrap_or(Dialect::Ecmascript)
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.contains(&ext))
}

fn is_skipped_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name == "node_modules" || name.starts_with('.'))
}

fn collect_sources(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if !is_skipped_dir(&path) {
                collect_sources(&path, files)?;
            }
        } else if is_source_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// Lines per change type, types in the order they first appear.
fn group_changes(changes: &[ChangeRecord]) -> Vec<(PassKind, Vec<u32>)> {
    let mut order = Vec::new();
    let mut lines: BTreeMap<&'static str, Vec<u32>> = BTreeMap::new();
    for change in changes {
        let entry = lines.entry(change.kind.as_str()).or_default();
        if entry.is_empty() {
            order.push(change.kind);
        }
        entry.push(change.line);
    }
    order
        .into_iter()
        .map(|kind| (kind, lines.remove(kind.as_str()).unwrap_or_default()))
        .collect()
}

fn print_report(path: &Path, changes: &[ChangeRecord]) {
    println!("{}", path.display());
    for (kind, lines) in group_changes(changes) {
        let lines: Vec<String> = lines.iter().map(u32::to_string).collect();
        let label = if lines.len() == 1 { "line" } else { "lines" };
        println!("  {kind}: {label} {}", lines.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_lines_by_first_appearance() {
        let change = |kind, line| ChangeRecord { kind, line };
        let grouped = group_changes(&[
            change(PassKind::VarToConst, 3),
            change(PassKind::MathPowToExponent, 1),
            change(PassKind::VarToConst, 7),
        ]);
        assert_eq!(
            grouped,
            vec![
                (PassKind::VarToConst, vec![3, 7]),
                (PassKind::MathPowToExponent, vec![1]),
            ]
        );
    }

    #[test]
    fn picks_sources_and_dialects_by_extension() {
        assert!(is_source_file(Path::new("src/app.mjs")));
        assert!(is_source_file(Path::new("src/view.tsx")));
        assert!(!is_source_file(Path::new("README.md")));
        assert_eq!(dialect_for(Path::new("a.cts")), Dialect::Typescript);
        assert_eq!(dialect_for(Path::new("a.tsx")), Dialect::Tsx);
        assert_eq!(dialect_for(Path::new("a.jsx")), Dialect::Ecmascript);
    }

    #[test]
    fn skips_dependencies_and_hidden_directories() {
        assert!(is_skipped_dir(Path::new("web/node_modules")));
        assert!(is_skipped_dir(Path::new("repo/.git")));
        assert!(!is_skipped_dir(Path::new("repo/src")));
    }

    #[test]
    fn parses_the_command_line() {
        let cli = Cli::try_parse_from([
            "modernize",
            "--baseline",
            "newly-available",
            "--write",
            "src",
        ])
        .unwrap();
        assert_eq!(cli.baseline, Baseline::NewlyAvailable);
        assert!(cli.write && !cli.json && !cli.until_stable);
        assert_eq!(cli.paths, vec![PathBuf::from("src")]);
        assert!(Cli::try_parse_from(["modernize"]).is_err());
    }
}

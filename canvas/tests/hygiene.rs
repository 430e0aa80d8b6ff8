//! Source hygiene budgets for the canvas crate.
//!
//! Scans production sources under `src/` for patterns the engine must not
//! contain. Every budget is zero and stays that way: the engine runs on the
//! owner thread of an interactive session and may not panic or swallow errors.

use std::fs;
use std::path::Path;

/// `(pattern, budget, hint)`.
const BUDGETS: &[(&str, usize, &str)] = &[
    // Panics.
    (".unwrap()", 0, "propagate or handle the None/Err case"),
    (".expect(", 0, "propagate or handle the None/Err case"),
    ("panic!(", 0, "return an error instead"),
    ("unreachable!(", 0, "make the state unrepresentable"),
    ("todo!(", 0, "finish the implementation"),
    ("unimplemented!(", 0, "finish the implementation"),
    // Discarded results.
    ("let _ =", 0, "inspect the result"),
    (".ok()", 0, "inspect the error"),
    // Structure.
    ("#[allow(dead_code)]", 0, "delete the dead code"),
    ("println!(", 0, "the engine has no stdout"),
    ("eprintln!(", 0, "the engine has no stderr"),
];

struct SourceFile {
    path: String,
    content: String,
}

/// Production `.rs` files under `src/`, excluding `*_test.rs` siblings.
fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        if !path_str.ends_with(".rs") || path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

/// Per-file line counts of `pattern`, skipping `//` comment lines.
fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .map(|file| {
            let count = file
                .content
                .lines()
                .filter(|line| !line.trim_start().starts_with("//") && line.contains(pattern))
                .count();
            (file.path.clone(), count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
}

fn format_hits(hits: &[(String, usize)]) -> String {
    hits.iter()
        .map(|(path, count)| format!("  {path}: {count}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn sources_are_found() {
    let files = source_files();
    assert!(files.iter().any(|f| f.path.ends_with("engine.rs")), "scanner found no engine.rs");
}

#[test]
fn pattern_budgets() {
    let files = source_files();
    let mut failures = Vec::new();
    for &(pattern, budget, hint) in BUDGETS {
        let found = hits(&files, pattern);
        let count: usize = found.iter().map(|(_, c)| c).sum();
        if count > budget {
            failures.push(format!("{pattern} found {count}, max {budget} ({hint}):\n{}", format_hits(&found)));
        }
    }
    assert!(failures.is_empty(), "hygiene budgets exceeded:\n{}", failures.join("\n"));
}

/// The engine is the document's only writer; copy-on-write happens there.
#[test]
fn make_mut_confined_to_engine() {
    let files = source_files();
    let outside: Vec<(String, usize)> = hits(&files, "Arc::make_mut(")
        .into_iter()
        .filter(|(path, _)| !path.ends_with("engine.rs"))
        .collect();
    assert!(outside.is_empty(), "Arc::make_mut outside engine.rs:\n{}", format_hits(&outside));
}

/// Nothing in the engine may block or touch I/O.
#[test]
fn engine_is_io_free() {
    let files = source_files();
    for pattern in ["std::fs", "std::net", "std::thread::sleep", "tokio"] {
        let found = hits(&files, pattern);
        assert!(found.is_empty(), "{pattern} used in canvas:\n{}", format_hits(&found));
    }
}

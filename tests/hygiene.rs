//! Hygiene: enforces coding standards at test time.
//!
//! Scans production sources under `src/` (sibling `*_test.rs` files are
//! excluded) for constructs that crash the process, swallow errors, or
//! bypass `tracing`. Each pattern has a budget; lower it when a use goes
//! away, never raise it to make room for a new one.

use std::fs;
use std::path::{Path, PathBuf};

/// `(pattern, budget, why it is restricted)`.
const BUDGETS: &[(&str, usize, &str)] = &[
    (".unwrap()", 0, "panics on error"),
    (".expect(", 0, "panics on error"),
    ("panic!(", 0, "crashes the process"),
    ("unreachable!(", 0, "crashes the process"),
    ("todo!(", 0, "unfinished stub"),
    ("unimplemented!(", 0, "unfinished stub"),
    ("let _ =", 0, "discards a value without inspecting it"),
    // Environment fallbacks in `config` and CSS length parsing in `breakpoint`.
    (".ok()", 3, "drops the error"),
    ("#[allow(dead_code)]", 0, "hides unused code"),
    ("println!(", 0, "bypasses tracing"),
    ("eprintln!(", 0, "bypasses tracing"),
    ("dbg!(", 0, "debug leftover"),
];

struct SourceFile {
    path: PathBuf,
    content: String,
}

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect(Path::new(env!("CARGO_MANIFEST_DIR")).join("src").as_path(), &mut files);
    files
}

fn collect(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            collect(&path, out);
            continue;
        }
        let is_rs = path.extension().is_some_and(|e| e == "rs");
        let is_test = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().ends_with("_test.rs"));
        if is_rs && !is_test {
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path, content });
            }
        }
    }
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .map(|f| {
            let count = f.content.lines().filter(|l| l.contains(pattern)).count();
            (f.path.display().to_string(), count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
}

#[test]
fn sources_are_found() {
    let files = source_files();
    assert!(files.iter().any(|f| f.path.ends_with("lib.rs")), "src/lib.rs not scanned");
}

#[test]
fn pattern_budgets_hold() {
    let files = source_files();
    let mut report = Vec::new();
    for (pattern, budget, why) in BUDGETS {
        let found = hits(&files, pattern);
        let count = found.iter().map(|(_, c)| c).sum::<usize>();
        if count > *budget {
            let detail = found
                .iter()
                .map(|(path, c)| format!("    {path}: {c}"))
                .collect::<Vec<_>>()
                .join("\n");
            report.push(format!("{pattern} ({why}): found {count}, max {budget}\n{detail}"));
        }
    }
    assert!(report.is_empty(), "hygiene budgets exceeded:\n{}", report.join("\n"));
}

#[test]
fn test_module_paths_exist() {
    let files = source_files();
    let mut missing = Vec::new();
    for file in &files {
        let dir = file.path.parent().unwrap_or_else(|| Path::new("."));
        for line in file.content.lines() {
            let Some(rest) = line.trim().strip_prefix("#[path = \"") else {
                continue;
            };
            let Some(target) = rest.split('"').next() else {
                continue;
            };
            if !dir.join(target).is_file() {
                missing.push(format!("{} -> {target}", file.path.display()));
            }
        }
    }
    assert!(missing.is_empty(), "missing test modules:\n{}", missing.join("\n"));
}

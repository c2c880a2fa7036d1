//! Hygiene: source-level budgets for library code.
//!
//! Scans `src/` (minus `*_test.rs` and the shared test mocks) for patterns
//! that panic or swallow errors. Budgets only ratchet down.

use std::fs;
use std::path::Path;

struct Budget {
    pattern: &'static str,
    max: usize,
}

const BUDGETS: &[Budget] = &[
    Budget { pattern: ".unwrap()", max: 0 },
    Budget { pattern: ".expect(", max: 0 },
    Budget { pattern: "panic!(", max: 0 },
    Budget { pattern: "unreachable!(", max: 0 },
    Budget { pattern: "todo!(", max: 0 },
    Budget { pattern: "unimplemented!(", max: 0 },
    Budget { pattern: "let _ =", max: 0 },
    // Env lookup, header-to-str probes, and the reqwest cookie bridge.
    Budget { pattern: ".ok()", max: 4 },
    Budget { pattern: "#[allow(dead_code)]", max: 0 },
];

struct SourceFile {
    path: String,
    content: String,
}

fn library_sources() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect(Path::new("src"), &mut files);
    files
}

fn collect(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, out);
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        let is_rust = path.extension().is_some_and(|e| e == "rs");
        if !is_rust || path_str.ends_with("_test.rs") || path_str.ends_with("test_helpers.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

#[test]
fn library_sources_are_found() {
    let files = library_sources();
    assert!(files.iter().any(|f| f.path.ends_with("lib.rs")), "scan found no lib.rs; run from the crate root");
}

#[test]
fn pattern_budgets_hold() {
    let files = library_sources();
    let mut failures = Vec::new();

    for budget in BUDGETS {
        let found = hits(&files, budget.pattern);
        let count: usize = found.iter().map(|(_, c)| c).sum();
        if count > budget.max {
            let detail = found.iter().map(|(path, c)| format!("  {path}: {c}")).collect::<Vec<_>>().join("\n");
            failures.push(format!("`{}` budget exceeded: found {count}, max {}\n{detail}", budget.pattern, budget.max));
        }
    }

    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

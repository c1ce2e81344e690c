//! Structural tests for layer boundaries.
//!
//! These scan source files so a stray import fails the build's test run
//! rather than a code review.

use std::path::{Path, PathBuf};

fn src() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src")
}

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Track brace depth and report whether a line sits inside a `#[cfg(test)]` block.
struct CfgTestTracker {
    in_test_block: bool,
    brace_depth: i32,
    start_depth: i32,
}

impl CfgTestTracker {
    fn new() -> Self {
        Self {
            in_test_block: false,
            brace_depth: 0,
            start_depth: 0,
        }
    }

    fn process_line(&mut self, line: &str) -> bool {
        if line.trim().contains("#[cfg(test)]") {
            self.in_test_block = true;
            self.start_depth = self.brace_depth;
        }
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_test_block && self.brace_depth <= self.start_depth {
                        self.in_test_block = false;
                    }
                }
                _ => {}
            }
        }
        self.in_test_block
    }
}

/// `(relative path, line number, line)` for every non-test, non-comment line
/// under `dir` matching `pred`.
fn find_lines(dir: &Path, pred: impl Fn(&str) -> bool) -> Vec<String> {
    let mut hits = Vec::new();
    for file in collect_rs_files(dir) {
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        let rel = file
            .strip_prefix(env!("CARGO_MANIFEST_DIR"))
            .unwrap_or(&file)
            .display()
            .to_string();
        let mut tracker = CfgTestTracker::new();
        for (i, line) in content.lines().enumerate() {
            let in_test = tracker.process_line(line);
            let trimmed = line.trim();
            if in_test || trimmed.starts_with("//") {
                continue;
            }
            if pred(line) {
                hits.push(format!("{rel}:{}: {trimmed}", i + 1));
            }
        }
    }
    hits
}

#[test]
fn domain_is_free_of_io_and_outer_layers() {
    let forbidden = [
        "crate::infra",
        "crate::application",
        "crate::commands",
        "crate::output",
        "tokio",
        "reqwest",
        "std::fs",
        "std::net",
        "println!",
    ];
    let hits = find_lines(&src().join("domain"), |l| {
        forbidden.iter().any(|f| l.contains(f))
    });
    assert!(hits.is_empty(), "domain/ must stay pure:\n{}", hits.join("\n"));
}

#[test]
fn application_depends_only_on_domain_and_ports() {
    let hits = find_lines(&src().join("application"), |l| {
        l.contains("crate::infra") || l.contains("crate::commands") || l.contains("crate::output")
    });
    assert!(
        hits.is_empty(),
        "application/ must not import infra, commands, or output:\n{}",
        hits.join("\n")
    );
}

#[test]
fn infra_has_no_imports_from_commands_or_output() {
    let hits = find_lines(&src().join("infra"), |l| {
        l.contains("crate::commands") || l.contains("crate::output")
    });
    assert!(
        hits.is_empty(),
        "infra/ must not import from commands/ or output/:\n{}",
        hits.join("\n")
    );
}

#[test]
fn only_output_and_commands_print() {
    let mut hits = Vec::new();
    for layer in ["domain", "application", "infra"] {
        hits.extend(find_lines(&src().join(layer), |l| {
            l.contains("println!") || l.contains("eprintln!")
        }));
    }
    assert!(
        hits.is_empty(),
        "print through ProgressReporter or the renderer instead:\n{}",
        hits.join("\n")
    );
}

#[test]
fn no_inline_json_branching_in_commands() {
    let hits = find_lines(&src().join("commands"), |l| {
        let t = l.trim();
        l.contains("json: bool") || t.starts_with("if json") || t.starts_with("if app.is_json()")
    });
    assert!(
        hits.is_empty(),
        "use app.renderer() instead of branching on JSON mode:\n{}",
        hits.join("\n")
    );
}

#[test]
fn secrets_are_never_logged() {
    let hits = find_lines(&src(), |l| {
        let logs = ["debug!(", "info!(", "warn!(", "error!(", "trace!("]
            .iter()
            .any(|m| l.contains(m));
        logs && (l.contains("secret()") || l.contains("password") || l.contains(".pass"))
    });
    assert!(hits.is_empty(), "tracing events must not carry secrets:\n{}", hits.join("\n"));
}

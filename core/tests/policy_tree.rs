//! Policy validator over a real on-disk script tree.

use guardrail_core::policy::{discover_scripts, validate_tree, PolicyOptions, RuleKind};

const COMPLIANT: &str = "#!/bin/sh\n# @since 2026-01-10\n# @version 1.2.0\n# flags: --dry-run --yes --format --log-level --cwd\necho running\n";

fn write(dir: &std::path::Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[test]
fn discovery_is_deterministic_and_recursive() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "b.sh", COMPLIANT);
    write(dir.path(), "nested/a.sh", COMPLIANT);
    write(dir.path(), "release.mjs", COMPLIANT);
    write(dir.path(), "notes.txt", "not a script");

    let found = discover_scripts(dir.path()).unwrap();
    let names: Vec<String> = found
        .iter()
        .map(|p| {
            p.strip_prefix(dir.path())
                .unwrap()
                .to_string_lossy()
                .to_string()
        })
        .collect();
    assert_eq!(names, vec!["b.sh", "nested/a.sh", "release.mjs"]);
}

#[test]
fn clean_tree_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "deploy.sh", COMPLIANT);

    let report = validate_tree(dir.path(), &PolicyOptions::default()).unwrap();
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.scripts.len(), 1);
}

#[test]
fn missing_version_tag_exits_eleven() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "deploy.sh",
        "#!/bin/sh\n# @since 2026-01-10\n# flags: --dry-run --yes --format --log-level --cwd\necho hi\n",
    );

    let report = validate_tree(dir.path(), &PolicyOptions::default()).unwrap();
    assert_eq!(report.exit_code(), 11);
    assert!(report.scripts[0]
        .issues
        .iter()
        .any(|i| i.message == "Missing @version tag in header"));
}

#[test]
fn dangerous_pattern_exits_thirteen_not_eleven() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "deploy.sh",
        "#!/bin/sh\n# @since 2026-01-10\n# @version 1.0.0\n# flags: --dry-run --yes --format --log-level --cwd\neval \"$1\"\n",
    );

    let report = validate_tree(dir.path(), &PolicyOptions::default()).unwrap();
    assert!(report.has_unsafe());
    assert_eq!(report.exit_code(), 13);
}

#[test]
fn unreadable_script_is_reported_without_aborting_the_tree() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "deploy.sh", COMPLIANT);
    // Not valid UTF-8, so reading it as text fails.
    std::fs::write(dir.path().join("binary.sh"), [0xff, 0xfe, 0x00, 0x1b]).unwrap();

    let report = validate_tree(dir.path(), &PolicyOptions::default()).unwrap();
    assert_eq!(report.scripts.len(), 2);

    let broken = report
        .scripts
        .iter()
        .find(|s| s.path.ends_with("binary.sh"))
        .unwrap();
    assert_eq!(broken.issues.len(), 1);
    assert_eq!(broken.issues[0].rule, RuleKind::Read);
    assert!(broken.issues[0].message.starts_with("cannot read script:"));

    // The readable script was still validated and is clean.
    let ok = report
        .scripts
        .iter()
        .find(|s| s.path.ends_with("deploy.sh"))
        .unwrap();
    assert!(ok.issues.is_empty());
    assert_eq!(report.exit_code(), 11);
}

#[test]
fn filters_restrict_checked_scripts() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "deploy.sh", COMPLIANT);
    write(dir.path(), "broken.sh", "echo no header\n");

    let opts = PolicyOptions {
        filters: vec!["deploy".to_string()],
        ..PolicyOptions::default()
    };
    let report = validate_tree(dir.path(), &opts).unwrap();
    assert_eq!(report.scripts.len(), 1);
    assert_eq!(report.exit_code(), 0);
}

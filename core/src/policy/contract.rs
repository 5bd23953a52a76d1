use lazy_static::lazy_static;
use regex::Regex;

use super::{RuleKind, ValidationIssue};

/// Every script must textually declare these five flags: preview mode,
/// explicit confirmation, output format, log level, working directory.
const CANONICAL_FLAGS: [&str; 5] = ["--dry-run", "--yes", "--format", "--log-level", "--cwd"];

lazy_static! {
    // Blocking line reads and interactive question helpers, shell or JS.
    static ref INTERACTIVE: Regex = Regex::new(
        r"(?m)(^\s*read\s+-[a-zA-Z]*[rp]\b|\breadline\s*\(|\bprompt\s*\(|\binquirer\.)"
    )
    .unwrap();
}

/// Shared library modules are exempt from the flag requirement (they have no
/// CLI surface of their own) but never from the interactive-prompt ban.
fn is_library(path: &str) -> bool {
    path.split('/').any(|seg| seg == "lib") || path.contains(".lib.")
}

pub(crate) fn check_contract(path: &str, source: &str, issues: &mut Vec<ValidationIssue>) {
    if !is_library(path) {
        for flag in CANONICAL_FLAGS {
            if !source.contains(flag) {
                issues.push(ValidationIssue::error(
                    RuleKind::Contract,
                    format!("Missing required CLI flag declaration '{flag}'"),
                ));
            }
        }
    }

    for hit in INTERACTIVE.find_iter(source) {
        issues.push(ValidationIssue::error(
            RuleKind::Contract,
            format!(
                "Interactive prompt '{}' breaks unattended execution",
                hit.as_str().trim()
            ),
        ));
    }
}

use lazy_static::lazy_static;
use regex::Regex;

use super::{RuleKind, ValidationIssue};

const MAX_TOTAL_LINES: usize = 300;
const MAX_BLOCK_LINES: usize = 60;

lazy_static! {
    // Function-like block openers for shell and JS sources.
    static ref FUNC_START: Regex = Regex::new(
        r"^\s*(function\s+[A-Za-z_]\w*|[A-Za-z_]\w*\s*\(\)\s*\{|(async\s+)?function\s*\(|const\s+[A-Za-z_]\w*\s*=\s*(async\s*)?\([^)]*\)\s*=>\s*\{)"
    )
    .unwrap();
}

/// Size compliance: warnings only, never errors.
pub(crate) fn check_size(source: &str, issues: &mut Vec<ValidationIssue>) {
    let lines: Vec<&str> = source.lines().collect();

    if lines.len() > MAX_TOTAL_LINES {
        issues.push(ValidationIssue::warning(
            RuleKind::Size,
            format!("script has {} lines (>{MAX_TOTAL_LINES})", lines.len()),
        ));
    }

    let mut i = 0;
    while i < lines.len() {
        if !FUNC_START.is_match(lines[i]) {
            i += 1;
            continue;
        }

        // Walk brace depth from the opening line to the block's close.
        let mut depth: i64 = 0;
        let mut opened = false;
        let mut j = i;
        while j < lines.len() {
            for ch in lines[j].chars() {
                match ch {
                    '{' => {
                        depth += 1;
                        opened = true;
                    }
                    '}' => depth -= 1,
                    _ => {}
                }
            }
            if opened && depth <= 0 {
                break;
            }
            j += 1;
        }

        let span = j.saturating_sub(i) + 1;
        if span > MAX_BLOCK_LINES {
            issues.push(ValidationIssue::warning(
                RuleKind::Size,
                format!("function block at line {} spans {span} lines (>{MAX_BLOCK_LINES})", i + 1),
            ));
        }
        i = j + 1;
    }
}

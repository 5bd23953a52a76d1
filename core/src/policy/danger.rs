use lazy_static::lazy_static;
use regex::Regex;

use super::{RuleKind, ValidationIssue};

lazy_static! {
    static ref SUDO: Regex = Regex::new(r"(^|[;&|]\s*|\s)sudo\s").unwrap();
    // The rm invocation up to the next command separator; flags and target
    // are tokenized afterwards so split and long-form flags still count.
    static ref RM_CMD: Regex = Regex::new(r"\brm\s+([^|;&><]+)").unwrap();
    static ref EVAL: Regex = Regex::new(r"(\beval\s|\beval\s*\()").unwrap();
    static ref SECRET_ENV: Regex = Regex::new(
        r"(\$\{?|process\.env\.)[A-Z0-9_]*(TOKEN|SECRET|KEY|PASSWORD)[A-Z0-9_]*"
    )
    .unwrap();
    // Raw invocations with a sanctioned wrapper available.
    static ref RAW_GH_API: Regex = Regex::new(r"\bgh\s+api\s").unwrap();
    static ref RAW_CHILD_PROCESS: Regex =
        Regex::new(r"child_process|execSync\s*\(").unwrap();
}

fn is_temp_path(target: &str) -> bool {
    let trimmed = target.trim_matches(|c| c == '"' || c == '\'');
    trimmed.starts_with("/tmp/")
        || trimmed.starts_with("$TMPDIR")
        || trimmed.starts_with("${TMPDIR")
}

/// The first deletion target when the line runs `rm` with both recursive and
/// force semantics, in any flag spelling (`-rf`, `-fr`, `-r -f`,
/// `--recursive --force`, flags after the target).
fn forced_recursive_target(line: &str) -> Option<String> {
    let rest = RM_CMD.captures(line)?.get(1)?.as_str();

    let mut recursive = false;
    let mut force = false;
    let mut target: Option<&str> = None;
    for token in rest.split_whitespace() {
        match token {
            "--recursive" => recursive = true,
            "--force" => force = true,
            _ if token.starts_with("--") => {}
            _ => {
                if let Some(flags) = token.strip_prefix('-') {
                    recursive |= flags.contains('r') || flags.contains('R');
                    force |= flags.contains('f');
                } else {
                    target.get_or_insert(token);
                }
            }
        }
    }

    if recursive && force {
        Some(target.unwrap_or("").to_string())
    } else {
        None
    }
}

/// Dangerous-pattern rule: everything flagged here is an error, and its
/// presence switches the process exit code from 11 to 13.
pub(crate) fn check_danger(source: &str, issues: &mut Vec<ValidationIssue>) {
    let mut push = |line_no: usize, message: String| {
        issues.push(ValidationIssue::error(
            RuleKind::Danger,
            format!("line {line_no}: {message}"),
        ));
    };

    for (i, line) in source.lines().enumerate() {
        let line_no = i + 1;
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') || trimmed.starts_with("//") {
            continue;
        }

        if SUDO.is_match(line) {
            push(line_no, "elevated-privilege invocation (sudo)".to_string());
        }
        if let Some(target) = forced_recursive_target(line) {
            if !is_temp_path(&target) {
                push(
                    line_no,
                    format!("recursive forced deletion of '{target}'"),
                );
            }
        }
        if EVAL.is_match(line) {
            push(line_no, "dynamic code execution (eval)".to_string());
        }
        if let Some(hit) = SECRET_ENV.find(line) {
            push(
                line_no,
                format!("raw access to secret-looking variable '{}'", hit.as_str()),
            );
        }
        if RAW_GH_API.is_match(line) {
            push(
                line_no,
                "raw 'gh api' call, use the sanctioned hosting wrapper".to_string(),
            );
        }
        if RAW_CHILD_PROCESS.is_match(line) {
            push(
                line_no,
                "direct subprocess invocation, use the sanctioned runner wrapper".to_string(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(source: &str) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        check_danger(source, &mut issues);
        issues
    }

    #[test]
    fn eval_is_flagged_with_line_number() {
        let issues = check("echo ok\neval \"$payload\"\n");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.starts_with("line 2:"));
        assert!(issues[0].message.contains("eval"));
    }

    #[test]
    fn sudo_and_rm_rf_are_flagged() {
        let issues = check("sudo rm -rf /opt/data\n");
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn split_and_long_form_rm_flags_are_flagged() {
        for line in [
            "rm -r -f /opt/data\n",
            "rm -f -r /opt/data\n",
            "rm --recursive --force /opt/data\n",
            "rm --force --recursive /opt/data\n",
            "rm /opt/data -rf\n",
        ] {
            let issues = check(line);
            assert_eq!(issues.len(), 1, "expected a finding for {line:?}");
            assert!(issues[0].message.contains("/opt/data"));
        }
    }

    #[test]
    fn plain_rm_is_not_flagged() {
        assert!(check("rm -f stale.lock\n").is_empty());
        assert!(check("rm --recursive build/\n").is_empty());
    }

    #[test]
    fn temp_path_deletion_is_tolerated() {
        assert!(check("rm -rf /tmp/guardrail-scratch\n").is_empty());
        assert!(check("rm -rf \"$TMPDIR/scratch\"\n").is_empty());
    }

    #[test]
    fn secret_env_access_is_flagged() {
        let issues = check("curl -H \"Authorization: $GITHUB_TOKEN\"\n");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("GITHUB_TOKEN"));

        let issues = check("const t = process.env.NPM_SECRET;\n");
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn raw_gh_api_and_child_process_are_flagged() {
        assert_eq!(check("gh api repos/{owner}/{repo}/pulls\n").len(), 1);
        assert_eq!(check("const cp = require('child_process');\n").len(), 1);
    }

    #[test]
    fn comments_are_ignored() {
        assert!(check("# do not use eval here\n// sudo is banned\n").is_empty());
    }
}

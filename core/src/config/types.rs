use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GuardrailError;

/// Supported config file schema version.
pub const CONFIG_VERSION: u32 = 1;

/// The fixed lifecycle vocabulary. Any status outside this list is a
/// violation regardless of what the other side of a comparison says.
pub const CANONICAL_STATUSES: [&str; 7] = [
    "Draft",
    "Ticketed",
    "Branched",
    "PR Open",
    "In Review",
    "Merged",
    "Archived",
];

/// On-disk shape of `guardrail.toml`. Patterns are kept as strings here and
/// compiled exactly once into a [`LifecycleConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub version: u32,
    pub branch_pattern: String,
    pub commit_pattern: String,
    pub pr_title_pattern: String,
    pub protected_branches: Vec<String>,
    pub artifacts_dir: String,
    pub scripts_root: String,
    pub run: RunDefaults,
    pub logging: LoggingConfig,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            // type/ID-slug, e.g. feature/142-report-envelope
            branch_pattern: r"^(feature|fix|chore|docs|refactor|test)/(\d+)-[a-z0-9][a-z0-9-]*$"
                .to_string(),
            // [ID-slug] message, e.g. [142-report-envelope] tighten exit codes
            commit_pattern: r"^\[(\d+)-[a-z0-9][a-z0-9-]*\] .+$".to_string(),
            // [ID] Title, e.g. [142] Tighten exit codes
            pr_title_pattern: r"^\[(\d+)\] (.+)$".to_string(),
            protected_branches: vec![
                "main".to_string(),
                "master".to_string(),
                "develop".to_string(),
                "HEAD".to_string(),
            ],
            artifacts_dir: ".lifecycle".to_string(),
            scripts_root: "scripts".to_string(),
            run: RunDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunDefaults {
    /// Worker count for parallel scope runs.
    pub concurrency: usize,
    /// Lines kept per captured task output before elision.
    pub output_line_limit: usize,
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self {
            concurrency: 3,
            output_line_limit: 40,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub level: String,
    pub console: bool,
    pub file: bool,
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            console: true,
            file: false,
            directory: None,
        }
    }
}

/// Shared lifecycle configuration, loaded once and immutable for the run.
/// All patterns are pre-compiled; callers never re-parse regex sources.
#[derive(Debug)]
pub struct LifecycleConfig {
    pub branch_pattern: Regex,
    pub commit_pattern: Regex,
    pub pr_title_pattern: Regex,
    pub protected_branches: Vec<String>,
    pub statuses: Vec<String>,
    pub artifacts_dir: String,
    pub scripts_root: String,
    pub run: RunDefaults,
    pub logging: LoggingConfig,
}

impl LifecycleConfig {
    pub fn from_file(file: ConfigFile) -> Result<Self, GuardrailError> {
        if file.version != CONFIG_VERSION {
            return Err(GuardrailError::Config(format!(
                "unsupported config version {} (expected {})",
                file.version, CONFIG_VERSION
            )));
        }

        let compile = |name: &str, src: &str| {
            Regex::new(src)
                .map_err(|e| GuardrailError::Config(format!("invalid {name} pattern: {e}")))
        };

        Ok(Self {
            branch_pattern: compile("branch", &file.branch_pattern)?,
            commit_pattern: compile("commit", &file.commit_pattern)?,
            pr_title_pattern: compile("pr_title", &file.pr_title_pattern)?,
            protected_branches: file.protected_branches,
            statuses: CANONICAL_STATUSES.iter().map(|s| s.to_string()).collect(),
            artifacts_dir: file.artifacts_dir,
            scripts_root: file.scripts_root,
            run: file.run,
            logging: file.logging,
        })
    }

    pub fn is_protected_branch(&self, name: &str) -> bool {
        self.protected_branches.iter().any(|b| b == name)
    }

    pub fn is_canonical_status(&self, status: &str) -> bool {
        self.statuses.iter().any(|s| s == status)
    }

    /// The artifact ID embedded in a branch name, when the branch matches
    /// the configured pattern.
    pub fn branch_id(&self, branch: &str) -> Option<String> {
        self.branch_pattern
            .captures(branch)
            .and_then(|c| c.get(2))
            .map(|m| m.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_compiles() {
        let cfg = LifecycleConfig::from_file(ConfigFile::default()).unwrap();
        assert!(cfg.branch_pattern.is_match("feature/142-report-envelope"));
        assert!(!cfg.branch_pattern.is_match("feature/report-envelope"));
        assert!(cfg.commit_pattern.is_match("[142-report-envelope] tighten exit codes"));
        assert!(cfg.pr_title_pattern.is_match("[142] Tighten exit codes"));
        assert_eq!(cfg.statuses.len(), 7);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let file = ConfigFile {
            version: 99,
            ..ConfigFile::default()
        };
        let err = LifecycleConfig::from_file(file).unwrap_err();
        assert!(err.to_string().contains("unsupported config version"));
    }

    #[test]
    fn branch_id_extraction() {
        let cfg = LifecycleConfig::from_file(ConfigFile::default()).unwrap();
        assert_eq!(cfg.branch_id("fix/17-flaky-retry"), Some("17".to_string()));
        assert_eq!(cfg.branch_id("main"), None);
    }
}

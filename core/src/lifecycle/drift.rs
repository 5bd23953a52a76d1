//! Lifecycle drift detection.
//!
//! Compares a locally declared lifecycle status against the externally
//! tracked one for the same artifact id. A status outside the canonical
//! 7-state vocabulary is itself a violation, even when both sides agree.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::LifecycleConfig;
use crate::error::{GuardrailError, EXIT_NAMING, EXIT_OK};

use super::hosting::HostingProvider;

/// One artifact under drift inspection.
#[derive(Debug, Clone)]
pub struct LifecycleArtifact {
    pub id: String,
    pub local_status: String,
    pub external_status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DriftFinding {
    pub id: String,
    pub local_status: Option<String>,
    pub external_status: Option<String>,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DriftReport {
    pub checked: usize,
    pub findings: Vec<DriftFinding>,
}

impl DriftReport {
    pub fn exit_code(&self) -> i32 {
        if self.findings.is_empty() {
            EXIT_OK
        } else {
            EXIT_NAMING
        }
    }

    pub fn render_json(&self) -> serde_json::Value {
        json!({
            "ok": self.findings.is_empty(),
            "checked": self.checked,
            "findings": self.findings,
        })
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for f in &self.findings {
            out.push_str(&format!(
                "{}: local '{}', external '{}'\n",
                f.id,
                f.local_status.as_deref().unwrap_or("<none>"),
                f.external_status.as_deref().unwrap_or("<none>")
            ));
            for reason in &f.reasons {
                out.push_str(&format!("  {reason}\n"));
            }
        }
        out.push_str(&format!(
            "{} artifact(s) checked, {} flagged\n",
            self.checked,
            self.findings.len()
        ));
        out
    }
}

/// Flag an artifact whose statuses drift or fall outside the vocabulary.
pub fn check_artifact(cfg: &LifecycleConfig, artifact: &LifecycleArtifact) -> Option<DriftFinding> {
    let mut reasons = Vec::new();

    if !cfg.is_canonical_status(&artifact.local_status) {
        reasons.push(format!(
            "local status '{}' is not in the canonical vocabulary",
            artifact.local_status
        ));
    }

    match &artifact.external_status {
        Some(external) => {
            if !cfg.is_canonical_status(external) {
                reasons.push(format!(
                    "external status '{external}' is not in the canonical vocabulary"
                ));
            }
            if external != &artifact.local_status {
                reasons.push(format!(
                    "drift: local '{}' vs external '{external}'",
                    artifact.local_status
                ));
            }
        }
        None => reasons.push("no externally tracked status".to_string()),
    }

    if reasons.is_empty() {
        return None;
    }
    Some(DriftFinding {
        id: artifact.id.clone(),
        local_status: Some(artifact.local_status.clone()),
        external_status: artifact.external_status.clone(),
        reasons,
    })
}

#[derive(Debug, Deserialize)]
struct ArtifactFile {
    status: String,
}

/// Load locally declared statuses from `<artifacts_dir>/<id>.toml` files.
pub fn load_local_statuses(dir: &Path) -> Result<Vec<(String, String)>, GuardrailError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    entries.sort();

    let mut out = Vec::new();
    for path in entries {
        let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let raw = std::fs::read_to_string(&path)?;
        let file: ArtifactFile = toml::from_str(&raw).map_err(|e| {
            GuardrailError::Config(format!("malformed artifact file {}: {e}", path.display()))
        })?;
        out.push((id.to_string(), file.status));
    }
    Ok(out)
}

/// Run drift detection over the locally declared artifacts, restricted to
/// `ids` when non-empty. A requested id with no local artifact file is a
/// finding of its own, so a typo'd id cannot pass silently.
pub async fn run(
    cfg: &LifecycleConfig,
    hosting: &dyn HostingProvider,
    ids: &[String],
) -> Result<DriftReport, GuardrailError> {
    let local = load_local_statuses(Path::new(&cfg.artifacts_dir))?;

    let mut checked = 0usize;
    let mut findings = Vec::new();
    for (id, local_status) in &local {
        if !ids.is_empty() && !ids.contains(id) {
            continue;
        }
        checked += 1;
        let external_status = hosting.tracked_status(id).await?;
        let artifact = LifecycleArtifact {
            id: id.clone(),
            local_status: local_status.clone(),
            external_status,
        };
        if let Some(finding) = check_artifact(cfg, &artifact) {
            findings.push(finding);
        }
    }

    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if local.iter().any(|(known, _)| known == id) || !seen.insert(id) {
            continue;
        }
        checked += 1;
        findings.push(DriftFinding {
            id: id.clone(),
            local_status: None,
            external_status: None,
            reasons: vec!["no local artifact declares this id".to_string()],
        });
    }

    Ok(DriftReport { checked, findings })
}

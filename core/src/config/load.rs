use std::path::Path;

use super::types::{ConfigFile, LifecycleConfig};

/// Load the lifecycle configuration.
///
/// Priority: `GUARDRAIL_CONFIG` env override, then `./guardrail.toml`, then
/// built-in defaults. The result is compiled once and treated as read-only
/// for the rest of the process.
pub fn load_default() -> anyhow::Result<LifecycleConfig> {
    if let Ok(path) = std::env::var("GUARDRAIL_CONFIG") {
        if !path.trim().is_empty() {
            return load_from_path(Path::new(&path));
        }
    }

    let local = Path::new("guardrail.toml");
    let file = if local.exists() {
        let s = std::fs::read_to_string(local)?;
        toml::from_str::<ConfigFile>(&s)?
    } else {
        ConfigFile::default()
    };

    Ok(LifecycleConfig::from_file(file)?)
}

pub fn load_from_path(path: &Path) -> anyhow::Result<LifecycleConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read config {}: {e}", path.display()))?;
    let file = toml::from_str::<ConfigFile>(&s)?;
    Ok(LifecycleConfig::from_file(file)?)
}

//! Glide configuration file handling
//!
//! Motion settings live in `glide.toml`. A missing file means defaults; a
//! file that exists but does not parse is an error.

use anyhow::{Context, Result};
use glide_animation::MotionConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_FILE: &str = "glide.toml";

/// Load the motion config
///
/// An explicit `path` must exist. Without one, `glide.toml` in the current
/// directory is used if present.
pub fn load(path: Option<&Path>) -> Result<MotionConfig> {
    let path = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file {} does not exist", path.display());
            }
            path.to_path_buf()
        }
        None => {
            let default = PathBuf::from(CONFIG_FILE);
            if !default.exists() {
                debug!("no {} found, using defaults", CONFIG_FILE);
                return Ok(MotionConfig::default());
            }
            default
        }
    };
    load_from_file(&path)
}

pub fn load_from_file(path: &Path) -> Result<MotionConfig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config: MotionConfig =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    info!("Loaded motion config from {}", path.display());
    Ok(config)
}

pub fn to_toml(config: &MotionConfig) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize motion config")
}

/// Write the default config to `path`, refusing to overwrite unless `force`
pub fn write_default(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        );
    }
    let content = format!(
        "# Glide motion configuration\n\n{}",
        to_toml(&MotionConfig::default())?
    );
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_load_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        write_default(&path, false).unwrap();
        assert_eq!(load(Some(&path)).unwrap(), MotionConfig::default());

        // Refuses to overwrite without force
        assert!(write_default(&path, false).is_err());
        write_default(&path, true).unwrap();
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[trigger]\nthreshold = \"high\"\n").unwrap();
        let err = load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}

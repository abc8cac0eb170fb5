//! Configuration loading, root folder resolution, and catalog files

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default HTTP port for the submission service
pub const DEFAULT_PORT: u16 = 5730;

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "evq.db";

/// Catalog file name inside the root folder (tiers and questions)
pub const CATALOG_FILE: &str = "catalog.toml";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>, env_var_name: &str) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Get default configuration file path for the platform
fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/evq/config.toml first, then /etc/evq/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("evq").join("config.toml"));
        let system_config = PathBuf::from("/etc/evq/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else if cfg!(target_os = "macos") || cfg!(target_os = "windows") {
        let path = dirs::config_dir()
            .map(|d| d.join("evq").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    } else {
        Err(Error::Config("Unsupported platform".to_string()))
    }
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("evq"))
        .unwrap_or_else(|| PathBuf::from("./evq_data"))
}

/// Database path inside the resolved root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

// ============================================================================
// Catalog file (admin-configured tiers and questions)
// ============================================================================

/// Admin-configured classification catalog, loaded from TOML and
/// applied to the database at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub tiers: Vec<TierEntry>,
    #[serde(default)]
    pub questions: Vec<QuestionEntry>,
}

/// One classification tier: lower weight = higher precedence when flagged,
/// highest weight = the default tier.
#[derive(Debug, Clone, Deserialize)]
pub struct TierEntry {
    pub id: String,
    pub weight: i64,
}

/// One yes/no question, owned by exactly one tier.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionEntry {
    pub id: String,
    pub label: String,
    pub tier: String,
}

impl CatalogFile {
    /// Load and validate a catalog file.
    ///
    /// Every question must reference a declared tier; a dangling reference
    /// is a configuration error, not something to discover at request time.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog: CatalogFile = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid catalog file {:?}: {}", path, e)))?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        for question in &self.questions {
            if !self.tiers.iter().any(|t| t.id == question.tier) {
                return Err(Error::Config(format!(
                    "Question '{}' references unknown tier '{}'",
                    question.id, question.tier
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_parses_tiers_and_questions() {
        let toml_src = r#"
            [[tiers]]
            id = "class_one"
            weight = 0

            [[tiers]]
            id = "class_three"
            weight = 20

            [[questions]]
            id = "q_road_closure"
            label = "Does the event require road closures?"
            tier = "class_one"
        "#;
        let catalog: CatalogFile = toml::from_str(toml_src).unwrap();
        assert_eq!(catalog.tiers.len(), 2);
        assert_eq!(catalog.questions.len(), 1);
        assert_eq!(catalog.questions[0].tier, "class_one");
        catalog.validate().unwrap();
    }

    #[test]
    fn catalog_rejects_dangling_tier_reference() {
        let toml_src = r#"
            [[tiers]]
            id = "class_one"
            weight = 0

            [[questions]]
            id = "q_fireworks"
            label = "Will there be fireworks?"
            tier = "no_such_tier"
        "#;
        let catalog: CatalogFile = toml::from_str(toml_src).unwrap();
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn cli_arg_takes_priority() {
        let root = resolve_root_folder(Some("/tmp/evq-cli-root"), "EVQ_TEST_UNSET_VAR");
        assert_eq!(root, PathBuf::from("/tmp/evq-cli-root"));
    }

    #[test]
    fn resolution_always_produces_a_root_folder() {
        // With no CLI arg, no env var, and (on an unknown platform) no
        // config file, resolution still lands on the compiled default.
        let root = resolve_root_folder(None, "EVQ_TEST_UNSET_VAR_FALLBACK");
        assert!(!root.as_os_str().is_empty());
    }
}

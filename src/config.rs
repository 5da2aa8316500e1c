//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/onboard/onboard.toml`
//! 3. Local config: `<draft_dir>/.onboard.toml` (next to the draft being edited)
//! 4. Environment variables: `ONBOARD_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{AmenityCatalog, FlowVariant};

/// Unified configuration for onboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Amenity catalog rooms may pick from
    pub amenities: Vec<String>,
    /// Flow variant used when none is given on the command line
    pub flow: FlowVariant,
    /// Directory receiving saved submission echoes
    pub output_dir: PathBuf,
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Name reported as the acting principal
    pub operator: String,
}

/// Raw settings for intermediate parsing (Option to detect "not specified").
///
/// Used during layered config merging to distinguish between:
/// - `None` → field not specified, inherit from base
/// - `Some([])` → explicit empty array
/// - `Some([...])` → explicit values to merge
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub amenities: Option<Vec<String>>,
    pub flow: Option<FlowVariant>,
    pub output_dir: Option<PathBuf>,
    pub pretty: Option<bool>,
    pub operator: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let operator = std::env::var("USER").unwrap_or_else(|_| "admin".into());

        Self {
            amenities: AmenityCatalog::DEFAULT_AMENITIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            flow: FlowVariant::Onboarding,
            output_dir: default_output_dir(),
            pretty: true,
            operator,
        }
    }
}

/// Default output directory (~/.onboard/submissions).
fn default_output_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".onboard").join("submissions"))
        .unwrap_or_else(|| PathBuf::from("~/.onboard/submissions"))
}

/// Get the XDG config directory for onboard.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "onboard").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("onboard.toml"))
}

/// Get the path to the local config file in a draft directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".onboard.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are added to base, keeping base order
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Duplicates are de-duplicated
    ///
    /// # Examples
    /// ```ignore
    /// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
    /// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let removed: HashSet<&str> = overlay
            .iter()
            .filter_map(|p| p.strip_prefix('!'))
            .collect();
        let mut result: Vec<String> = Vec::new();
        for item in base.iter().chain(overlay.iter().filter(|p| !p.starts_with('!'))) {
            if !removed.contains(item.as_str()) && !result.contains(item) {
                result.push(item.clone());
            }
        }
        result
    }

    /// The amenity catalog built from `amenities`.
    pub fn catalog(&self) -> AmenityCatalog {
        AmenityCatalog::new(self.amenities.iter().cloned())
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let raw = self.output_dir.to_string_lossy().to_string();
        let expanded = shellexpand::full(&raw)
            .map(|s| s.into_owned())
            .unwrap_or(raw);
        self.output_dir = PathBuf::from(expanded);
    }

    /// Merge overlay config onto self (base) with union semantics for arrays.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            amenities: overlay
                .amenities
                .as_ref()
                .map(|o| Self::merge_array(&self.amenities, o))
                .unwrap_or_else(|| self.amenities.clone()),
            ..self.apply_scalars(overlay)
        }
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    ///
    /// Defaults are just examples. Global config defines the real baseline.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            amenities: global
                .amenities
                .clone()
                .unwrap_or_else(|| self.amenities.clone()),
            ..self.apply_scalars(global)
        }
    }

    fn apply_scalars(&self, overlay: &RawSettings) -> Self {
        Self {
            amenities: self.amenities.clone(),
            flow: overlay.flow.unwrap_or(self.flow),
            output_dir: overlay
                .output_dir
                .clone()
                .unwrap_or_else(|| self.output_dir.clone()),
            pretty: overlay.pretty.unwrap_or(self.pretty),
            operator: overlay
                .operator
                .clone()
                .unwrap_or_else(|| self.operator.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a local `.onboard.toml`
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE (global defines the real baseline)
    /// - Global → Local: UNION with negation support
    /// - Any → Env vars: REPLACE (explicit user override)
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply ONBOARD_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("ONBOARD")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("amenities")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get::<Vec<String>>("amenities") {
            settings.amenities = val;
        }
        if let Ok(val) = config.get::<FlowVariant>("flow") {
            settings.flow = val;
        }
        if let Ok(val) = config.get_string("output_dir") {
            settings.output_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_bool("pretty") {
            settings.pretty = val;
        }
        if let Ok(val) = config.get_string("operator") {
            settings.operator = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# onboard configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/onboard/onboard.toml  (defines your baseline)
#   Local:  <draft_dir>/.onboard.toml       (additions for drafts in that directory)
#   Env:    ONBOARD_* environment variables (explicit overrides)
#
# Array Merge Semantics:
#   Global config REPLACES compiled defaults.
#   Local config UNIONS with global.
#   Use "!name" in local config to REMOVE an inherited item:
#     amenities = ["Sauna", "!Mini Bar"]

# Amenity catalog rooms can pick from
# amenities = ["Wi-Fi", "Air Conditioning", "Heating", "Television", "Private Bathroom"]

# Default flow: "onboarding" (capacity follows room type) or "standalone-branch"
# flow = "onboarding"

# Where `onboard submit --save` writes the server echo
# output_dir = "~/.onboard/submissions"

# Pretty-print JSON output
# pretty = true

# Name reported as the acting principal
# operator = "admin"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load(None).expect("load defaults");
        assert!(settings.amenities.contains(&"Wi-Fi".to_string()));
        assert!(!settings.operator.is_empty());
    }

    #[test]
    fn given_tilde_in_output_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            output_dir: PathBuf::from("~/.onboard/out"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let out = settings.output_dir.to_string_lossy();
        assert!(out.starts_with(&home), "output_dir should start with home dir: {}", out);
        assert!(!out.contains('~'));
    }

    #[test]
    fn test_merge_array_union() {
        let base = vec!["a".to_string(), "b".to_string()];
        let overlay = vec!["c".to_string()];
        let result = Settings::merge_array(&base, &overlay);

        assert_eq!(result, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_merge_array_negation() {
        let base = vec!["a".to_string(), "b".to_string()];
        let overlay = vec!["!a".to_string(), "c".to_string()];
        let result = Settings::merge_array(&base, &overlay);

        assert_eq!(result, vec!["b", "c"]);
    }

    #[test]
    fn test_merge_array_duplicates() {
        let base = vec!["a".to_string(), "b".to_string()];
        let overlay = vec!["a".to_string(), "c".to_string()];
        let result = Settings::merge_array(&base, &overlay);

        assert_eq!(result, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_apply_global_replaces_amenities() {
        let base = Settings::default();
        let global = RawSettings {
            amenities: Some(vec!["Sauna".to_string()]),
            pretty: Some(false),
            ..RawSettings::default()
        };

        let result = base.apply_global(&global);

        assert_eq!(result.amenities, vec!["Sauna".to_string()]);
        assert!(!result.pretty);
        assert_eq!(result.flow, base.flow);
    }

    #[test]
    fn test_merge_with_unions_amenities() {
        let base = Settings {
            amenities: vec!["Wi-Fi".to_string(), "Mini Bar".to_string()],
            ..Settings::default()
        };
        let local = RawSettings {
            amenities: Some(vec!["Sauna".to_string(), "!Mini Bar".to_string()]),
            flow: Some(FlowVariant::StandaloneBranch),
            ..RawSettings::default()
        };

        let result = base.merge_with(&local);

        assert_eq!(result.amenities, vec!["Wi-Fi".to_string(), "Sauna".to_string()]);
        assert_eq!(result.flow, FlowVariant::StandaloneBranch);
    }
}

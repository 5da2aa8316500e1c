//! Integration tests for Settings config loading with layered merge semantics.
//!
//! Merge Semantics:
//! - Defaults → Global: REPLACE (global defines the real baseline)
//! - Global → Local: UNION with negation support (draft directory adds amenities)
//! - Any → Env vars: REPLACE (explicit user override)
//!
//! Note: These tests run without a global config (temp directories only),
//! so they effectively test local config merging with defaults.

use std::fs;

use tempfile::TempDir;

use onboard::config::{local_config_path, Settings};
use onboard::domain::FlowVariant;

#[test]
fn given_local_config_with_amenities_when_load_then_unions_with_defaults() {
    // Arrange
    let draft_dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(draft_dir.path()),
        r#"amenities = ["Sauna"]"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(draft_dir.path())).expect("load settings");

    // Assert: defaults kept, local addition appended
    assert!(settings.amenities.contains(&"Wi-Fi".to_string()));
    assert_eq!(settings.amenities.last().map(String::as_str), Some("Sauna"));
    assert!(settings.catalog().contains("Sauna"));
}

#[test]
fn given_local_config_with_negation_when_load_then_removes_inherited_amenity() {
    let draft_dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(draft_dir.path()),
        r#"amenities = ["!Mini Bar", "!Safe"]"#,
    )
    .unwrap();

    let settings = Settings::load(Some(draft_dir.path())).expect("load settings");

    assert!(!settings.amenities.contains(&"Mini Bar".to_string()));
    assert!(!settings.amenities.contains(&"Safe".to_string()));
    assert!(settings.amenities.contains(&"Desk".to_string()));
    assert!(!settings.catalog().contains("!Safe"));
}

#[test]
fn given_local_config_with_scalars_when_load_then_overrides_defaults() {
    let draft_dir = TempDir::new().unwrap();
    let out = draft_dir.path().join("out");
    fs::write(
        local_config_path(draft_dir.path()),
        format!(
            "flow = \"standalone-branch\"\npretty = false\noutput_dir = \"{}\"\noperator = \"ops\"\n",
            out.display()
        ),
    )
    .unwrap();

    let settings = Settings::load(Some(draft_dir.path())).expect("load settings");

    assert_eq!(settings.flow, FlowVariant::StandaloneBranch);
    assert!(!settings.pretty);
    assert_eq!(settings.output_dir, out);
    assert_eq!(settings.operator, "ops");
}

#[test]
fn given_no_local_config_when_load_then_defaults() {
    let draft_dir = TempDir::new().unwrap();

    let settings = Settings::load(Some(draft_dir.path())).expect("load settings");

    assert_eq!(settings.flow, FlowVariant::Onboarding);
    assert_eq!(settings.amenities.len(), 10);
}

#[test]
fn given_malformed_local_config_when_load_then_config_error() {
    let draft_dir = TempDir::new().unwrap();
    fs::write(local_config_path(draft_dir.path()), "amenities = [unclosed").unwrap();

    let err = Settings::load(Some(draft_dir.path())).unwrap_err();

    assert!(err.to_string().contains(".onboard.toml"));
}

#[test]
fn given_settings_when_rendering_toml_then_round_trips() {
    let settings = Settings::default();

    let rendered = settings.to_toml().expect("to toml");
    let parsed: Settings = toml::from_str(&rendered).expect("parse");

    assert_eq!(parsed, settings);
}

#[test]
fn given_template_when_parsed_then_is_valid_toml() {
    let parsed: Result<toml::Value, _> = toml::from_str(&Settings::template());

    assert!(parsed.is_ok());
}

// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Oasis configuration system.

use oasis_config::diagnostic::ConfigError;
use oasis_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_oasis_config() {
    let toml = r#"
[server]
host = "0.0.0.0"
port = 8080
log_level = "debug"

[storage]
database_path = "/tmp/oasis-test.db"
wal_mode = false

[gateway]
bearer_token = "owner-token"

[webhooks]
facebook_verify_token = "fb-verify"
instagram_verify_token = "ig-verify"
meta_verify_token = "meta-verify"
meta_app_secret = "app-secret"
twilio_auth_token = "tw-token"
public_url = "https://shop.example.com"

[routing]
single_tenant_fallback = true

[dispatch]
timeout_secs = 3
graph_api_base = "http://localhost:9999"
graph_api_version = "v19.0"
twilio_api_base = "http://localhost:9998"
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should load");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/oasis-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.gateway.bearer_token.as_deref(), Some("owner-token"));
    assert_eq!(config.webhooks.facebook_token(), Some("fb-verify"));
    assert_eq!(config.webhooks.meta_verify_token.as_deref(), Some("meta-verify"));
    assert_eq!(config.webhooks.meta_app_secret.as_deref(), Some("app-secret"));
    assert!(config.routing.single_tenant_fallback);
    assert_eq!(config.dispatch.timeout_secs, 3);
    assert_eq!(config.dispatch.graph_api_version, "v19.0");
}

/// An empty document yields the compiled defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults should be valid");
    assert_eq!(config.server.port, 3000);
    assert!(!config.routing.single_tenant_fallback);
    assert_eq!(config.dispatch.graph_api_base, "https://graph.facebook.com");
    assert_eq!(config.dispatch.twilio_api_base, "https://api.twilio.com");
}

/// Unknown keys are rejected rather than ignored.
#[test]
fn unknown_field_in_routing_is_rejected() {
    let toml = r#"
[routing]
single_tenant_fallbak = true
"#;
    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("single_tenant_fallbak"),
        "error should mention the bad key, got: {err_str}"
    );
}

/// Unknown keys come back as diagnostics with a suggestion.
#[test]
fn unknown_key_diagnostic_suggests_correction() {
    let toml = r#"
[gateway]
bearer_tokn = "abc"
"#;
    let errors = load_and_validate_str(toml).expect_err("should fail");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "bearer_tokn");
            assert_eq!(suggestion.as_deref(), Some("bearer_token"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Unknown top-level sections are rejected too.
#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[telegram]\nbot_token = \"x\"\n").expect_err("should fail");
    assert!(matches!(errors[0], ConfigError::UnknownKey { .. }));
}

/// A wrong value type is reported with the key path.
#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[server]\nport = \"eighty\"\n").expect_err("should fail");
    match &errors[0] {
        ConfigError::InvalidType { key, .. } => assert_eq!(key, "server.port"),
        other => panic!("expected InvalidType, got {other:?}"),
    }
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_errors_surface_from_str_loader() {
    let errors = load_and_validate_str("[dispatch]\ntimeout_secs = 600\n").expect_err("should fail");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

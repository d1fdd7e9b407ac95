// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::OasisConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &OasisConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        fail(format!(
            "server.host `{host}` is not a valid IP address or hostname"
        ));
    }

    if !LOG_LEVELS.contains(&config.server.log_level.as_str()) {
        fail(format!(
            "server.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.server.log_level
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.gateway.bearer_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
        fail("gateway.bearer_token must not be blank when set".to_string());
    }

    if !(1..=60).contains(&config.dispatch.timeout_secs) {
        fail(format!(
            "dispatch.timeout_secs must be between 1 and 60, got {}",
            config.dispatch.timeout_secs
        ));
    }

    for (key, url) in [
        ("dispatch.graph_api_base", &config.dispatch.graph_api_base),
        ("dispatch.twilio_api_base", &config.dispatch.twilio_api_base),
    ] {
        if !is_http_url(url) {
            fail(format!("{key} must be an http(s) URL, got `{url}`"));
        }
    }

    if !config.dispatch.graph_api_version.starts_with('v') {
        fail(format!(
            "dispatch.graph_api_version must look like `v18.0`, got `{}`",
            config.dispatch.graph_api_version
        ));
    }

    if let Some(url) = &config.webhooks.public_url
        && !is_http_url(url)
    {
        fail(format!("webhooks.public_url must be an http(s) URL, got `{url}`"));
    }

    if config.webhooks.twilio_auth_token.is_some() && config.webhooks.public_url.is_none() {
        fail(
            "webhooks.twilio_auth_token requires webhooks.public_url to check Twilio signatures"
                .to_string(),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&OasisConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = OasisConfig::default();
        config.server.host = String::new();
        config.dispatch.timeout_secs = 0;
        config.dispatch.graph_api_base = "graph.facebook.com".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn twilio_token_needs_public_url() {
        let mut config = OasisConfig::default();
        config.webhooks.twilio_auth_token = Some("tw".into());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("public_url"));

        config.webhooks.public_url = Some("https://shop.example.com".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = OasisConfig::default();
        config.server.log_level = "loud".into();
        assert!(validate_config(&config).is_err());
    }
}

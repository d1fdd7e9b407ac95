// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Oasis inbox service.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, `OASIS_*` environment overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use oasis_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("listening on {}:{}", config.server.host, config.server.port);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::OasisConfig;

/// Load configuration from the XDG hierarchy and validate it.
pub fn load_and_validate() -> Result<OasisConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<OasisConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<OasisConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

#[allow(clippy::result_large_err)]
fn finish(
    loaded: Result<OasisConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<OasisConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// Keys whose values are replaced by `[redacted]` in [`render_effective`].
const SECRET_KEYS: &[&str] = &[
    "bearer_token",
    "facebook_verify_token",
    "instagram_verify_token",
    "meta_verify_token",
    "meta_app_secret",
    "twilio_auth_token",
];

/// Render the effective configuration as TOML with secrets redacted.
pub fn render_effective(config: &OasisConfig) -> Result<String, ConfigError> {
    let mut value = toml::Value::try_from(config)
        .map_err(|e| ConfigError::Other(format!("failed to encode config: {e}")))?;
    if let Some(sections) = value.as_table_mut() {
        for section in sections.iter_mut().filter_map(|(_, v)| v.as_table_mut()) {
            for (key, field) in section.iter_mut() {
                if SECRET_KEYS.contains(&key.as_str()) {
                    *field = toml::Value::String("[redacted]".into());
                }
            }
        }
    }
    toml::to_string_pretty(&value)
        .map_err(|e| ConfigError::Other(format!("failed to encode config: {e}")))
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    loader::config_file_paths()
        .iter()
        .filter_map(|path| read_source(path))
        .collect()
}

fn read_source(path: &Path) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    // Figment reports the resolved absolute path of file sources.
    let name = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    Some((name.display().to_string(), content))
}

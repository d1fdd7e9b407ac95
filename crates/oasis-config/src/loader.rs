// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./oasis.toml` > `~/.config/oasis/oasis.toml` > `/etc/oasis/oasis.toml`
//! with environment variable overrides via `OASIS_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::OasisConfig;

/// Sections that `OASIS_<SECTION>_<KEY>` variables may address.
const ENV_SECTIONS: &[&str] = &[
    "server", "storage", "gateway", "webhooks", "routing", "dispatch",
];

/// Config file locations, lowest precedence first.
pub fn config_file_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/oasis/oasis.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("oasis/oasis.toml"));
    }
    paths.push(PathBuf::from("oasis.toml"));
    paths
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/oasis/oasis.toml` (system-wide)
/// 3. `~/.config/oasis/oasis.toml` (user XDG config)
/// 4. `./oasis.toml` (local directory)
/// 5. `OASIS_*` environment variables
pub fn load_config() -> Result<OasisConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<OasisConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OasisConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<OasisConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OasisConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment without extracting it.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(OasisConfig::default()));
    for path in config_file_paths() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Environment provider mapping `OASIS_<SECTION>_<KEY>` to `section.key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `OASIS_WEBHOOKS_META_APP_SECRET` maps to `webhooks.meta_app_secret`.
fn env_provider() -> Env {
    Env::prefixed("OASIS_").map(|key| map_env_key(key.as_str()).into())
}

/// Figment hands the key over in its original case, so it is lowercased first.
fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}

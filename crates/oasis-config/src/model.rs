// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Oasis inbox service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Oasis configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OasisConfig {
    /// HTTP listener and logging.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Inbox API settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Webhook verification secrets.
    #[serde(default)]
    pub webhooks: WebhookConfig,

    /// Business resolution policy.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Outbound send API settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("oasis").join("oasis.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("oasis.db"))
        .to_string_lossy()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Inbox API configuration.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Bearer token required on `/v1/*` routes. `None` rejects every API request.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("bearer_token", &redacted(&self.bearer_token))
            .finish()
    }
}

/// Webhook verification secrets.
///
/// A verify token that is not configured rejects every handshake for that route.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookConfig {
    /// Verify token for `/webhooks/facebook`. Falls back to the Instagram token.
    #[serde(default)]
    pub facebook_verify_token: Option<String>,

    /// Verify token for `/webhooks/instagram`.
    #[serde(default)]
    pub instagram_verify_token: Option<String>,

    /// Verify token for `/webhooks/meta` and `/webhooks/incoming`.
    #[serde(default)]
    pub meta_verify_token: Option<String>,

    /// Meta app secret. When set, POSTs must carry a valid `X-Hub-Signature-256`.
    #[serde(default)]
    pub meta_app_secret: Option<String>,

    /// Twilio auth token. When set together with `public_url`, POSTs must
    /// carry a valid `X-Twilio-Signature`.
    #[serde(default)]
    pub twilio_auth_token: Option<String>,

    /// Externally visible base URL (e.g. `https://shop.example.com`), used to
    /// rebuild the URL Twilio signed.
    #[serde(default)]
    pub public_url: Option<String>,
}

impl WebhookConfig {
    /// Verify token accepted by the Facebook route.
    pub fn facebook_token(&self) -> Option<&str> {
        self.facebook_verify_token
            .as_deref()
            .or(self.instagram_verify_token.as_deref())
    }
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("facebook_verify_token", &redacted(&self.facebook_verify_token))
            .field(
                "instagram_verify_token",
                &redacted(&self.instagram_verify_token),
            )
            .field("meta_verify_token", &redacted(&self.meta_verify_token))
            .field("meta_app_secret", &redacted(&self.meta_app_secret))
            .field("twilio_auth_token", &redacted(&self.twilio_auth_token))
            .field("public_url", &self.public_url)
            .finish()
    }
}

/// Business resolution policy.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Route events for unknown accounts to the oldest business instead of
    /// dropping them. Only meant for single-tenant demo deployments.
    #[serde(default)]
    pub single_tenant_fallback: bool,
}

/// Outbound send API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Timeout for a single send API call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Base URL of the Meta Graph API.
    #[serde(default = "default_graph_api_base")]
    pub graph_api_base: String,

    /// Graph API version segment.
    #[serde(default = "default_graph_api_version")]
    pub graph_api_version: String,

    /// Base URL of the Twilio REST API.
    #[serde(default = "default_twilio_api_base")]
    pub twilio_api_base: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            graph_api_base: default_graph_api_base(),
            graph_api_version: default_graph_api_version(),
            twilio_api_base: default_twilio_api_base(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_graph_api_base() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_graph_api_version() -> String {
    "v18.0".to_string()
}

fn default_twilio_api_base() -> String {
    "https://api.twilio.com".to_string()
}

fn redacted(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "[redacted]")
}

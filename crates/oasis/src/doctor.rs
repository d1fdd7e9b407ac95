// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `oasis doctor` command implementation.
//!
//! Runs diagnostic checks against the configured environment: storage,
//! secrets, business integrations and the running server.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use oasis_config::OasisConfig;
use oasis_core::{HealthStatus, OasisError, PluginAdapter, StorageAdapter};
use oasis_storage::SqliteStorage;

/// Status of a diagnostic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &'static str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name,
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `oasis doctor` command. Fails when any check fails.
pub async fn run_doctor(config: &OasisConfig, plain: bool) -> Result<(), OasisError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let mut results = vec![
        CheckResult::new("Configuration", CheckStatus::Pass, "valid", Instant::now()),
        check_auth(config),
        check_webhook_secrets(config),
    ];
    results.extend(check_storage(config).await);
    results.push(check_server(config).await);

    println!();
    println!("  oasis doctor");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", render(result, use_color));
    }
    println!();

    let fail_count = results.iter().filter(|r| r.status == CheckStatus::Fail).count();
    let warn_count = results.iter().filter(|r| r.status == CheckStatus::Warn).count();
    if fail_count + warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    if fail_count > 0 {
        return Err(OasisError::Internal(format!("{fail_count} check(s) failed")));
    }
    Ok(())
}

fn render(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if !use_color {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        return format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        );
    }

    use colored::Colorize;
    let (symbol, message) = match result.status {
        CheckStatus::Pass => ("✓".green(), result.message.normal()),
        CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
        CheckStatus::Fail => ("✗".red(), result.message.red()),
    };
    format!(
        "    {symbol} {:<20} {message} ({duration_ms}ms)",
        result.name
    )
}

fn check_auth(config: &OasisConfig) -> CheckResult {
    let start = Instant::now();
    match &config.gateway.bearer_token {
        Some(_) => CheckResult::new("Inbox API auth", CheckStatus::Pass, "bearer token set", start),
        None => CheckResult::new(
            "Inbox API auth",
            CheckStatus::Warn,
            "gateway.bearer_token not set, API rejects all requests",
            start,
        ),
    }
}

fn check_webhook_secrets(config: &OasisConfig) -> CheckResult {
    let start = Instant::now();
    let webhooks = &config.webhooks;
    let mut missing = Vec::new();
    if webhooks.facebook_token().is_none() {
        missing.push("facebook_verify_token");
    }
    if webhooks.instagram_verify_token.is_none() {
        missing.push("instagram_verify_token");
    }
    if webhooks.meta_verify_token.is_none() {
        missing.push("meta_verify_token");
    }
    if webhooks.meta_app_secret.is_none() {
        missing.push("meta_app_secret");
    }
    if webhooks.twilio_auth_token.is_none() {
        missing.push("twilio_auth_token");
    }

    if missing.is_empty() {
        CheckResult::new("Webhook secrets", CheckStatus::Pass, "all configured", start)
    } else {
        CheckResult::new(
            "Webhook secrets",
            CheckStatus::Warn,
            format!("not set: {}", missing.join(", ")),
            start,
        )
    }
}

/// Database health plus a scan of business integrations.
async fn check_storage(config: &OasisConfig) -> Vec<CheckResult> {
    let start = Instant::now();
    let db_path = &config.storage.database_path;
    if !std::path::Path::new(db_path).exists() {
        return vec![CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("not found: {db_path} (created on first run)"),
            start,
        )];
    }

    let storage = SqliteStorage::new(config.storage.clone());
    if let Err(e) = storage.initialize().await {
        return vec![CheckResult::new(
            "Database",
            CheckStatus::Fail,
            format!("open failed: {e}"),
            start,
        )];
    }
    let database = match storage.health_check().await {
        Ok(HealthStatus::Healthy) => CheckResult::new("Database", CheckStatus::Pass, "connected", start),
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new("Database", CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new("Database", CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new("Database", CheckStatus::Fail, e.to_string(), start),
    };

    let start = Instant::now();
    let integrations = match storage.list_businesses().await {
        Ok(businesses) if businesses.is_empty() => CheckResult::new(
            "Businesses",
            CheckStatus::Warn,
            "none yet, every event will be dropped",
            start,
        ),
        Ok(businesses) => {
            let without_token: Vec<String> = businesses
                .iter()
                .flat_map(|b| {
                    b.integrations
                        .iter()
                        .filter(|(_, cred)| cred.connected && cred.token().is_none())
                        .map(move |(key, _)| format!("{}/{key}", b.slug))
                })
                .collect();
            if without_token.is_empty() {
                CheckResult::new(
                    "Businesses",
                    CheckStatus::Pass,
                    format!("{} configured", businesses.len()),
                    start,
                )
            } else {
                CheckResult::new(
                    "Businesses",
                    CheckStatus::Warn,
                    format!("replies will be skipped for {}", without_token.join(", ")),
                    start,
                )
            }
        }
        Err(e) => CheckResult::new("Businesses", CheckStatus::Fail, e.to_string(), start),
    };

    let _ = storage.close().await;
    vec![database, integrations]
}

/// Probe the configured listen address.
async fn check_server(config: &OasisConfig) -> CheckResult {
    let start = Instant::now();
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let connect = tokio::net::TcpStream::connect(&addr);
    match tokio::time::timeout(Duration::from_secs(2), connect).await {
        Ok(Ok(_)) => CheckResult::new("Server", CheckStatus::Pass, format!("listening on {addr}"), start),
        Ok(Err(_)) | Err(_) => CheckResult::new(
            "Server",
            CheckStatus::Warn,
            format!("nothing listening on {addr}"),
            start,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_render_tags_status() {
        let result = CheckResult::new("Database", CheckStatus::Fail, "open failed", Instant::now());
        let line = render(&result, false);
        assert!(line.contains("[FAIL]"));
        assert!(line.contains("open failed"));
    }

    #[test]
    fn missing_secrets_are_listed() {
        let result = check_webhook_secrets(&OasisConfig::default());
        assert_eq!(result.status, CheckStatus::Warn);
        assert!(result.message.contains("meta_app_secret"));

        let mut config = OasisConfig::default();
        config.webhooks.facebook_verify_token = Some("a".into());
        config.webhooks.instagram_verify_token = Some("b".into());
        config.webhooks.meta_verify_token = Some("c".into());
        config.webhooks.meta_app_secret = Some("d".into());
        config.webhooks.twilio_auth_token = Some("e".into());
        assert_eq!(check_webhook_secrets(&config).status, CheckStatus::Pass);
    }

    #[tokio::test]
    async fn missing_database_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = OasisConfig::default();
        config.storage.database_path = dir.path().join("absent.db").to_string_lossy().into_owned();
        let results = check_storage(&config).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, CheckStatus::Warn);
    }
}

use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        None => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub roster: RosterConfig,
    pub slack: SlackConfig,
    pub scan: ScanConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `ONCALL_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("ONCALL_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            roster: RosterConfig::from_env_profiled(p),
            slack: SlackConfig::from_env_profiled(p),
            scan: ScanConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  roster:  url={}, timezone={}, timeout={}s, schedule={}",
            self.roster.base_url,
            self.roster.timezone,
            self.roster.timeout_secs,
            self.roster.schedule.as_deref().unwrap_or("(first)")
        );
        tracing::info!(
            "  slack:   webhook={}, channel={}",
            if self.slack.webhook_url.is_some() { "set" } else { "(none)" },
            self.slack.channel.as_deref().unwrap_or("(default)")
        );
        tracing::info!("  scan:    timeout={}s", self.scan.timeout_secs);
    }

    /// Return a redacted view safe for logging (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "roster": {
                "base_url": self.roster.base_url,
                "timezone": self.roster.timezone,
                "timeout_secs": self.roster.timeout_secs,
                "accept_invalid_certs": self.roster.accept_invalid_certs,
                "schedule": self.roster.schedule,
                "configured": self.roster.is_configured(),
            },
            "slack": {
                "channel": self.slack.channel,
                "configured": self.slack.is_configured(),
            },
            "scan": { "timeout_secs": self.scan.timeout_secs },
        })
    }
}

// ── Roster service ────────────────────────────────────────────

pub const DEFAULT_ROSTER_URL: &str = "https://portal.ncaas.nl/";
pub const DEFAULT_TIMEZONE: &str = "Europe/Amsterdam";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: u64,
    /// Skip TLS certificate verification (the portal has served broken chains).
    pub accept_invalid_certs: bool,
    /// IANA zone the roster's wall-clock timestamps belong to.
    pub timezone: String,
    /// Group name of the schedule to report on; first schedule when unset.
    pub schedule: Option<String>,
}

impl RosterConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            base_url: profiled_env_or(p, "ROSTER_BASE_URL", DEFAULT_ROSTER_URL),
            username: profiled_env_opt(p, "ROSTER_USERNAME"),
            password: profiled_env_opt(p, "ROSTER_PASSWORD"),
            timeout_secs: profiled_env_u64(p, "ROSTER_TIMEOUT_SECS", 60),
            accept_invalid_certs: profiled_env_bool(p, "ROSTER_ACCEPT_INVALID_CERTS", false),
            timezone: profiled_env_or(p, "ROSTER_TIMEZONE", DEFAULT_TIMEZONE),
            schedule: profiled_env_opt(p, "ROSTER_SCHEDULE"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ROSTER_URL.to_string(),
            username: None,
            password: None,
            timeout_secs: 60,
            accept_invalid_certs: false,
            timezone: DEFAULT_TIMEZONE.to_string(),
            schedule: None,
        }
    }
}

// ── Slack ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlackConfig {
    pub webhook_url: Option<String>,
    /// Channel override; the webhook's own channel when unset.
    pub channel: Option<String>,
    pub username_template: Option<String>,
    pub text_template: Option<String>,
}

impl SlackConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            webhook_url: profiled_env_opt(p, "SLACK_WEBHOOK_URL"),
            channel: profiled_env_opt(p, "SLACK_CHANNEL"),
            username_template: profiled_env_opt(p, "SLACK_USERNAME_TEMPLATE"),
            text_template: profiled_env_opt(p, "SLACK_TEXT_TEMPLATE"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }
}

// ── Scan ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Wall-clock budget for the whole scan; 0 disables it.
    pub timeout_secs: u64,
}

impl ScanConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            timeout_secs: profiled_env_u64(p, "SCAN_TIMEOUT_SECS", 0),
        }
    }
}

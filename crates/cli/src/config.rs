use oncall_core::Config;

use crate::cli::CliArgs;

/// Load config for the requested profile and layer CLI flags on top.
/// Priority: cli flag > profiled env var > env var > default.
pub fn resolve(args: &CliArgs) -> Config {
    let mut config = match args.profile.as_deref() {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };
    apply_overrides(&mut config, args);
    config
}

pub fn apply_overrides(config: &mut Config, args: &CliArgs) {
    if let Some(username) = &args.username {
        config.roster.username = Some(username.clone());
    }
    if let Some(password) = &args.password {
        config.roster.password = Some(password.clone());
    }
    if let Some(schedule) = &args.schedule {
        config.roster.schedule = Some(schedule.clone());
    }
    if let Some(webhook) = &args.webhook {
        config.slack.webhook_url = Some(webhook.clone());
    }
    if let Some(channel) = &args.channel {
        config.slack.channel = Some(channel.clone());
    }
    if let Some(secs) = args.timeout_secs {
        config.scan.timeout_secs = secs;
    }
}

/// Names of required settings that are still missing.
///
/// The webhook is only required when the digest is actually sent.
pub fn missing_required(config: &Config, dry_run: bool) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if config.roster.username.is_none() {
        missing.push("username");
    }
    if config.roster.password.is_none() {
        missing.push("password");
    }
    if !dry_run && config.slack.webhook_url.is_none() {
        missing.push("webhook");
    }
    missing
}

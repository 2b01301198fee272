//! One digest run: log in, scan the rotation, compose and deliver.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use oncall_core::{Config, MemberDirectory, Outlook, Schedule, Timestamp, WindowScanner};
use oncall_notify::{Notifier, ReportComposer};
use oncall_roster::{select_schedule, RosterClient};

/// Run the whole pipeline once, as seen from `now`.
pub async fn run(config: &Config, notifier: &dyn Notifier, now: DateTime<Utc>) -> Result<()> {
    let composer = ReportComposer::with_templates(
        config.slack.username_template.clone(),
        config.slack.text_template.clone(),
    )
    .context("invalid message templates")?;

    let client = RosterClient::new(&config.roster).context("failed to configure roster client")?;
    client
        .login(
            config.roster.username.as_deref().unwrap_or_default(),
            config.roster.password.as_deref().unwrap_or_default(),
        )
        .await
        .context("failed to login to roster")?;

    let users = client.users().await.context("failed to load users")?;
    let schedules = client.schedules().await.context("failed to load schedules")?;
    if users.is_empty() || schedules.is_empty() {
        bail!("could not load users or schedules, check username and password");
    }
    let schedule = select_schedule(&schedules, config.roster.schedule.as_deref())?;
    let directory = MemberDirectory::new(&users);

    let now = now.with_timezone(&client.timezone()).fixed_offset();
    let outlook = scan(&client, schedule, now, config.scan.timeout_secs).await?;

    let message = composer.compose(
        &outlook,
        schedule,
        &directory,
        config.slack.channel.as_deref(),
        now,
    )?;
    notifier
        .send(&message)
        .await
        .with_context(|| format!("failed to deliver digest via {}", notifier.channel_name()))?;

    info!(
        group = %schedule.group_name,
        channel = notifier.channel_name(),
        has_next = outlook.has_next(),
        "digest delivered"
    );
    Ok(())
}

/// Scan under an optional wall-clock budget (`0` = unbounded).
async fn scan(
    client: &RosterClient,
    schedule: &Schedule,
    now: Timestamp,
    timeout_secs: u64,
) -> Result<Outlook> {
    let scanner = WindowScanner::new(client);
    let outlook = if timeout_secs == 0 {
        scanner.scan(schedule, now).await?
    } else {
        tokio::time::timeout(Duration::from_secs(timeout_secs), scanner.scan(schedule, now))
            .await
            .map_err(|_| anyhow!("schedule scan exceeded its {timeout_secs}s budget"))??
    };
    Ok(outlook)
}

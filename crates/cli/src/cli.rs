use clap::Parser;

/// Report who is on call, who is next, and how far the rotation is planned.
///
/// Every option falls back to its environment variable (see `.env`), so a
/// scheduled run usually needs no flags at all.
#[derive(Parser, Debug, Default)]
#[command(name = "oncall-digest", version, about)]
pub struct CliArgs {
    /// Roster username (ROSTER_USERNAME)
    #[arg(long)]
    pub username: Option<String>,

    /// Roster password (ROSTER_PASSWORD)
    #[arg(long)]
    pub password: Option<String>,

    /// Slack webhook url (SLACK_WEBHOOK_URL)
    #[arg(long)]
    pub webhook: Option<String>,

    /// Slack channel override (SLACK_CHANNEL)
    #[arg(long)]
    pub channel: Option<String>,

    /// Group name of the schedule to report on; first schedule when unset (ROSTER_SCHEDULE)
    #[arg(long)]
    pub schedule: Option<String>,

    /// Config profile, e.g. PROD reads PROD_ROSTER_USERNAME first (ONCALL_PROFILE)
    #[arg(long)]
    pub profile: Option<String>,

    /// Abort the schedule scan after this many seconds; 0 disables (SCAN_TIMEOUT_SECS)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Print the Slack payload instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

mod cli;
mod config;
mod digest;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::error;

use oncall_notify::{Notifier, SlackWebhookNotifier, StdoutNotifier};

use crate::cli::CliArgs;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    oncall_core::config::load_dotenv();
    let args = CliArgs::parse();
    let config = config::resolve(&args);

    let missing = config::missing_required(&config, args.dry_run);
    if !missing.is_empty() {
        eprintln!("missing required settings: {}\n", missing.join(", "));
        CliArgs::command()
            .print_help()
            .context("failed to print usage")?;
        std::process::exit(1);
    }

    config.log_summary();

    let notifier: Box<dyn Notifier> = if args.dry_run {
        Box::new(StdoutNotifier::new())
    } else {
        let url = config.slack.webhook_url.as_deref().unwrap_or_default();
        Box::new(SlackWebhookNotifier::new(url).context("failed to configure slack webhook")?)
    };

    if let Err(e) = digest::run(&config, notifier.as_ref(), chrono::Utc::now()).await {
        error!(error = %format!("{e:#}"), "digest run failed");
        return Err(e);
    }
    Ok(())
}

//! On-call digest delivery.
//!
//! This crate provides:
//! - `Notifier` trait for pluggable delivery channels
//! - Slack incoming-webhook and stdout notifier implementations
//! - Minijinja template rendering for the message header
//! - `ReportComposer`, which turns a scan `Outlook` into a Slack message

pub mod message;
pub mod report;
pub mod stdout;
pub mod templating;
pub mod traits;
pub mod webhook;

pub use message::{Attachment, SlackMessage};
pub use report::ReportComposer;
pub use stdout::StdoutNotifier;
pub use traits::{Notifier, NotifyError};
pub use webhook::SlackWebhookNotifier;

use chrono::NaiveDate;
use thiserror::Error;

/// Failures talking to the duty-roster service.
///
/// Every variant is fatal to a scan: the scanner propagates the first
/// error it sees and never returns a partial [`crate::Outlook`].
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("failed to retrieve planning for {date}, roster returned {status}")]
    Retrieval { date: NaiveDate, status: u16 },

    #[error("request to {what} failed with status {status}")]
    Status { what: String, status: u16 },

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("failed to decode {what}: {reason}")]
    Decode { what: String, reason: String },

    #[error("failed to login: {0}")]
    Login(String),

    #[error("configuration error: {0}")]
    Config(String),
}

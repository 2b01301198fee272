//! Client for the duty-roster service.
//!
//! This crate provides:
//! - `RosterClient`, a session-holding HTTP client that logs in, lists users
//!   and schedules, and fetches per-day planning documents
//! - the `DaySource` implementation the window scanner consumes
//! - timezone normalization of the roster's wall-clock timestamps

pub mod client;
pub mod planning;

pub use client::{select_schedule, RosterClient};

//! Domain model and schedule-window resolution for on-call digests.

pub mod config;
pub mod error;
pub mod model;
pub mod scanner;
pub mod source;

pub use config::Config;
pub use error::*;
pub use model::*;
pub use scanner::WindowScanner;
pub use source::{DaySource, MemberDirectory, MemberResolver};

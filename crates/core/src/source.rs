//! Seams between the scanner and the outside world.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::error::RosterError;
use crate::model::{DailySchedule, MemberSet, Schedule, User};

/// Answers "what is the daily schedule of `schedule` on `date`", one day at a time.
///
/// Implementations return slots already normalized to the roster's civil
/// time. A non-success upstream response must surface as an error; callers
/// treat it as fatal and do not retry.
#[async_trait::async_trait]
pub trait DaySource: Send + Sync {
    async fn fetch(&self, schedule: &Schedule, date: NaiveDate)
        -> Result<DailySchedule, RosterError>;
}

/// Maps member ids to display names for reporting.
pub trait MemberResolver {
    fn name_of(&self, id: &str) -> Option<&str>;

    /// Display names of `members`, de-duplicated and sorted.
    ///
    /// Unknown ids are reported by their raw id.
    fn display_names(&self, members: &MemberSet) -> Vec<String> {
        let mut names: Vec<String> = members
            .iter()
            .map(|id| self.name_of(id).unwrap_or(id.as_str()).to_string())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// In-memory id → name index built from the roster's user list.
#[derive(Debug, Clone, Default)]
pub struct MemberDirectory {
    names: HashMap<String, String>,
}

impl MemberDirectory {
    pub fn new(users: &[User]) -> Self {
        let names = users
            .iter()
            .map(|u| (u.id.clone(), u.display_name()))
            .collect();
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl MemberResolver for MemberDirectory {
    fn name_of(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }
}

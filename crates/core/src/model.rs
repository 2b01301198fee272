use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Opaque member identifier as issued by the roster service.
pub type MemberId = String;

/// Instant in the roster's local civil time.
pub type Timestamp = DateTime<FixedOffset>;

/// Unordered, duplicate-free set of member ids.
///
/// Two sets compare equal when they hold the same ids, regardless of the
/// order or multiplicity they were built from: `{A,B} == {B,A} == {A,A,B}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberSet(BTreeSet<MemberId>);

impl MemberSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// Ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &MemberId> {
        self.0.iter()
    }
}

impl<S: Into<MemberId>> FromIterator<S> for MemberSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a MemberSet {
    type Item = &'a MemberId;
    type IntoIter = std::collections::btree_set::Iter<'a, MemberId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One contiguous interval of a day's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: Timestamp,
    pub end: Timestamp,
    pub members: MemberSet,
}

impl Slot {
    /// Half-open containment: a slot starting exactly at `t` is active,
    /// one ending exactly at `t` is not.
    pub fn is_active_at(&self, t: &Timestamp) -> bool {
        self.start <= *t && self.end > *t
    }
}

/// The per-day planning document of one duty group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySchedule {
    /// Base assignments, in the order the roster returned them.
    pub base_time_slots: Vec<Slot>,
    /// Primary assignments. Carried for completeness, never scanned.
    pub primary_time_slots: Vec<Slot>,
}

impl DailySchedule {
    /// Whether any base slot of the day has someone assigned.
    pub fn has_members(&self) -> bool {
        self.base_time_slots.iter().any(|s| !s.members.is_empty())
    }

    /// First base slot that is active at `t`, if any.
    pub fn active_slot(&self, t: &Timestamp) -> Option<&Slot> {
        self.base_time_slots.iter().find(|s| s.is_active_at(t))
    }
}

/// A fixed member set holding duty over a (possibly multi-day) span.
///
/// `start`/`end` are `None` when they could not be resolved, e.g. when
/// nobody was on call at the query instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub members: MemberSet,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl From<&Slot> for Assignment {
    fn from(slot: &Slot) -> Self {
        Self {
            members: slot.members.clone(),
            start: Some(slot.start),
            end: Some(slot.end),
        }
    }
}

/// Resolved on-call picture produced by [`crate::WindowScanner`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outlook {
    /// Assignment active at the query instant (members may be empty).
    pub current: Assignment,
    /// First differing assignment found before the scan stopped.
    pub next: Option<Assignment>,
    /// End of the last slot seen on a day that still had assignments.
    pub scan_end: Option<Timestamp>,
}

impl Outlook {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Nobody holds duty at the query instant.
    pub fn nobody_on_call(&self) -> bool {
        self.current.members.is_empty()
    }
}

/// A roster user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: MemberId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A named rotation tracked by the roster service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub group_id: String,
    pub parameter_id: String,
    #[serde(default)]
    pub group_name: String,
}

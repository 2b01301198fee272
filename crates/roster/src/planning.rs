//! Planning document wire format and timezone normalization.
//!
//! The roster reports local wall-clock times tagged as UTC (`...Z`). The
//! wall-clock fields are kept and re-interpreted in the roster's zone.

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use chrono_tz::Tz;
use serde::Deserialize;

use oncall_core::{DailySchedule, Slot, Timestamp};

/// Per-day planning document as served by the roster.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningDocument {
    #[serde(default)]
    pub base_time_slots: Option<Vec<WireSlot>>,
    #[serde(default)]
    pub primary_time_slots: Option<Vec<WireSlot>>,
}

#[derive(Debug, Deserialize)]
pub struct WireSlot {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    #[serde(default)]
    pub members: Option<Vec<String>>,
}

impl PlanningDocument {
    /// Convert to the domain schedule with every timestamp localized to `tz`.
    pub fn into_schedule(self, tz: Tz) -> DailySchedule {
        let convert = |slots: Option<Vec<WireSlot>>| -> Vec<Slot> {
            slots
                .unwrap_or_default()
                .into_iter()
                .map(|s| s.into_slot(tz))
                .collect()
        };
        DailySchedule {
            base_time_slots: convert(self.base_time_slots),
            primary_time_slots: convert(self.primary_time_slots),
        }
    }
}

impl WireSlot {
    fn into_slot(self, tz: Tz) -> Slot {
        Slot {
            start: localize(self.start, tz),
            end: localize(self.end, tz),
            members: self.members.unwrap_or_default().into_iter().collect(),
        }
    }
}

/// Re-interpret the wall-clock fields of `ts` as civil time in `tz`.
///
/// Ambiguous times (DST fall-back) resolve to the earliest instant. Times
/// inside a DST gap are pushed forward by one hour.
pub fn localize(ts: DateTime<FixedOffset>, tz: Tz) -> Timestamp {
    let wall = ts.naive_local();
    tz.from_local_datetime(&wall)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(wall + Duration::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&wall))
        .fixed_offset()
}

//! Schedule-window resolution.
//!
//! The roster only answers one day at a time. [`WindowScanner`] stitches
//! those per-day answers into a continuous timeline: it finds who is on
//! call now, extends that assignment across day boundaries while the member
//! set stays the same, records the first differing assignment, and stops at
//! the first day without any assigned members.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::RosterError;
use crate::model::{Assignment, Outlook, Schedule, Timestamp};
use crate::source::DaySource;

/// Walks a [`DaySource`] forward from a reference instant.
///
/// The scan imposes no day budget: a roster that reports members for every
/// day forever keeps the scan going. Callers wanting a bound wrap
/// [`WindowScanner::scan`] in their own timeout.
pub struct WindowScanner<'a> {
    source: &'a dyn DaySource,
}

impl<'a> WindowScanner<'a> {
    pub fn new(source: &'a dyn DaySource) -> Self {
        Self { source }
    }

    /// Resolve the [`Outlook`] of `schedule` as seen from `now`.
    ///
    /// Day 0 is `now`'s calendar date. Slots count as upcoming only when
    /// they start strictly after `now`; the same fixed instant is used on
    /// every day of the scan.
    ///
    /// # Errors
    ///
    /// Returns the first [`RosterError`] raised by the source. No partial
    /// outlook is produced.
    pub async fn scan(&self, schedule: &Schedule, now: Timestamp) -> Result<Outlook, RosterError> {
        let mut date = now.date_naive();
        let mut day = self.source.fetch(schedule, date).await?;

        let active = day.active_slot(&now);
        let mut current = Assignment {
            members: active.map(|s| s.members.clone()).unwrap_or_default(),
            start: active.map(|s| s.start),
            end: active.map(|s| s.end),
        };
        let mut next: Option<Assignment> = None;
        let mut scan_end: Option<Timestamp> = None;
        let mut days_scanned = 0usize;

        debug!(
            group = %schedule.group_name,
            %date,
            members = current.members.len(),
            "seeded scan"
        );

        while day.has_members() {
            days_scanned += 1;

            for slot in day.base_time_slots.iter().filter(|s| s.start > now) {
                scan_end = Some(slot.end);

                if next.is_some() {
                    continue;
                }
                if slot.members == current.members {
                    current.end = Some(slot.end);
                } else {
                    debug!(%date, start = %slot.start, "found next assignment");
                    next = Some(Assignment::from(slot));
                }
            }

            date = match next_day(date) {
                Some(d) => d,
                None => break,
            };
            day = self.source.fetch(schedule, date).await?;
            debug!(%date, has_members = day.has_members(), "fetched day");
        }

        info!(
            group = %schedule.group_name,
            days_scanned,
            on_call = current.members.len(),
            has_next = next.is_some(),
            "schedule scan complete"
        );

        Ok(Outlook {
            current,
            next,
            scan_end,
        })
    }
}

fn next_day(date: NaiveDate) -> Option<NaiveDate> {
    date.succ_opt()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::{Duration, FixedOffset, NaiveDate, TimeZone};

    use super::*;
    use crate::model::{DailySchedule, MemberSet, Slot};

    /// In-memory roster: unknown dates are empty days.
    #[derive(Default)]
    struct FakeSource {
        days: HashMap<NaiveDate, DailySchedule>,
        fail_on: Option<NaiveDate>,
        fetched: Mutex<Vec<NaiveDate>>,
    }

    impl FakeSource {
        fn with_day(mut self, date: NaiveDate, slots: Vec<Slot>) -> Self {
            self.days.insert(
                date,
                DailySchedule {
                    base_time_slots: slots,
                    primary_time_slots: Vec::new(),
                },
            );
            self
        }

        fn failing_on(mut self, date: NaiveDate) -> Self {
            self.fail_on = Some(date);
            self
        }

        fn fetched(&self) -> Vec<NaiveDate> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl DaySource for FakeSource {
        async fn fetch(
            &self,
            _schedule: &Schedule,
            date: NaiveDate,
        ) -> Result<DailySchedule, RosterError> {
            self.fetched.lock().unwrap().push(date);
            if self.fail_on == Some(date) {
                return Err(RosterError::Retrieval { date, status: 500 });
            }
            Ok(self.days.get(&date).cloned().unwrap_or_default())
        }
    }

    fn schedule() -> Schedule {
        Schedule {
            group_id: "G1".into(),
            parameter_id: "P1".into(),
            group_name: "Ops".into(),
        }
    }

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 6, 1).unwrap() + Duration::days(offset)
    }

    fn at(offset: i64, h: u32, m: u32, s: u32) -> Timestamp {
        let d = day(offset);
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .from_local_datetime(&d.and_hms_opt(h, m, s).unwrap())
            .unwrap()
    }

    fn slot(start: Timestamp, end: Timestamp, members: &[&str]) -> Slot {
        Slot {
            start,
            end,
            members: members.iter().copied().collect(),
        }
    }

    fn full_day(offset: i64, members: &[&str]) -> Slot {
        slot(at(offset, 0, 0, 0), at(offset, 23, 59, 59), members)
    }

    fn set(members: &[&str]) -> MemberSet {
        members.iter().copied().collect()
    }

    #[tokio::test]
    async fn same_members_extend_across_days() {
        let source = FakeSource::default()
            .with_day(day(0), vec![slot(at(0, 9, 0, 0), at(0, 18, 0, 0), &["A"])])
            .with_day(day(1), vec![full_day(1, &["A"])]);

        let outlook = WindowScanner::new(&source)
            .scan(&schedule(), at(0, 10, 0, 0))
            .await
            .unwrap();

        assert_eq!(outlook.current.members, set(&["A"]));
        assert_eq!(outlook.current.start, Some(at(0, 9, 0, 0)));
        assert_eq!(outlook.current.end, Some(at(1, 23, 59, 59)));
        assert!(!outlook.has_next());
        assert_eq!(outlook.scan_end, Some(at(1, 23, 59, 59)));
        assert_eq!(source.fetched(), vec![day(0), day(1), day(2)]);
    }

    #[tokio::test]
    async fn differing_members_become_next() {
        let source = FakeSource::default()
            .with_day(day(0), vec![full_day(0, &["A", "B"])])
            .with_day(day(1), vec![full_day(1, &["C", "B"])]);

        let outlook = WindowScanner::new(&source)
            .scan(&schedule(), at(0, 12, 0, 0))
            .await
            .unwrap();

        assert_eq!(outlook.current.members, set(&["A", "B"]));
        assert_eq!(outlook.current.end, Some(at(0, 23, 59, 59)));
        let next = outlook.next.expect("next assignment");
        assert_eq!(next.members, set(&["B", "C"]));
        assert_eq!(next.start, Some(at(1, 0, 0, 0)));
        assert_eq!(next.end, Some(at(1, 23, 59, 59)));
        assert_eq!(outlook.scan_end, Some(at(1, 23, 59, 59)));
    }

    #[tokio::test]
    async fn member_order_and_duplicates_do_not_break_the_run() {
        let source = FakeSource::default()
            .with_day(day(0), vec![full_day(0, &["A", "B"])])
            .with_day(day(1), vec![full_day(1, &["B", "A", "A"])]);

        let outlook = WindowScanner::new(&source)
            .scan(&schedule(), at(0, 8, 0, 0))
            .await
            .unwrap();

        assert!(!outlook.has_next());
        assert_eq!(outlook.current.end, Some(at(1, 23, 59, 59)));
    }

    #[tokio::test]
    async fn current_end_freezes_once_next_is_found() {
        let source = FakeSource::default()
            .with_day(day(0), vec![full_day(0, &["A"])])
            .with_day(day(1), vec![full_day(1, &["B"])])
            .with_day(day(2), vec![full_day(2, &["A"])])
            .with_day(day(3), vec![full_day(3, &["C"])]);

        let outlook = WindowScanner::new(&source)
            .scan(&schedule(), at(0, 12, 0, 0))
            .await
            .unwrap();

        assert_eq!(outlook.current.end, Some(at(0, 23, 59, 59)));
        assert_eq!(outlook.next.unwrap().members, set(&["B"]));
        assert_eq!(outlook.scan_end, Some(at(3, 23, 59, 59)));
        assert_eq!(source.fetched().len(), 5);
    }

    #[tokio::test]
    async fn first_differing_slot_of_a_day_wins() {
        let source = FakeSource::default().with_day(
            day(0),
            vec![
                slot(at(0, 0, 0, 0), at(0, 8, 0, 0), &["A"]),
                slot(at(0, 8, 0, 0), at(0, 12, 0, 0), &["A"]),
                slot(at(0, 12, 0, 0), at(0, 18, 0, 0), &["B"]),
                slot(at(0, 18, 0, 0), at(0, 23, 0, 0), &["C"]),
            ],
        );

        let outlook = WindowScanner::new(&source)
            .scan(&schedule(), at(0, 7, 0, 0))
            .await
            .unwrap();

        assert_eq!(outlook.current.end, Some(at(0, 12, 0, 0)));
        assert_eq!(outlook.next.unwrap().members, set(&["B"]));
        assert_eq!(outlook.scan_end, Some(at(0, 23, 0, 0)));
    }

    #[tokio::test]
    async fn slot_starting_at_reference_instant_is_not_upcoming() {
        let source = FakeSource::default().with_day(
            day(0),
            vec![
                slot(at(0, 0, 0, 0), at(0, 12, 0, 0), &["A"]),
                slot(at(0, 12, 0, 0), at(0, 23, 0, 0), &["B"]),
            ],
        );

        let outlook = WindowScanner::new(&source)
            .scan(&schedule(), at(0, 12, 0, 0))
            .await
            .unwrap();

        // The 12:00 slot is active, not upcoming.
        assert_eq!(outlook.current.members, set(&["B"]));
        assert_eq!(outlook.current.end, Some(at(0, 23, 0, 0)));
        assert!(!outlook.has_next());
        assert_eq!(outlook.scan_end, None);
    }

    #[tokio::test]
    async fn no_active_slot_makes_first_assignment_next() {
        let source = FakeSource::default()
            .with_day(day(0), vec![slot(at(0, 18, 0, 0), at(0, 23, 0, 0), &["A"])])
            .with_day(day(1), vec![full_day(1, &["A"])]);

        let outlook = WindowScanner::new(&source)
            .scan(&schedule(), at(0, 9, 0, 0))
            .await
            .unwrap();

        assert!(outlook.nobody_on_call());
        assert_eq!(outlook.current.start, None);
        assert_eq!(outlook.current.end, None);
        let next = outlook.next.unwrap();
        assert_eq!(next.members, set(&["A"]));
        assert_eq!(next.start, Some(at(0, 18, 0, 0)));
        assert_eq!(outlook.scan_end, Some(at(1, 23, 59, 59)));
    }

    #[tokio::test]
    async fn empty_seed_day_stops_immediately() {
        let source = FakeSource::default().with_day(day(1), vec![full_day(1, &["A"])]);

        let outlook = WindowScanner::new(&source)
            .scan(&schedule(), at(0, 9, 0, 0))
            .await
            .unwrap();

        assert!(outlook.nobody_on_call());
        assert!(!outlook.has_next());
        assert_eq!(outlook.scan_end, None);
        assert_eq!(source.fetched(), vec![day(0)]);
    }

    #[tokio::test]
    async fn unassigned_upcoming_slot_counts_as_a_change() {
        let source = FakeSource::default().with_day(
            day(0),
            vec![
                slot(at(0, 0, 0, 0), at(0, 12, 0, 0), &["A"]),
                slot(at(0, 12, 0, 0), at(0, 23, 0, 0), &[]),
            ],
        );

        let outlook = WindowScanner::new(&source)
            .scan(&schedule(), at(0, 9, 0, 0))
            .await
            .unwrap();

        let next = outlook.next.unwrap();
        assert!(next.members.is_empty());
        assert_eq!(next.start, Some(at(0, 12, 0, 0)));
    }

    #[tokio::test]
    async fn stops_on_first_day_without_members() {
        let source = FakeSource::default()
            .with_day(day(0), vec![full_day(0, &["A"])])
            .with_day(day(1), vec![full_day(1, &[])])
            .with_day(day(2), vec![full_day(2, &["B"])]);

        let outlook = WindowScanner::new(&source)
            .scan(&schedule(), at(0, 9, 0, 0))
            .await
            .unwrap();

        assert!(!outlook.has_next());
        assert_eq!(outlook.current.end, Some(at(0, 23, 59, 59)));
        assert_eq!(source.fetched(), vec![day(0), day(1)]);
    }

    #[tokio::test]
    async fn retrieval_error_aborts_the_scan() {
        let source = FakeSource::default()
            .with_day(day(0), vec![full_day(0, &["A"])])
            .with_day(day(1), vec![full_day(1, &["A"])])
            .with_day(day(2), vec![full_day(2, &["A"])])
            .failing_on(day(2));

        let err = WindowScanner::new(&source)
            .scan(&schedule(), at(0, 9, 0, 0))
            .await
            .unwrap_err();

        match err {
            RosterError::Retrieval { date, status } => {
                assert_eq!(date, day(2));
                assert_eq!(status, 500);
            }
            other => panic!("expected Retrieval error, got: {other:?}"),
        }
        assert_eq!(source.fetched(), vec![day(0), day(1), day(2)]);
    }

    #[tokio::test]
    async fn seed_fetch_failure_is_fatal() {
        let source = FakeSource::default().failing_on(day(0));
        let result = WindowScanner::new(&source)
            .scan(&schedule(), at(0, 9, 0, 0))
            .await;
        assert!(result.is_err());
    }
}

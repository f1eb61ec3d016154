use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

use super::OpenEndedExceptionPolicy;

/// An enabled weekly window, already filtered to one weekday.
#[derive(Debug, Clone, Copy)]
pub struct WeeklyWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// A date-specific override. When one exists for a date it fully supersedes
/// the weekly rules for that date.
#[derive(Debug, Clone, Copy)]
pub struct DateOverride {
    pub is_available: bool,
    pub window: Option<(NaiveTime, NaiveTime)>,
}

/// Day-of-week numbering used throughout: 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> i16 {
    date.weekday().num_days_from_sunday() as i16
}

/// The dates a learner may pick from, starting tomorrow.
///
/// `override_days` maps exception dates to their availability flag;
/// `open_weekdays` is the set of weekdays with at least one enabled rule.
pub fn bookable_dates(
    today: NaiveDate,
    horizon_days: u32,
    open_weekdays: &HashSet<i16>,
    override_days: &HashMap<NaiveDate, bool>,
) -> Vec<NaiveDate> {
    (1..=horizon_days as i64)
        .map(|offset| today + Duration::days(offset))
        .filter(|date| match override_days.get(date) {
            Some(available) => *available,
            None => open_weekdays.contains(&weekday_index(*date)),
        })
        .collect()
}

/// Open slots for one date, ordered by time.
///
/// Precedence: a date override wins outright; otherwise the enabled weekly
/// windows for that weekday apply. A weekday with no configured windows is
/// treated as fully open — such a date only reaches the slot query when an
/// override listed it, so the grid is the only sensible window. Slots
/// already held by a pending or confirmed booking are removed last.
pub fn open_slots(
    candidates: &[NaiveTime],
    weekly: &[WeeklyWindow],
    date_override: Option<DateOverride>,
    booked: &HashSet<NaiveTime>,
    open_ended_policy: OpenEndedExceptionPolicy,
) -> Vec<NaiveTime> {
    let windowed: Vec<NaiveTime> = match date_override {
        Some(ov) if !ov.is_available => Vec::new(),
        Some(DateOverride {
            window: Some((start, end)),
            ..
        }) => candidates
            .iter()
            .copied()
            .filter(|slot| *slot >= start && *slot < end)
            .collect(),
        Some(DateOverride { window: None, .. }) => match open_ended_policy {
            OpenEndedExceptionPolicy::FullDay => candidates.to_vec(),
            OpenEndedExceptionPolicy::NoSlots => Vec::new(),
        },
        None if weekly.is_empty() => candidates.to_vec(),
        None => candidates
            .iter()
            .copied()
            .filter(|slot| weekly.iter().any(|w| *slot >= w.start && *slot < w.end))
            .collect(),
    };

    windowed
        .into_iter()
        .filter(|slot| !booked.contains(slot))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeslot::candidate_slots;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // 2026-08-31 is a Monday.
    const MONDAY: (i32, u32, u32) = (2026, 8, 31);

    #[test]
    fn weekday_index_is_sunday_based() {
        assert_eq!(weekday_index(d(2026, 8, 30)), 0); // Sunday
        assert_eq!(weekday_index(d(MONDAY.0, MONDAY.1, MONDAY.2)), 1);
        assert_eq!(weekday_index(d(2026, 9, 5)), 6); // Saturday
    }

    #[test]
    fn dates_follow_weekly_rules_when_no_override() {
        let today = d(2026, 8, 29); // Saturday
        let open: HashSet<i16> = [1].into_iter().collect(); // Mondays only

        let dates = bookable_dates(today, 14, &open, &HashMap::new());
        assert_eq!(
            dates,
            vec![d(MONDAY.0, MONDAY.1, MONDAY.2), d(2026, 9, 7)]
        );
    }

    #[test]
    fn override_supersedes_weekly_rule_both_ways() {
        let today = d(2026, 8, 29);
        let open: HashSet<i16> = [1].into_iter().collect();

        // Unavailable override removes an otherwise open Monday.
        let mut overrides = HashMap::new();
        overrides.insert(d(MONDAY.0, MONDAY.1, MONDAY.2), false);
        let dates = bookable_dates(today, 14, &open, &overrides);
        assert_eq!(dates, vec![d(2026, 9, 7)]);

        // Available override opens a day with no weekly rule at all.
        let mut overrides = HashMap::new();
        overrides.insert(d(2026, 9, 2), true); // a Wednesday
        let dates = bookable_dates(today, 14, &open, &overrides);
        assert!(dates.contains(&d(2026, 9, 2)));
    }

    #[test]
    fn happy_path_monday_morning_window() {
        let weekly = [WeeklyWindow {
            start: t(9, 0),
            end: t(12, 0),
        }];

        let slots = open_slots(
            &candidate_slots(),
            &weekly,
            None,
            &HashSet::new(),
            OpenEndedExceptionPolicy::FullDay,
        );

        // End-exclusive: 12:00 itself is not offered.
        assert_eq!(slots, vec![t(9, 0), t(10, 0), t(11, 0)]);
    }

    #[test]
    fn booked_slot_is_excluded() {
        let weekly = [WeeklyWindow {
            start: t(9, 0),
            end: t(12, 0),
        }];
        let booked: HashSet<NaiveTime> = [t(10, 0)].into_iter().collect();

        let slots = open_slots(
            &candidate_slots(),
            &weekly,
            None,
            &booked,
            OpenEndedExceptionPolicy::FullDay,
        );
        assert_eq!(slots, vec![t(9, 0), t(11, 0)]);
    }

    #[test]
    fn unavailable_override_blanks_the_day_despite_rules() {
        let weekly = [WeeklyWindow {
            start: t(9, 0),
            end: t(17, 0),
        }];

        let slots = open_slots(
            &candidate_slots(),
            &weekly,
            Some(DateOverride {
                is_available: false,
                window: Some((t(9, 0), t(17, 0))),
            }),
            &HashSet::new(),
            OpenEndedExceptionPolicy::FullDay,
        );
        assert!(slots.is_empty());
    }

    #[test]
    fn available_override_window_replaces_weekly_windows() {
        let weekly = [WeeklyWindow {
            start: t(9, 0),
            end: t(17, 0),
        }];

        let slots = open_slots(
            &candidate_slots(),
            &weekly,
            Some(DateOverride {
                is_available: true,
                window: Some((t(14, 0), t(16, 0))),
            }),
            &HashSet::new(),
            OpenEndedExceptionPolicy::FullDay,
        );
        assert_eq!(slots, vec![t(14, 0), t(15, 0)]);
    }

    #[test]
    fn open_ended_override_follows_policy() {
        let full = open_slots(
            &candidate_slots(),
            &[],
            Some(DateOverride {
                is_available: true,
                window: None,
            }),
            &HashSet::new(),
            OpenEndedExceptionPolicy::FullDay,
        );
        assert_eq!(full.len(), 12);

        let none = open_slots(
            &candidate_slots(),
            &[],
            Some(DateOverride {
                is_available: true,
                window: None,
            }),
            &HashSet::new(),
            OpenEndedExceptionPolicy::NoSlots,
        );
        assert!(none.is_empty());
    }

    #[test]
    fn multiple_weekly_windows_union() {
        let weekly = [
            WeeklyWindow {
                start: t(9, 0),
                end: t(11, 0),
            },
            WeeklyWindow {
                start: t(15, 0),
                end: t(17, 0),
            },
        ];

        let slots = open_slots(
            &candidate_slots(),
            &weekly,
            None,
            &HashSet::new(),
            OpenEndedExceptionPolicy::FullDay,
        );
        assert_eq!(slots, vec![t(9, 0), t(10, 0), t(15, 0), t(16, 0)]);
    }

    #[test]
    fn output_is_ordered_by_time() {
        let weekly = [
            WeeklyWindow {
                start: t(18, 0),
                end: t(21, 0),
            },
            WeeklyWindow {
                start: t(9, 0),
                end: t(10, 0),
            },
        ];

        let slots = open_slots(
            &candidate_slots(),
            &weekly,
            None,
            &HashSet::new(),
            OpenEndedExceptionPolicy::FullDay,
        );
        let mut sorted = slots.clone();
        sorted.sort();
        assert_eq!(slots, sorted);
    }
}

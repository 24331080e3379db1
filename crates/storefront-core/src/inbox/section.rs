//! Dated inbox sections.
//!
//! Items are grouped into `Today`, `Yesterday`, `Last 7 days` and then one
//! section per calendar month, newest first. Day boundaries are local
//! midnights in the time zone of the reference instant, and earlier days are
//! reached by calendar-day subtraction so DST transitions are respected.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use super::InboxItem;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Step used to find the first valid local time of a day whose midnight
/// falls in a DST gap.
const GAP_SEARCH_STEP_MINUTES: u32 = 15;

/// The temporal bucket a section represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionGroup {
    /// Received since local midnight.
    Today,
    /// Received during the previous calendar day.
    Yesterday,
    /// Received during the five calendar days before yesterday.
    LastSevenDays,
    /// Anything older, bucketed by calendar month.
    Other {
        /// Month (1-12).
        month: u32,
        /// Calendar year.
        year: i32,
    },
}

impl SectionGroup {
    /// Stable identifier, suitable as a list key.
    #[must_use]
    pub fn id(&self) -> String {
        match self {
            Self::Today => "today".to_string(),
            Self::Yesterday => "yesterday".to_string(),
            Self::LastSevenDays => "last_seven_days".to_string(),
            Self::Other { month, year } => format!("other_{year}_{month}"),
        }
    }

    /// Section header text.
    ///
    /// Month sections only include the year when it differs from
    /// `current_year`.
    #[must_use]
    pub fn title(&self, current_year: i32) -> String {
        match self {
            Self::Today => "Today".to_string(),
            Self::Yesterday => "Yesterday".to_string(),
            Self::LastSevenDays => "Last 7 days".to_string(),
            Self::Other { month, year } => {
                let name = month
                    .checked_sub(1)
                    .and_then(|index| MONTH_NAMES.get(index as usize))
                    .copied()
                    .unwrap_or("Unknown");

                if *year == current_year {
                    name.to_string()
                } else {
                    format!("{name} {year}")
                }
            }
        }
    }
}

/// A group of inbox items sharing a temporal bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxSection {
    /// The bucket.
    pub group: SectionGroup,
    /// Items in source order.
    pub items: Vec<InboxItem>,
}

impl InboxSection {
    /// Stable identifier of the section.
    #[must_use]
    pub fn id(&self) -> String {
        self.group.id()
    }
}

/// Groups `items` into sections relative to the current local time.
#[must_use]
pub fn create_sections(items: &[InboxItem]) -> Vec<InboxSection> {
    create_sections_at(items, &Local::now())
}

/// Groups `items` into sections relative to `now`.
///
/// Every item lands in exactly one section and empty sections are omitted.
/// Sections are ordered `Today`, `Yesterday`, `LastSevenDays`, then month
/// sections from the most recent month backwards. Items keep their source
/// order within a section.
#[must_use]
pub fn create_sections_at<Tz: TimeZone>(
    items: &[InboxItem],
    now: &DateTime<Tz>,
) -> Vec<InboxSection> {
    let tz = now.timezone();
    let today = now.date_naive();

    let start_of_today = start_of_day(&tz, today);
    let start_of_yesterday = start_of_day(&tz, today - Days::new(1));
    let seven_days_ago = start_of_day(&tz, today - Days::new(7));

    let mut today_items = Vec::new();
    let mut yesterday_items = Vec::new();
    let mut last_seven_days_items = Vec::new();
    let mut by_month: BTreeMap<(i32, u32), Vec<InboxItem>> = BTreeMap::new();

    for item in items {
        let received_at = item.received_at;

        if received_at >= start_of_today {
            today_items.push(item.clone());
        } else if received_at >= start_of_yesterday {
            yesterday_items.push(item.clone());
        } else if received_at >= seven_days_ago {
            last_seven_days_items.push(item.clone());
        } else {
            let local = received_at.with_timezone(&tz);
            by_month
                .entry((local.year(), local.month()))
                .or_default()
                .push(item.clone());
        }
    }

    let fixed = [
        (SectionGroup::Today, today_items),
        (SectionGroup::Yesterday, yesterday_items),
        (SectionGroup::LastSevenDays, last_seven_days_items),
    ];

    let mut sections: Vec<InboxSection> = fixed
        .into_iter()
        .filter(|(_, items)| !items.is_empty())
        .map(|(group, items)| InboxSection { group, items })
        .collect();

    sections.extend(
        by_month
            .into_iter()
            .rev()
            .map(|((year, month), items)| InboxSection {
                group: SectionGroup::Other { month, year },
                items,
            }),
    );

    tracing::trace!(
        items = items.len(),
        sections = sections.len(),
        "Grouped inbox items"
    );

    sections
}

/// First instant of `date` in `tz`.
///
/// When local midnight is skipped by a DST transition, the earliest valid
/// local time of that day is used instead.
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or(NaiveDateTime::MIN);

    (0..24 * 60)
        .step_by(GAP_SEARCH_STEP_MINUTES as usize)
        .filter_map(|minutes: u32| date.and_hms_opt(minutes / 60, minutes % 60, 0))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map_or_else(|| midnight.and_utc(), |start| start.with_timezone(&Utc))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::inbox::NotificationPayload;
    use chrono::{Duration, FixedOffset, LocalResult, NaiveDate, Offset};

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn item(id: &str, received_at: DateTime<Utc>) -> InboxItem {
        InboxItem::new(
            id,
            received_at,
            NotificationPayload {
                id: format!("notification-{id}"),
                kind: "re.notifica.notification.Alert".to_string(),
                title: None,
                message: format!("Message {id}"),
            },
        )
    }

    /// A zone that springs forward once, skipping the local hour that starts
    /// at `transition`.
    #[derive(Debug, Clone, Copy)]
    struct SpringForward {
        transition: NaiveDateTime,
        standard: FixedOffset,
        daylight: FixedOffset,
    }

    #[derive(Debug, Clone, Copy)]
    struct SpringForwardOffset {
        zone: SpringForward,
        offset: FixedOffset,
    }

    impl Offset for SpringForwardOffset {
        fn fix(&self) -> FixedOffset {
            self.offset
        }
    }

    impl SpringForward {
        fn new(transition: &str, standard_hours: i32) -> Self {
            Self {
                transition: NaiveDateTime::parse_from_str(transition, "%Y-%m-%dT%H:%M:%S")
                    .unwrap(),
                standard: FixedOffset::east_opt(standard_hours * 3600).unwrap(),
                daylight: FixedOffset::east_opt((standard_hours + 1) * 3600).unwrap(),
            }
        }

        fn offset(self, offset: FixedOffset) -> SpringForwardOffset {
            SpringForwardOffset { zone: self, offset }
        }
    }

    impl TimeZone for SpringForward {
        type Offset = SpringForwardOffset;

        fn from_offset(offset: &Self::Offset) -> Self {
            offset.zone
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<Self::Offset> {
            self.offset_from_local_datetime(&local.and_hms_opt(12, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<Self::Offset> {
            if *local < self.transition {
                LocalResult::Single(self.offset(self.standard))
            } else if *local < self.transition + Duration::hours(1) {
                LocalResult::None
            } else {
                LocalResult::Single(self.offset(self.daylight))
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> Self::Offset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(12, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> Self::Offset {
            let utc_transition =
                self.transition - Duration::seconds(i64::from(self.standard.local_minus_utc()));
            if *utc < utc_transition {
                self.offset(self.standard)
            } else {
                self.offset(self.daylight)
            }
        }
    }

    fn ids(section: &InboxSection) -> Vec<&str> {
        section.items.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn test_empty_input_yields_no_sections() {
        let now = utc("2024-03-15T10:00:00Z");
        assert!(create_sections_at(&[], &now).is_empty());
    }

    #[test]
    fn test_mixed_buckets() {
        let now = utc("2024-03-15T10:00:00Z");
        let items = vec![
            item("1", utc("2024-03-15T09:00:00Z")),
            item("2", utc("2024-03-14T08:00:00Z")),
            item("3", utc("2024-03-01T00:00:00Z")),
            item("4", utc("2024-01-10T00:00:00Z")),
        ];

        let sections = create_sections_at(&items, &now);

        let groups: Vec<_> = sections.iter().map(|s| s.group).collect();
        assert_eq!(
            groups,
            vec![
                SectionGroup::Today,
                SectionGroup::Yesterday,
                SectionGroup::Other { month: 3, year: 2024 },
                SectionGroup::Other { month: 1, year: 2024 },
            ]
        );
        assert_eq!(ids(&sections[0]), vec!["1"]);
        assert_eq!(ids(&sections[1]), vec!["2"]);
        assert_eq!(ids(&sections[2]), vec!["3"]);
        assert_eq!(ids(&sections[3]), vec!["4"]);
    }

    #[test]
    fn test_boundaries_are_lower_inclusive() {
        let now = utc("2024-03-15T10:00:00Z");
        let items = vec![
            item("today", utc("2024-03-15T00:00:00Z")),
            item("yesterday", utc("2024-03-14T00:00:00Z")),
            item("late-yesterday", utc("2024-03-14T23:59:59Z")),
            item("week", utc("2024-03-08T00:00:00Z")),
            item("older", utc("2024-03-07T23:59:59Z")),
        ];

        let sections = create_sections_at(&items, &now);

        assert_eq!(sections[0].group, SectionGroup::Today);
        assert_eq!(ids(&sections[0]), vec!["today"]);
        assert_eq!(sections[1].group, SectionGroup::Yesterday);
        assert_eq!(ids(&sections[1]), vec!["yesterday", "late-yesterday"]);
        assert_eq!(sections[2].group, SectionGroup::LastSevenDays);
        assert_eq!(ids(&sections[2]), vec!["week"]);
        assert_eq!(sections[3].group, SectionGroup::Other { month: 3, year: 2024 });
        assert_eq!(ids(&sections[3]), vec!["older"]);
    }

    #[test]
    fn test_future_items_count_as_today() {
        let now = utc("2024-03-15T10:00:00Z");
        let items = vec![item("future", now + Duration::hours(30))];

        let sections = create_sections_at(&items, &now);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].group, SectionGroup::Today);
    }

    #[test]
    fn test_month_sections_keep_source_order() {
        let now = utc("2024-03-15T10:00:00Z");
        let items = vec![
            item("a", utc("2023-12-01T00:00:00Z")),
            item("b", utc("2024-02-20T00:00:00Z")),
            item("c", utc("2023-12-31T00:00:00Z")),
            item("d", utc("2024-02-01T00:00:00Z")),
        ];

        let sections = create_sections_at(&items, &now);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].group, SectionGroup::Other { month: 2, year: 2024 });
        assert_eq!(ids(&sections[0]), vec!["b", "d"]);
        assert_eq!(sections[1].group, SectionGroup::Other { month: 12, year: 2023 });
        assert_eq!(ids(&sections[1]), vec!["a", "c"]);
    }

    #[test]
    fn test_uses_reference_time_zone() {
        // 21:30 UTC on the 14th is already the 15th at +05:00.
        let offset = FixedOffset::east_opt(5 * 3600).unwrap();
        let now = offset.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let items = vec![
            item("local-today", utc("2024-03-14T21:30:00Z")),
            item("local-yesterday", utc("2024-03-14T18:59:59Z")),
        ];

        let sections = create_sections_at(&items, &now);

        assert_eq!(sections[0].group, SectionGroup::Today);
        assert_eq!(ids(&sections[0]), vec!["local-today"]);
        assert_eq!(sections[1].group, SectionGroup::Yesterday);
        assert_eq!(ids(&sections[1]), vec!["local-yesterday"]);
    }

    #[test]
    fn test_month_bucket_uses_local_calendar() {
        // 2024-01-31T22:00Z is February 1st at +03:00.
        let offset = FixedOffset::east_opt(3 * 3600).unwrap();
        let now = offset.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let items = vec![item("feb", utc("2024-01-31T22:00:00Z"))];

        let sections = create_sections_at(&items, &now);
        assert_eq!(sections[0].group, SectionGroup::Other { month: 2, year: 2024 });
    }

    #[test]
    fn test_day_bounds_after_spring_forward() {
        // New York, 2024-03-10: 02:00 EST jumps to 03:00 EDT, so that day
        // has 23 hours and yesterday started at 05:00Z, not 04:00Z.
        let new_york = SpringForward::new("2024-03-10T02:00:00", -5);
        let now = new_york.with_ymd_and_hms(2024, 3, 11, 10, 0, 0).unwrap();
        let items = vec![
            item("y", utc("2024-03-10T05:00:00Z")),
            item("pre-y", utc("2024-03-10T04:59:59Z")),
            item("w", utc("2024-03-04T05:00:00Z")),
            item("pre-w", utc("2024-03-04T04:59:59Z")),
        ];

        let sections = create_sections_at(&items, &now);

        let groups: Vec<_> = sections.iter().map(|s| (s.group, ids(s))).collect();
        assert_eq!(
            groups,
            vec![
                (SectionGroup::Yesterday, vec!["y"]),
                (SectionGroup::LastSevenDays, vec!["pre-y", "w"]),
                (SectionGroup::Other { month: 3, year: 2024 }, vec!["pre-w"]),
            ]
        );
    }

    #[test]
    fn test_skipped_midnight_starts_day_at_first_valid_time() {
        // Havana, 2024-03-10: midnight CST jumps to 01:00 CDT.
        let havana = SpringForward::new("2024-03-10T00:00:00", -5);
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(start_of_day(&havana, date), utc("2024-03-10T05:00:00Z"));

        let now = havana.with_ymd_and_hms(2024, 3, 10, 10, 0, 0).unwrap();
        let items = vec![
            item("today", utc("2024-03-10T05:00:00Z")),
            item("yesterday", utc("2024-03-10T04:59:59Z")),
        ];

        let sections = create_sections_at(&items, &now);

        assert_eq!(sections[0].group, SectionGroup::Today);
        assert_eq!(ids(&sections[0]), vec!["today"]);
        assert_eq!(sections[1].group, SectionGroup::Yesterday);
        assert_eq!(ids(&sections[1]), vec!["yesterday"]);
    }

    #[test]
    fn test_same_input_same_output() {
        let now = utc("2024-03-15T10:00:00Z");
        let items = vec![
            item("1", utc("2024-03-15T09:00:00Z")),
            item("2", utc("2023-06-14T08:00:00Z")),
        ];

        assert_eq!(
            create_sections_at(&items, &now),
            create_sections_at(&items, &now)
        );
    }

    #[test]
    fn test_section_ids() {
        assert_eq!(SectionGroup::Today.id(), "today");
        assert_eq!(SectionGroup::Yesterday.id(), "yesterday");
        assert_eq!(SectionGroup::LastSevenDays.id(), "last_seven_days");
        assert_eq!(
            SectionGroup::Other { month: 3, year: 2024 }.id(),
            "other_2024_3"
        );
    }

    #[test]
    fn test_section_titles() {
        assert_eq!(SectionGroup::Today.title(2024), "Today");
        assert_eq!(SectionGroup::LastSevenDays.title(2024), "Last 7 days");
        assert_eq!(SectionGroup::Other { month: 3, year: 2024 }.title(2024), "March");
        assert_eq!(
            SectionGroup::Other { month: 12, year: 2023 }.title(2024),
            "December 2023"
        );
        assert_eq!(SectionGroup::Other { month: 0, year: 2024 }.title(2024), "Unknown");
    }
}

use crate::models::{Bucket, DailyCheckIn, Elapsed, Timestamped, UrgePoint, parse_instant};
use chrono::{DateTime, Duration, Months, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChartWindow {
    #[default]
    Week,
    Month,
    Year,
}

impl ChartWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartWindow::Week => "week",
            ChartWindow::Month => "month",
            ChartWindow::Year => "year",
        }
    }

    /// Earliest instant still inside the window ending at `now`.
    pub fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let earlier = match self {
            ChartWindow::Week => now.checked_sub_signed(Duration::days(7)),
            ChartWindow::Month => now.checked_sub_months(Months::new(1)),
            ChartWindow::Year => now.checked_sub_months(Months::new(12)),
        };
        earlier.unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn label(self, instant: DateTime<Utc>) -> String {
        match self {
            ChartWindow::Week | ChartWindow::Month => day_label(instant),
            ChartWindow::Year => instant.format("%b %y").to_string(),
        }
    }
}

pub fn bucket_counts<T: Timestamped>(records: &[T], window: ChartWindow) -> Vec<Bucket> {
    bucket_counts_at(Utc::now(), records, window)
}

/// Counts records per label, buckets in first-seen label order.
///
/// Records are not sorted first, so an unsorted input yields buckets out of
/// calendar order. Records after `now` are kept.
pub fn bucket_counts_at<T: Timestamped>(
    now: DateTime<Utc>,
    records: &[T],
    window: ChartWindow,
) -> Vec<Bucket> {
    let cutoff = window.cutoff(now);
    let mut buckets: Vec<Bucket> = Vec::new();

    for instant in records
        .iter()
        .filter_map(Timestamped::instant)
        .filter(|instant| *instant >= cutoff)
    {
        let label = window.label(instant);
        match buckets.iter_mut().find(|bucket| bucket.label == label) {
            Some(bucket) => bucket.count = bucket.count.saturating_add(1),
            None => buckets.push(Bucket { label, count: 1 }),
        }
    }

    buckets
}

/// One point per check-in, oldest first. Unreadable dates are skipped.
pub fn urge_series<'a>(check_ins: impl IntoIterator<Item = &'a DailyCheckIn>) -> Vec<UrgePoint> {
    let mut dated: Vec<_> = check_ins
        .into_iter()
        .filter_map(|check_in| check_in.instant().map(|instant| (instant, check_in)))
        .collect();
    dated.sort_by_key(|(instant, _)| *instant);

    dated
        .into_iter()
        .map(|(instant, check_in)| UrgePoint {
            date: day_label(instant),
            urge: check_in.urge_intensity,
            mood: check_in.mood.clone(),
            notes: check_in.notes.clone(),
        })
        .collect()
}

pub fn streak_elapsed(start: &str) -> Elapsed {
    streak_elapsed_at(Utc::now(), start)
}

pub fn streak_elapsed_at(now: DateTime<Utc>, start: &str) -> Elapsed {
    let Some(start) = parse_instant(start) else {
        return Elapsed::default();
    };
    let total = (now - start).num_seconds();
    if total < 0 {
        return Elapsed::default();
    }

    Elapsed {
        days: total / 86_400,
        hours: total % 86_400 / 3_600,
        minutes: total % 3_600 / 60,
        seconds: total % 60,
    }
}

fn day_label(instant: DateTime<Utc>) -> String {
    instant.format("%b %-d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RelapseIncident, format_instant};
    use chrono::TimeZone;

    fn relapse_at(instant: DateTime<Utc>) -> RelapseIncident {
        RelapseIncident {
            date: format_instant(instant),
            ..RelapseIncident::default()
        }
    }

    fn check_in(date: &str, urge: u8) -> DailyCheckIn {
        DailyCheckIn {
            date: date.to_string(),
            urge_intensity: urge,
            ..DailyCheckIn::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 9, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn week_window_boundaries() {
        let records = vec![
            relapse_at(now() - Duration::days(8)),
            relapse_at(now() - Duration::days(6)),
        ];
        let buckets = bucket_counts_at(now(), &records, ChartWindow::Week);
        assert_eq!(
            buckets,
            vec![Bucket {
                label: "Sep 14".to_string(),
                count: 1
            }]
        );
    }

    #[test]
    fn records_exactly_at_the_cutoff_are_counted() {
        let cases = [
            (ChartWindow::Week, Utc.with_ymd_and_hms(2023, 9, 13, 12, 0, 0).unwrap(), "Sep 13"),
            (ChartWindow::Month, Utc.with_ymd_and_hms(2023, 8, 20, 12, 0, 0).unwrap(), "Aug 20"),
            (ChartWindow::Year, Utc.with_ymd_and_hms(2022, 9, 20, 12, 0, 0).unwrap(), "Sep 22"),
        ];
        for (window, edge, label) in cases {
            assert_eq!(window.cutoff(now()), edge);

            let just_before = edge - Duration::milliseconds(1);
            let records = vec![relapse_at(just_before), relapse_at(edge)];
            let buckets = bucket_counts_at(now(), &records, window);
            assert_eq!(
                buckets,
                vec![Bucket {
                    label: label.to_string(),
                    count: 1
                }],
                "{window:?}"
            );
        }
    }

    #[test]
    fn same_label_merges() {
        let records = vec![
            relapse_at(Utc.with_ymd_and_hms(2023, 9, 15, 1, 0, 0).unwrap()),
            relapse_at(Utc.with_ymd_and_hms(2023, 9, 15, 23, 0, 0).unwrap()),
        ];
        for window in [ChartWindow::Week, ChartWindow::Month] {
            let buckets = bucket_counts_at(now(), &records, window);
            assert_eq!(buckets.len(), 1);
            assert_eq!(buckets[0].label, "Sep 15");
            assert_eq!(buckets[0].count, 2);
        }
    }

    #[test]
    fn buckets_keep_first_seen_order() {
        let records = vec![
            relapse_at(Utc.with_ymd_and_hms(2023, 9, 18, 0, 0, 0).unwrap()),
            relapse_at(Utc.with_ymd_and_hms(2023, 9, 14, 0, 0, 0).unwrap()),
            relapse_at(Utc.with_ymd_and_hms(2023, 9, 18, 6, 0, 0).unwrap()),
        ];
        let labels: Vec<_> = bucket_counts_at(now(), &records, ChartWindow::Week)
            .into_iter()
            .map(|bucket| (bucket.label, bucket.count))
            .collect();
        assert_eq!(
            labels,
            vec![("Sep 18".to_string(), 2), ("Sep 14".to_string(), 1)]
        );
    }

    #[test]
    fn year_window_labels_by_month() {
        let records = vec![
            relapse_at(Utc.with_ymd_and_hms(2023, 9, 1, 0, 0, 0).unwrap()),
            relapse_at(Utc.with_ymd_and_hms(2023, 9, 19, 0, 0, 0).unwrap()),
            relapse_at(Utc.with_ymd_and_hms(2022, 10, 3, 0, 0, 0).unwrap()),
            relapse_at(Utc.with_ymd_and_hms(2022, 9, 19, 0, 0, 0).unwrap()),
        ];
        let buckets = bucket_counts_at(now(), &records, ChartWindow::Year);
        assert_eq!(
            buckets,
            vec![
                Bucket {
                    label: "Sep 23".to_string(),
                    count: 2
                },
                Bucket {
                    label: "Oct 22".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn month_cutoff_clamps_day() {
        let march_31 = Utc.with_ymd_and_hms(2023, 3, 31, 10, 0, 0).unwrap();
        assert_eq!(
            ChartWindow::Month.cutoff(march_31),
            Utc.with_ymd_and_hms(2023, 2, 28, 10, 0, 0).unwrap()
        );
        let leap_day = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        assert_eq!(
            ChartWindow::Year.cutoff(leap_day),
            Utc.with_ymd_and_hms(2023, 2, 28, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn future_and_unreadable_records() {
        let records = vec![
            relapse_at(now() + Duration::days(30)),
            RelapseIncident {
                date: "not a date".to_string(),
                ..RelapseIncident::default()
            },
        ];
        let buckets = bucket_counts_at(now(), &records, ChartWindow::Week);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].label, "Oct 20");
    }

    #[test]
    fn empty_input_has_no_buckets() {
        let records: Vec<RelapseIncident> = Vec::new();
        assert!(bucket_counts_at(now(), &records, ChartWindow::Year).is_empty());
    }

    #[test]
    fn urge_series_sorted_without_merging() {
        let check_ins = vec![
            check_in("2023-10-03T21:00:00.000Z", 6),
            check_in("2023-10-02T20:00:00.000Z", 2),
            check_in("2023-10-02T08:00:00.000Z", 4),
            check_in("garbage", 9),
        ];
        let points = urge_series(&check_ins);
        let pairs: Vec<_> = points.iter().map(|p| (p.date.as_str(), p.urge)).collect();
        assert_eq!(pairs, vec![("Oct 2", 4), ("Oct 2", 2), ("Oct 3", 6)]);
    }

    #[test]
    fn elapsed_breaks_down_duration() {
        let start = now() - Duration::seconds(2 * 86_400 + 3 * 3_600 + 4 * 60 + 5);
        let elapsed = streak_elapsed_at(now(), &format_instant(start));
        assert_eq!(
            elapsed,
            Elapsed {
                days: 2,
                hours: 3,
                minutes: 4,
                seconds: 5
            }
        );
    }

    #[test]
    fn elapsed_is_zero_for_future_or_bad_start() {
        let future = format_instant(now() + Duration::hours(1));
        assert_eq!(streak_elapsed_at(now(), &future), Elapsed::default());
        assert_eq!(streak_elapsed_at(now(), ""), Elapsed::default());
    }
}

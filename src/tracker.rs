//! In-memory collections and the operations that change them.

use crate::models::{
    CheckInDraft, DailyCheckIn, DashboardResponse, ImportSummary, MAX_URGE, MIN_URGE, Profile,
    RelapseDraft, RelapseIncident, Snapshot, Timestamped, WeeklyReport, WeeklyReportDraft,
    format_instant,
};
use crate::stats::streak_elapsed_at;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    #[error("no profile with id '{0}'")]
    UnknownProfile(String),
    #[error("profile name must not be blank")]
    BlankName,
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),
}

#[derive(Debug, Clone, Default)]
pub struct Tracker {
    data: Snapshot,
}

impl Tracker {
    pub fn new(data: Snapshot) -> Self {
        Self { data }
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.data.users
    }

    pub fn profile(&self, id: &str) -> Result<&Profile, TrackerError> {
        self.data
            .users
            .iter()
            .find(|profile| profile.id == id)
            .ok_or_else(|| TrackerError::UnknownProfile(id.to_string()))
    }

    pub fn relapses_for<'a>(&'a self, profile_id: &'a str) -> impl Iterator<Item = &'a RelapseIncident> {
        self.data
            .relapses
            .iter()
            .filter(move |relapse| relapse.user_id == profile_id)
    }

    pub fn reports_for<'a>(&'a self, profile_id: &'a str) -> impl Iterator<Item = &'a WeeklyReport> {
        self.data
            .reports
            .iter()
            .filter(move |report| report.user_id == profile_id)
    }

    pub fn check_ins_for<'a>(&'a self, profile_id: &'a str) -> impl Iterator<Item = &'a DailyCheckIn> {
        self.data
            .daily_check_ins
            .iter()
            .filter(move |check_in| check_in.user_id == profile_id)
    }

    pub fn add_profile(&mut self, name: &str, now: DateTime<Utc>) -> Result<Profile, TrackerError> {
        if name.trim().is_empty() {
            return Err(TrackerError::BlankName);
        }
        let profile = Profile {
            id: next_id(now, self.data.users.iter().map(|profile| profile.id.as_str())),
            name: name.to_string(),
            streak_start_date: format_instant(now),
        };
        self.data.users.push(profile.clone());
        Ok(profile)
    }

    /// Appends the incident and restarts the owner's streak at its timestamp.
    pub fn log_relapse(
        &mut self,
        profile_id: &str,
        draft: RelapseDraft,
        now: DateTime<Utc>,
    ) -> Result<RelapseIncident, TrackerError> {
        self.profile(profile_id)?;
        let relapse = RelapseIncident {
            id: next_id(now, self.data.relapses.iter().map(|r| r.id.as_str())),
            user_id: profile_id.to_string(),
            date: format_instant(now),
            trigger: draft.trigger,
            situation: draft.situation,
            missed_plan: draft.missed_plan,
            emotion: draft.emotion,
            improvement_plan: draft.improvement_plan,
        };
        self.data.relapses.push(relapse.clone());

        if let Some(profile) = self.data.users.iter_mut().find(|p| p.id == profile_id) {
            profile.streak_start_date = relapse.date.clone();
        }
        Ok(relapse)
    }

    pub fn add_weekly_report(
        &mut self,
        profile_id: &str,
        draft: WeeklyReportDraft,
        now: DateTime<Utc>,
    ) -> Result<WeeklyReport, TrackerError> {
        self.profile(profile_id)?;
        let report = WeeklyReport {
            id: next_id(now, self.data.reports.iter().map(|r| r.id.as_str())),
            user_id: profile_id.to_string(),
            report_date: format_instant(now),
            week_start_date: format_instant(now - Duration::days(7)),
            total_relapses: draft.total_relapses,
            helpful_factors: draft.helpful_factors,
            difficult_factors: draft.difficult_factors,
            warning_signs: draft.warning_signs,
            emergency_plan_success: draft.emergency_plan_success,
            focus_next_week: draft.focus_next_week,
        };
        self.data.reports.push(report.clone());
        Ok(report)
    }

    pub fn add_check_in(
        &mut self,
        profile_id: &str,
        draft: CheckInDraft,
        now: DateTime<Utc>,
    ) -> Result<DailyCheckIn, TrackerError> {
        self.profile(profile_id)?;
        let urge = draft
            .urge_intensity
            .clamp(i64::from(MIN_URGE), i64::from(MAX_URGE));
        let check_in = DailyCheckIn {
            id: next_id(now, self.data.daily_check_ins.iter().map(|c| c.id.as_str())),
            user_id: profile_id.to_string(),
            date: format_instant(now),
            mood: draft.mood,
            urge_intensity: u8::try_from(urge).unwrap_or(MIN_URGE),
            notes: draft.notes,
        };
        self.data.daily_check_ins.push(check_in.clone());
        Ok(check_in)
    }

    /// Profile view: only records owned by the profile, newest first.
    pub fn dashboard(&self, profile_id: &str, now: DateTime<Utc>) -> Result<DashboardResponse, TrackerError> {
        let profile = self.profile(profile_id)?.clone();
        Ok(DashboardResponse {
            elapsed: streak_elapsed_at(now, &profile.streak_start_date),
            relapses: newest_first(self.relapses_for(profile_id)),
            reports: newest_first(self.reports_for(profile_id)),
            daily_check_ins: newest_first(self.check_ins_for(profile_id)),
            profile,
        })
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.data
    }

    /// Replaces every collection present as an array in `text`.
    ///
    /// Either every provided collection is replaced or nothing changes.
    pub fn import(&mut self, text: &str) -> Result<ImportSummary, TrackerError> {
        let document: Value = serde_json::from_str(text)
            .map_err(|err| TrackerError::MalformedSnapshot(err.to_string()))?;
        let Value::Object(mut fields) = document else {
            return Err(TrackerError::MalformedSnapshot(
                "top level is not an object".to_string(),
            ));
        };

        let users: Option<Vec<Profile>> = take_collection(&mut fields, "users")?;
        let relapses: Option<Vec<RelapseIncident>> = take_collection(&mut fields, "relapses")?;
        let reports: Option<Vec<WeeklyReport>> = take_collection(&mut fields, "reports")?;
        let check_ins: Option<Vec<DailyCheckIn>> = take_collection(&mut fields, "dailyCheckIns")?;

        let mut summary = ImportSummary::default();
        if let Some(users) = users {
            self.data.users = users;
            summary.replaced.push("users".to_string());
        }
        if let Some(relapses) = relapses {
            self.data.relapses = relapses;
            summary.replaced.push("relapses".to_string());
        }
        if let Some(reports) = reports {
            self.data.reports = reports;
            summary.replaced.push("reports".to_string());
        }
        if let Some(check_ins) = check_ins {
            self.data.daily_check_ins = check_ins;
            summary.replaced.push("dailyCheckIns".to_string());
        }

        summary.users = self.data.users.len();
        summary.relapses = self.data.relapses.len();
        summary.reports = self.data.reports.len();
        summary.daily_check_ins = self.data.daily_check_ins.len();
        Ok(summary)
    }
}

fn take_collection<T: DeserializeOwned>(
    fields: &mut serde_json::Map<String, Value>,
    key: &str,
) -> Result<Option<Vec<T>>, TrackerError> {
    match fields.remove(key) {
        Some(value @ Value::Array(_)) => serde_json::from_value(value)
            .map(Some)
            .map_err(|err| TrackerError::MalformedSnapshot(format!("{key}: {err}"))),
        _ => Ok(None),
    }
}

fn newest_first<'a, T: Timestamped + Clone + 'a>(records: impl Iterator<Item = &'a T>) -> Vec<T> {
    let mut records: Vec<T> = records.cloned().collect();
    records.sort_by_key(|record| std::cmp::Reverse(record.instant()));
    records
}

/// Millisecond timestamp, bumped past any numeric id already taken.
///
/// When the highest taken id is `i64::MAX` the id gets a `-n` suffix
/// instead, with the smallest `n` not already in use.
fn next_id<'a>(now: DateTime<Utc>, taken: impl Iterator<Item = &'a str>) -> String {
    let taken: HashSet<&str> = taken.collect();
    let candidate = now.timestamp_millis();
    let highest = taken.iter().filter_map(|id| id.parse::<i64>().ok()).max();

    let numeric = match highest {
        Some(highest) if highest >= candidate => highest.checked_add(1),
        _ => Some(candidate),
    };
    match numeric {
        Some(id) => id.to_string(),
        None => (1u64..)
            .map(|n| format!("{candidate}-{n}"))
            .find(|id| !taken.contains(id.as_str()))
            .unwrap_or_else(|| candidate.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::RecordParser;
    use crate::seed::seed_snapshot;
    use chrono::TimeZone;

    fn seeded() -> Tracker {
        Tracker::new(seed_snapshot(&RecordParser::default()))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 11, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn relapse_resets_streak() {
        let mut tracker = seeded();
        let before = tracker.profile("1").unwrap().streak_start_date.clone();

        let relapse = tracker
            .log_relapse(
                "1",
                RelapseDraft {
                    trigger: "Conflict".to_string(),
                    ..RelapseDraft::default()
                },
                now(),
            )
            .unwrap();

        let profile = tracker.profile("1").unwrap();
        assert_eq!(profile.streak_start_date, relapse.date);
        assert_ne!(profile.streak_start_date, before);
        assert_eq!(relapse.user_id, "1");
        assert_eq!(tracker.relapses_for("1").count(), 3);
        assert_eq!(tracker.profile("2").unwrap().streak_start_date, "2023-10-25T08:30:00.000Z");
    }

    #[test]
    fn unknown_profile_is_rejected() {
        let mut tracker = seeded();
        let err = tracker
            .add_check_in("404", CheckInDraft::default(), now())
            .unwrap_err();
        assert_eq!(err, TrackerError::UnknownProfile("404".to_string()));
        assert_eq!(tracker.snapshot().daily_check_ins.len(), 2);
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut tracker = seeded();
        assert_eq!(tracker.add_profile("   ", now()), Err(TrackerError::BlankName));
        let profile = tracker.add_profile("Sam", now()).unwrap();
        assert_eq!(profile.streak_start_date, "2023-11-01T09:00:00.000Z");
        assert_eq!(tracker.profiles().len(), 3);
    }

    #[test]
    fn ids_stay_unique_within_a_millisecond() {
        let mut tracker = Tracker::default();
        let first = tracker.add_profile("A", now()).unwrap();
        let second = tracker.add_profile("B", now()).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn weekly_report_starts_seven_days_back() {
        let mut tracker = seeded();
        let report = tracker
            .add_weekly_report("2", WeeklyReportDraft::default(), now())
            .unwrap();
        assert_eq!(report.week_start_date, "2023-10-25T09:00:00.000Z");
    }

    #[test]
    fn check_in_urge_is_clamped() {
        let mut tracker = seeded();
        let high = CheckInDraft {
            urge_intensity: 42,
            ..CheckInDraft::default()
        };
        let low = CheckInDraft {
            urge_intensity: -3,
            ..CheckInDraft::default()
        };
        assert_eq!(tracker.add_check_in("1", high, now()).unwrap().urge_intensity, 10);
        assert_eq!(tracker.add_check_in("1", low, now()).unwrap().urge_intensity, 1);
    }

    #[test]
    fn dashboard_hides_orphans_and_sorts_newest_first() {
        let mut snapshot = seed_snapshot(&RecordParser::default());
        snapshot.relapses.push(RelapseIncident {
            id: "999".to_string(),
            user_id: "ghost".to_string(),
            date: "2023-10-30T00:00:00.000Z".to_string(),
            ..RelapseIncident::default()
        });
        let tracker = Tracker::new(snapshot);

        let dashboard = tracker.dashboard("1", now()).unwrap();
        let ids: Vec<_> = dashboard.relapses.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["102", "101"]);
        assert_eq!(dashboard.daily_check_ins[0].id, "302");
        assert_eq!(dashboard.elapsed.days, 30);
    }

    #[test]
    fn import_replaces_only_provided_collections() {
        let mut tracker = seeded();
        let summary = tracker
            .import(r#"{"relapses":[{"id":"9","userId":"2","date":"2023-10-26T00:00:00.000Z","trigger":"Isolation","situation":"","missedPlan":"","emotion":"","improvementPlan":""}]}"#)
            .unwrap();

        assert_eq!(summary.replaced, vec!["relapses"]);
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.relapses.len(), 1);
        assert_eq!(snapshot.relapses[0].trigger, "Isolation");
        assert_eq!(snapshot.users.len(), 2);
        assert_eq!(snapshot.reports.len(), 1);
        assert_eq!(snapshot.daily_check_ins.len(), 2);
    }

    #[test]
    fn import_ignores_non_array_keys() {
        let mut tracker = seeded();
        let summary = tracker.import(r#"{"users":"nope","reports":[]}"#).unwrap();
        assert_eq!(summary.replaced, vec!["reports"]);
        assert_eq!(tracker.profiles().len(), 2);
        assert!(tracker.snapshot().reports.is_empty());
    }

    #[test]
    fn malformed_import_keeps_prior_state() {
        let mut tracker = seeded();
        let before = tracker.snapshot().clone();

        assert!(tracker.import("{ not json").is_err());
        assert!(tracker.import("[1, 2]").is_err());
        assert!(tracker.import(r#"{"users":[],"relapses":[42]}"#).is_err());

        assert_eq!(tracker.snapshot(), &before);
    }

    #[test]
    fn export_round_trips_through_import() {
        let mut tracker = seeded();
        tracker.add_profile("Sam", now()).unwrap();
        let exported = serde_json::to_string(tracker.snapshot()).unwrap();

        let mut fresh = Tracker::default();
        let summary = fresh.import(&exported).unwrap();
        assert_eq!(summary.replaced.len(), 4);
        assert_eq!(fresh.snapshot(), tracker.snapshot());
    }

    #[test]
    fn ids_survive_the_largest_numeric_id() {
        let mut tracker = seeded();
        tracker
            .import(r#"{"users":[{"id":"9223372036854775807","name":"Max","streakStartDate":""}]}"#)
            .unwrap();

        let first = tracker.add_profile("Next", now()).unwrap();
        let second = tracker.add_profile("After", now()).unwrap();

        assert_eq!(first.id, format!("{}-1", now().timestamp_millis()));
        assert_eq!(second.id, format!("{}-2", now().timestamp_millis()));
        assert_eq!(tracker.profiles().len(), 3);
    }

    #[test]
    fn import_coerces_loose_field_values() {
        let mut tracker = seeded();
        tracker
            .import(
                r#"{
                    "users":[{"id":1,"name":"Ann","streakStartDate":"2023-10-01T12:00:00.000Z"}],
                    "reports":[{"id":5,"userId":1,"totalRelapses":"many"}],
                    "dailyCheckIns":[
                        {"id":"a","userId":"1","urgeIntensity":0},
                        {"id":"b","userId":"1","urgeIntensity":300},
                        {"id":"c","userId":"1","urgeIntensity":"8"}
                    ]
                }"#,
            )
            .unwrap();

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.users[0].id, "1");
        assert_eq!(snapshot.reports[0].user_id, "1");
        assert_eq!(snapshot.reports[0].total_relapses, 0);
        let urges: Vec<_> = snapshot.daily_check_ins.iter().map(|c| c.urge_intensity).collect();
        assert_eq!(urges, vec![1, 1, 8]);
        assert!(tracker.dashboard("1", now()).is_ok());
    }
}

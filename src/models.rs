use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const TRIGGER_CATEGORIES: [&str; 6] = [
    "Stress/Fatigue",
    "Conflict",
    "Boredom",
    "Isolation",
    "Aimless Browsing",
    "Other",
];

pub const MOOD_LABELS: [&str; 5] = ["Great", "Good", "Neutral", "Down", "Stressed"];

pub const MIN_URGE: u8 = 1;
pub const MAX_URGE: u8 = 10;

/// Urge values outside [MIN_URGE, MAX_URGE] fall back to MIN_URGE.
pub fn coerce_urge(value: i64) -> u8 {
    u8::try_from(value)
        .ok()
        .filter(|urge| (MIN_URGE..=MAX_URGE).contains(urge))
        .unwrap_or(MIN_URGE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Profile,
    Relapse,
    WeeklyReport,
    CheckIn,
}

impl RecordKind {
    /// Snapshot key, also used as the CSV export path segment.
    pub fn key(self) -> &'static str {
        match self {
            RecordKind::Profile => "users",
            RecordKind::Relapse => "relapses",
            RecordKind::WeeklyReport => "reports",
            RecordKind::CheckIn => "dailyCheckIns",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "users" => Some(RecordKind::Profile),
            "relapses" => Some(RecordKind::Relapse),
            "reports" => Some(RecordKind::WeeklyReport),
            "dailyCheckIns" => Some(RecordKind::CheckIn),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    pub name: String,
    pub streak_start_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RelapseIncident {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(deserialize_with = "lenient::id")]
    pub user_id: String,
    pub date: String,
    pub trigger: String,
    pub situation: String,
    pub missed_plan: String,
    pub emotion: String,
    pub improvement_plan: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WeeklyReport {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(deserialize_with = "lenient::id")]
    pub user_id: String,
    pub report_date: String,
    pub week_start_date: String,
    #[serde(deserialize_with = "lenient::count")]
    pub total_relapses: u32,
    pub helpful_factors: String,
    pub difficult_factors: String,
    pub warning_signs: String,
    pub emergency_plan_success: String,
    pub focus_next_week: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyCheckIn {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(deserialize_with = "lenient::id")]
    pub user_id: String,
    pub date: String,
    pub mood: String,
    #[serde(deserialize_with = "lenient::urge")]
    pub urge_intensity: u8,
    pub notes: String,
}

impl Default for DailyCheckIn {
    fn default() -> Self {
        Self {
            id: String::new(),
            user_id: String::new(),
            date: String::new(),
            mood: String::new(),
            urge_intensity: MIN_URGE,
            notes: String::new(),
        }
    }
}

/// One record of any kind, as produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Profile(Profile),
    Relapse(RelapseIncident),
    WeeklyReport(WeeklyReport),
    CheckIn(DailyCheckIn),
}

/// Anything carrying the instant the chart and ordering code works with.
pub trait Timestamped {
    fn timestamp(&self) -> &str;

    fn instant(&self) -> Option<DateTime<Utc>> {
        parse_instant(self.timestamp())
    }
}

impl Timestamped for Profile {
    fn timestamp(&self) -> &str {
        &self.streak_start_date
    }
}

impl Timestamped for RelapseIncident {
    fn timestamp(&self) -> &str {
        &self.date
    }
}

impl Timestamped for WeeklyReport {
    fn timestamp(&self) -> &str {
        &self.report_date
    }
}

impl Timestamped for DailyCheckIn {
    fn timestamp(&self) -> &str {
        &self.date
    }
}

pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|instant| instant.with_timezone(&Utc))
}

pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// The export/import document.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub users: Vec<Profile>,
    pub relapses: Vec<RelapseIncident>,
    pub reports: Vec<WeeklyReport>,
    pub daily_check_ins: Vec<DailyCheckIn>,
}

impl Snapshot {
    pub fn push(&mut self, record: Record) {
        match record {
            Record::Profile(profile) => self.users.push(profile),
            Record::Relapse(relapse) => self.relapses.push(relapse),
            Record::WeeklyReport(report) => self.reports.push(report),
            Record::CheckIn(check_in) => self.daily_check_ins.push(check_in),
        }
    }
}

impl Extend<Record> for Snapshot {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, records: I) {
        for record in records {
            self.push(record);
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewProfileRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RelapseDraft {
    pub trigger: String,
    pub situation: String,
    pub missed_plan: String,
    pub emotion: String,
    pub improvement_plan: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WeeklyReportDraft {
    pub total_relapses: u32,
    pub helpful_factors: String,
    pub difficult_factors: String,
    pub warning_signs: String,
    pub emergency_plan_success: String,
    pub focus_next_week: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckInDraft {
    pub mood: String,
    pub urge_intensity: i64,
    pub notes: String,
}

impl Default for CheckInDraft {
    fn default() -> Self {
        Self {
            mood: "Neutral".to_string(),
            urge_intensity: i64::from(MIN_URGE),
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Elapsed {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgePoint {
    pub date: String,
    pub urge: u8,
    pub mood: String,
    pub notes: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakResponse {
    pub streak_start_date: String,
    pub elapsed: Elapsed,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub profile: Profile,
    pub elapsed: Elapsed,
    pub relapses: Vec<RelapseIncident>,
    pub reports: Vec<WeeklyReport>,
    pub daily_check_ins: Vec<DailyCheckIn>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartResponse {
    pub window: String,
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub replaced: Vec<String>,
    pub users: usize,
    pub relapses: usize,
    pub reports: usize,
    pub daily_check_ins: usize,
}

/// Field readers for imported documents. Numbers and ids written by other
/// tools are accepted in either string or number form.
mod lenient {
    use super::{MIN_URGE, coerce_urge};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(id) => Ok(id),
            Value::Number(id) => Ok(id.to_string()),
            Value::Null => Ok(String::new()),
            other => Err(D::Error::custom(format!(
                "expected a string or number id, got {other}"
            ))),
        }
    }

    pub fn urge<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(integer(&value).map_or(MIN_URGE, coerce_urge))
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(integer(&value)
            .and_then(|count| u32::try_from(count).ok())
            .unwrap_or(0))
    }

    fn integer(value: &Value) -> Option<i64> {
        match value {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

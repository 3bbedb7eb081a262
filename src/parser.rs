//! Delimited record parsing and writing.
//!
//! Column order is fixed per record kind; the header row is skipped and
//! never inspected. Parsing never fails: short rows are padded with empty
//! strings and bad numbers fall back to a per-field default.

use crate::models::{
    DailyCheckIn, MIN_URGE, Profile, Record, RecordKind, RelapseIncident, WeeklyReport,
    coerce_urge,
};
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use tracing::warn;

pub const DEFAULT_DELIMITER: u8 = b',';

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("failed to write delimited rows: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush delimited rows: {0}")]
    Io(#[from] std::io::Error),
    #[error("delimited output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A record kind with a fixed positional column layout.
pub trait DelimitedRecord: Sized {
    const KIND: RecordKind;
    const COLUMNS: &'static [&'static str];

    fn from_fields(fields: &mut Fields) -> Self;

    fn to_fields(&self) -> Vec<String>;
}

/// Unquoted fields of one data row, consumed left to right.
pub struct Fields {
    values: std::vec::IntoIter<String>,
}

impl Fields {
    pub fn new(values: Vec<String>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }

    pub fn text(&mut self) -> String {
        self.values.next().unwrap_or_default()
    }

    /// Relapse counts fall back to 0.
    pub fn count(&mut self) -> u32 {
        parse_count(&self.text())
    }

    /// Urge intensity falls back to 1, also when out of range.
    pub fn intensity(&mut self) -> u8 {
        parse_intensity(&self.text())
    }
}

pub fn parse_count(raw: &str) -> u32 {
    raw.trim().parse().unwrap_or(0)
}

pub fn parse_intensity(raw: &str) -> u8 {
    raw.trim()
        .parse::<i64>()
        .ok()
        .map_or(MIN_URGE, coerce_urge)
}

#[derive(Debug, Clone, Copy)]
pub struct RecordParser {
    delimiter: u8,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl RecordParser {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// One record per data row, in input order.
    ///
    /// A delimiter or line break between double quotes stays inside the
    /// field, and `""` inside a quoted field reads as one quote.
    pub fn parse<T: DelimitedRecord>(&self, text: &str) -> Vec<T> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(text.trim_start().as_bytes());

        reader
            .records()
            .filter_map(|row| match row {
                Ok(row) => Some(row),
                Err(err) => {
                    warn!("skipping unreadable {} row: {err}", T::KIND.key());
                    None
                }
            })
            .map(|row| {
                let values = row.iter().map(str::to_string).collect();
                T::from_fields(&mut Fields::new(values))
            })
            .collect()
    }

    pub fn parse_kind(&self, kind: RecordKind, text: &str) -> Vec<Record> {
        match kind {
            RecordKind::Profile => wrap(self.parse::<Profile>(text), Record::Profile),
            RecordKind::Relapse => wrap(self.parse::<RelapseIncident>(text), Record::Relapse),
            RecordKind::WeeklyReport => wrap(self.parse::<WeeklyReport>(text), Record::WeeklyReport),
            RecordKind::CheckIn => wrap(self.parse::<DailyCheckIn>(text), Record::CheckIn),
        }
    }

    /// Header row plus one row per record, in column order. Fields holding
    /// the delimiter, a quote or a line break are quoted.
    pub fn write<T: DelimitedRecord>(&self, records: &[T]) -> Result<String, WriteError> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(QuoteStyle::Necessary)
            .from_writer(Vec::new());

        writer.write_record(T::COLUMNS)?;
        for record in records {
            writer.write_record(record.to_fields())?;
        }

        let bytes = writer.into_inner().map_err(|err| err.into_error())?;
        Ok(String::from_utf8(bytes)?)
    }
}

fn wrap<T>(records: Vec<T>, tag: fn(T) -> Record) -> Vec<Record> {
    records.into_iter().map(tag).collect()
}

impl DelimitedRecord for Profile {
    const KIND: RecordKind = RecordKind::Profile;
    const COLUMNS: &'static [&'static str] = &["id", "name", "streakStartDate"];

    fn from_fields(fields: &mut Fields) -> Self {
        Self {
            id: fields.text(),
            name: fields.text(),
            streak_start_date: fields.text(),
        }
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.streak_start_date.clone(),
        ]
    }
}

impl DelimitedRecord for RelapseIncident {
    const KIND: RecordKind = RecordKind::Relapse;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "userId",
        "date",
        "trigger",
        "situation",
        "missedPlan",
        "emotion",
        "improvementPlan",
    ];

    fn from_fields(fields: &mut Fields) -> Self {
        Self {
            id: fields.text(),
            user_id: fields.text(),
            date: fields.text(),
            trigger: fields.text(),
            situation: fields.text(),
            missed_plan: fields.text(),
            emotion: fields.text(),
            improvement_plan: fields.text(),
        }
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.user_id.clone(),
            self.date.clone(),
            self.trigger.clone(),
            self.situation.clone(),
            self.missed_plan.clone(),
            self.emotion.clone(),
            self.improvement_plan.clone(),
        ]
    }
}

impl DelimitedRecord for WeeklyReport {
    const KIND: RecordKind = RecordKind::WeeklyReport;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "userId",
        "reportDate",
        "weekStartDate",
        "totalRelapses",
        "helpfulFactors",
        "difficultFactors",
        "warningSigns",
        "emergencyPlanSuccess",
        "focusNextWeek",
    ];

    fn from_fields(fields: &mut Fields) -> Self {
        Self {
            id: fields.text(),
            user_id: fields.text(),
            report_date: fields.text(),
            week_start_date: fields.text(),
            total_relapses: fields.count(),
            helpful_factors: fields.text(),
            difficult_factors: fields.text(),
            warning_signs: fields.text(),
            emergency_plan_success: fields.text(),
            focus_next_week: fields.text(),
        }
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.user_id.clone(),
            self.report_date.clone(),
            self.week_start_date.clone(),
            self.total_relapses.to_string(),
            self.helpful_factors.clone(),
            self.difficult_factors.clone(),
            self.warning_signs.clone(),
            self.emergency_plan_success.clone(),
            self.focus_next_week.clone(),
        ]
    }
}

impl DelimitedRecord for DailyCheckIn {
    const KIND: RecordKind = RecordKind::CheckIn;
    const COLUMNS: &'static [&'static str] =
        &["id", "userId", "date", "mood", "urgeIntensity", "notes"];

    fn from_fields(fields: &mut Fields) -> Self {
        Self {
            id: fields.text(),
            user_id: fields.text(),
            date: fields.text(),
            mood: fields.text(),
            urge_intensity: fields.intensity(),
            notes: fields.text(),
        }
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.user_id.clone(),
            self.date.clone(),
            self.mood.clone(),
            self.urge_intensity.to_string(),
            self.notes.clone(),
        ]
    }
}

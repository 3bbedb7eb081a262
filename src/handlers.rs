use crate::errors::AppError;
use crate::models::{
    ChartResponse, CheckInDraft, DailyCheckIn, DashboardResponse, ImportSummary, NewProfileRequest,
    Profile, RecordKind, RelapseDraft, RelapseIncident, Snapshot, StreakResponse, UrgePoint,
    WeeklyReport, WeeklyReportDraft,
};
use crate::parser::{DelimitedRecord, RecordParser, WriteError};
use crate::state::AppState;
use crate::stats::{ChartWindow, bucket_counts, streak_elapsed, urge_series};
use crate::storage::export_file_name;
use crate::tracker::TrackerError;
use crate::ui::render_index;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse},
};
use chrono::{Local, Utc};
use serde::Deserialize;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    #[serde(default)]
    pub window: ChartWindow,
}

pub async fn index() -> Html<String> {
    Html(render_index())
}

pub async fn list_profiles(State(state): State<AppState>) -> Json<Vec<Profile>> {
    let tracker = state.tracker.lock().await;
    Json(tracker.profiles().to_vec())
}

pub async fn create_profile(
    State(state): State<AppState>,
    Json(payload): Json<NewProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    let mut tracker = state.tracker.lock().await;
    let profile = tracker.add_profile(&payload.name, Utc::now())?;
    info!("created profile {}", profile.id);
    Ok(Json(profile))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DashboardResponse>, AppError> {
    let tracker = state.tracker.lock().await;
    Ok(Json(tracker.dashboard(&id, Utc::now())?))
}

pub async fn get_streak(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StreakResponse>, AppError> {
    let tracker = state.tracker.lock().await;
    let profile = tracker.profile(&id)?;
    Ok(Json(StreakResponse {
        elapsed: streak_elapsed(&profile.streak_start_date),
        streak_start_date: profile.streak_start_date.clone(),
    }))
}

pub async fn log_relapse(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<RelapseDraft>,
) -> Result<Json<RelapseIncident>, AppError> {
    let mut tracker = state.tracker.lock().await;
    let relapse = tracker.log_relapse(&id, draft, Utc::now())?;
    info!("logged relapse {} for profile {id}, streak reset", relapse.id);
    Ok(Json(relapse))
}

pub async fn add_weekly_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<WeeklyReportDraft>,
) -> Result<Json<WeeklyReport>, AppError> {
    let mut tracker = state.tracker.lock().await;
    let report = tracker.add_weekly_report(&id, draft, Utc::now())?;
    info!("added weekly report {} for profile {id}", report.id);
    Ok(Json(report))
}

pub async fn add_check_in(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<CheckInDraft>,
) -> Result<Json<DailyCheckIn>, AppError> {
    let mut tracker = state.tracker.lock().await;
    let check_in = tracker.add_check_in(&id, draft, Utc::now())?;
    info!("added check-in {} for profile {id}", check_in.id);
    Ok(Json(check_in))
}

pub async fn relapse_chart(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartResponse>, AppError> {
    let tracker = state.tracker.lock().await;
    tracker.profile(&id)?;
    let relapses: Vec<RelapseIncident> = tracker.relapses_for(&id).cloned().collect();
    Ok(Json(ChartResponse {
        window: query.window.as_str().to_string(),
        buckets: bucket_counts(&relapses, query.window),
    }))
}

pub async fn urge_chart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<UrgePoint>>, AppError> {
    let tracker = state.tracker.lock().await;
    tracker.profile(&id)?;
    Ok(Json(urge_series(tracker.check_ins_for(&id))))
}

pub async fn export_snapshot(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let tracker = state.tracker.lock().await;
    let payload = serde_json::to_string_pretty(tracker.snapshot()).map_err(AppError::internal)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(Local::now().date_naive())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        payload,
    ))
}

pub async fn export_delimited(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let kind = RecordKind::from_key(&kind)
        .ok_or_else(|| AppError::not_found(format!("unknown collection '{kind}'")))?;
    let tracker = state.tracker.lock().await;
    let text = write_collection(&state.parser, tracker.snapshot(), kind)?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], text))
}

pub async fn import_snapshot(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ImportSummary>, AppError> {
    let mut tracker = state.tracker.lock().await;
    let imported = std::str::from_utf8(&body)
        .map_err(|err| TrackerError::MalformedSnapshot(err.to_string()))
        .and_then(|text| tracker.import(text));
    match imported {
        Ok(summary) => {
            info!("imported snapshot (replaced: {})", summary.replaced.join(", "));
            Ok(Json(summary))
        }
        Err(err) => {
            error!("rejected snapshot import: {err}");
            Err(err.into())
        }
    }
}

fn write_collection(
    parser: &RecordParser,
    snapshot: &Snapshot,
    kind: RecordKind,
) -> Result<String, WriteError> {
    match kind {
        RecordKind::Profile => write_logged(parser, &snapshot.users),
        RecordKind::Relapse => write_logged(parser, &snapshot.relapses),
        RecordKind::WeeklyReport => write_logged(parser, &snapshot.reports),
        RecordKind::CheckIn => write_logged(parser, &snapshot.daily_check_ins),
    }
}

fn write_logged<T: DelimitedRecord>(
    parser: &RecordParser,
    records: &[T],
) -> Result<String, WriteError> {
    info!("exporting {} {} rows", records.len(), T::KIND.key());
    parser.write(records)
}

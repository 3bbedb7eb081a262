use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/profiles",
            get(handlers::list_profiles).post(handlers::create_profile),
        )
        .route("/api/profiles/:id", get(handlers::get_dashboard))
        .route("/api/profiles/:id/streak", get(handlers::get_streak))
        .route("/api/profiles/:id/relapses", post(handlers::log_relapse))
        .route("/api/profiles/:id/reports", post(handlers::add_weekly_report))
        .route("/api/profiles/:id/check-ins", post(handlers::add_check_in))
        .route("/api/profiles/:id/charts/relapses", get(handlers::relapse_chart))
        .route("/api/profiles/:id/charts/urges", get(handlers::urge_chart))
        .route("/api/export", get(handlers::export_snapshot))
        .route("/api/export/:kind", get(handlers::export_delimited))
        .route("/api/import", post(handlers::import_snapshot))
        .with_state(state)
}

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::constants::DEFAULT_DAILY_DAYS;
use crate::extractors::QueryParams;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_summary))
        .route("/daily", get(get_daily_series))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryQuery {
    #[serde(default)]
    key_id: String,
}

async fn get_summary(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SummaryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let summary = state.counter().summary(&query.key_id)?;
    Ok(ok(summary))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyQuery {
    #[serde(default)]
    key_id: String,
    days: Option<u32>,
}

async fn get_daily_series(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<DailyQuery>,
) -> Result<impl IntoResponse, AppError> {
    let days = query.days.unwrap_or(DEFAULT_DAILY_DAYS);
    let series = state.counter().daily_series(&query.key_id, days)?;
    Ok(ok(series))
}

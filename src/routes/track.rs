use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;

use crate::counter::TrackingEvent;
use crate::extractors::JsonBody;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(track_event))
}

async fn track_event(
    State(state): State<AppState>,
    JsonBody(event): JsonBody<TrackingEvent>,
) -> Result<impl IntoResponse, AppError> {
    let ack = state.counter().record(&event).await?;
    Ok(ok(ack))
}

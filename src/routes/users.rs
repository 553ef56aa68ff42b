use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::state::AppState;
use crate::store::operations::projects::Project;
use crate::store::operations::users::User;
use crate::validation::{first_blank, is_valid_email};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/:email", get(get_user).patch(update_user))
        .route("/:email/projects", get(list_projects).post(create_project))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest {
    email: String,
}

async fn create_user(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = req.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::bad_request("USER_INVALID_EMAIL", "email is not valid"));
    }

    let user = User {
        email,
        is_active: true,
        created_at: Utc::now(),
    };
    state.store().create_user(&user)?;
    tracing::info!(email = %user.email, "User created");
    Ok(created(user))
}

async fn get_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .store()
        .get_user(&email)?
        .ok_or_else(|| AppError::not_found("user not found"))?;
    Ok(ok(user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUserRequest {
    is_active: bool,
}

async fn update_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
    JsonBody(req): JsonBody<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.store().set_user_active(&email, req.is_active)?;
    Ok(ok(user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProjectRequest {
    #[serde(default)]
    key: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    image: String,
    date: Option<DateTime<Utc>>,
}

async fn create_project(
    State(state): State<AppState>,
    Path(email): Path<String>,
    JsonBody(req): JsonBody<CreateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    let required = [
        ("key", req.key.as_str()),
        ("name", req.name.as_str()),
        ("image", req.image.as_str()),
    ];
    if let Some(field) = first_blank(&required) {
        return Err(AppError::bad_request(
            "VALIDATION_ERROR",
            &format!("missing required field: {field}"),
        ));
    }

    let project = Project {
        key: req.key.trim().to_string(),
        name: req.name.trim().to_string(),
        image: req.image.trim().to_string(),
        date: req.date.unwrap_or_else(Utc::now),
        user_email: email.trim().to_lowercase(),
    };
    state.store().create_project(&project)?;
    tracing::info!(email = %project.user_email, key = %project.key, "Project created");
    Ok(created(project))
}

async fn list_projects(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if state.store().get_user(&email)?.is_none() {
        return Err(AppError::not_found("user not found"));
    }
    let projects = state.store().list_user_projects(&email)?;
    Ok(ok(projects))
}

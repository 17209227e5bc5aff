//! HTTP route handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::store::{Record, StoreError, TaskLog};
use crate::streak;

use super::dashboard;
use super::types::*;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Reference clock for "today"; swapped for a fixed clock in tests
    pub clock: Arc<dyn Clock>,
    /// One storage handle per configured user, resolved at startup
    logs: HashMap<String, TaskLog>,
}

impl AppState {
    pub fn new(config: Config, clock: Arc<dyn Clock>) -> Self {
        let logs = config
            .users
            .iter()
            .map(|user| (user.clone(), TaskLog::new(config.log_path(user))))
            .collect();
        Self {
            config,
            clock,
            logs,
        }
    }

    /// Storage handle for one user, if configured.
    pub fn log(&self, user: &str) -> Option<&TaskLog> {
        self.logs.get(user)
    }
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.data_dir)?;

    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(config, Arc::new(SystemClock)));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard::page))
        .route("/api/health", get(health))
        .route("/api/overview", get(get_overview))
        .route("/api/users", get(list_users))
        .route("/api/users/:user/log", get(get_log))
        .route("/api/users/:user/log/latest", put(edit_latest))
        .route("/api/users/:user/export", get(export_log))
        .route("/api/tasks", post(submit_task))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wait for a shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Error responses carry a status code and a JSON body.
pub(super) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(super) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub(super) fn store_error(e: StoreError) -> ApiError {
    tracing::error!("record log failure: {}", e);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "record log failure")
}

fn unknown_user(user: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, format!("unknown user: {}", user))
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Per-user streak and progress summary for the whole board.
async fn get_overview(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OverviewResponse>, ApiError> {
    let today = state.clock.today();
    let mut users = Vec::with_capacity(state.config.users.len());
    for user in &state.config.users {
        let log = state.log(user).ok_or_else(|| unknown_user(user))?;
        let records = log.read().map_err(store_error)?;
        users.push(UserOverview::build(
            user,
            &records,
            today,
            state.config.challenge_days,
        ));
    }
    Ok(Json(OverviewResponse {
        challenge_days: state.config.challenge_days,
        users,
    }))
}

/// List the configured participants.
async fn list_users(State(state): State<Arc<AppState>>) -> Json<UsersResponse> {
    Json(UsersResponse {
        users: state.config.users.clone(),
    })
}

/// Full record table for one user.
async fn get_log(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> Result<Json<LogResponse>, ApiError> {
    let log = state.log(&user).ok_or_else(|| unknown_user(&user))?;
    let records = log.read().map_err(store_error)?;
    Ok(Json(LogResponse {
        user,
        records: records.iter().map(RecordView::from_record).collect(),
    }))
}

/// Submit today's task for a user.
async fn submit_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitTaskRequest>,
) -> Result<(StatusCode, Json<SubmitTaskResponse>), ApiError> {
    let log = state.log(&req.user).ok_or_else(|| unknown_user(&req.user))?;

    let task = req.task.trim();
    if task.is_empty() {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "task text must not be empty",
        ));
    }

    let records = log.read().map_err(store_error)?;
    if !streak::is_submission_allowed(&records, state.clock.today()) {
        return Err(api_error(
            StatusCode::CONFLICT,
            "today's work is already submitted; edit the latest entry instead",
        ));
    }

    let record = Record::new(task, state.clock.now().naive_local());
    log.append(&record).map_err(store_error)?;
    tracing::info!("{} submitted today's work", req.user);

    Ok((
        StatusCode::CREATED,
        Json(SubmitTaskResponse {
            user: req.user,
            record: RecordView::from_record(&record),
        }),
    ))
}

/// Replace the task text of a user's most recent record.
async fn edit_latest(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    Json(req): Json<EditLatestRequest>,
) -> Result<Json<SubmitTaskResponse>, ApiError> {
    let log = state.log(&user).ok_or_else(|| unknown_user(&user))?;

    let task = req.task.trim();
    if task.is_empty() {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "task text must not be empty",
        ));
    }

    match log.edit_latest(task) {
        Ok(()) => {}
        Err(StoreError::EmptyLog) => {
            return Err(api_error(StatusCode::NOT_FOUND, "no records to edit"))
        }
        Err(e) => return Err(store_error(e)),
    }
    tracing::info!("{} edited their latest entry", user);

    // Re-read so the response reflects what is on disk.
    let records = log.read().map_err(store_error)?;
    let latest = records
        .iter()
        .max_by_key(|r| r.submitted_at)
        .map(RecordView::from_record)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "no records to edit"))?;

    Ok(Json(SubmitTaskResponse {
        user,
        record: latest,
    }))
}

/// Download one user's raw CSV log.
async fn export_log(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> Result<Response, ApiError> {
    let log = state.log(&user).ok_or_else(|| unknown_user(&user))?;
    let bytes = log
        .export()
        .map_err(store_error)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("{} has no log yet", user)))?;

    let disposition = format!("attachment; filename=\"{}_tasks.csv\"", user);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::assignment::AssignmentError;
use crate::auth::TokenIssuer;
use crate::persistence::{PersistenceError, TrackerStore};

mod assignments;
mod holidays;
mod tasks;
mod users;

pub use users::AuthenticatedUser;

/// Header carrying the session token on authenticated routes.
pub const TOKEN_HEADER: &str = "token";

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn TrackerStore>,
    tokens: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(store: Arc<dyn TrackerStore>, tokens: TokenIssuer) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
        }
    }

    fn store(&self) -> &dyn TrackerStore {
        self.store.as_ref()
    }

    fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug)]
pub enum ApiError {
    Invalid(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }

    fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        match value {
            PersistenceError::Conflict(message) => ApiError::Conflict(message),
            PersistenceError::NotFound => ApiError::not_found("record not found"),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<AssignmentError> for ApiError {
    fn from(value: AssignmentError) -> Self {
        match value {
            AssignmentError::InvalidStart(_) => ApiError::invalid("invalid date time format"),
            AssignmentError::UnknownUser(_) => ApiError::not_found("Username doesn't exist"),
            AssignmentError::UnknownTask(_) => ApiError::not_found("Task not found"),
            AssignmentError::AlreadyAssigned(_) => {
                ApiError::conflict("Task is already assigned to somebody")
            }
            AssignmentError::NotFound(_) => ApiError::not_found("Task Assignment not found"),
            AssignmentError::EstimateOutOfRange { .. } => {
                ApiError::invalid("estimated hours out of range")
            }
            AssignmentError::Store(err) => ApiError::from(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
            ApiError::Internal(message) => {
                error!(%message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Body of read/delete requests, which address a record by id.
#[derive(Debug, Deserialize)]
struct IdPayload {
    id: i64,
}

#[derive(Debug, Serialize)]
struct MessageBody {
    message: &'static str,
}

fn message(message: &'static str) -> Json<MessageBody> {
    Json(MessageBody { message })
}

/// Bodies are decoded by hand so that a missing content type or a
/// malformed document both surface as a 400 with the same message.
fn parse_payload<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| {
        debug!(error = %err, "rejected request payload");
        ApiError::invalid("Invalid request payload")
    })
}

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/refreshToken", get(users::refresh_token))
        .route("/user", put(users::update_password))
        .route(
            "/task",
            post(tasks::create_task)
                .get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route(
            "/task/id",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route(
            "/taskAssignment",
            post(assignments::create_assignment)
                .get(assignments::get_assignment)
                .put(assignments::update_assignment)
                .delete(assignments::delete_assignment),
        )
        .route(
            "/taskAssignment/id",
            get(assignments::get_assignment)
                .put(assignments::update_assignment)
                .delete(assignments::delete_assignment),
        )
        .route(
            "/holiday",
            post(holidays::create_holiday)
                .get(holidays::get_holiday)
                .put(holidays::update_holiday)
                .delete(holidays::delete_holiday),
        )
        .route(
            "/holiday/id",
            get(holidays::get_holiday)
                .put(holidays::update_holiday)
                .delete(holidays::delete_holiday),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    let api = Router::new()
        .route("/user", post(users::register))
        .route("/user/login", post(users::login))
        .nest("/v2", protected);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "task-tracker HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Validates the `token` header and hands the caller's identity to the
/// handler as an [`AuthenticatedUser`] request extension.
async fn require_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Token not present."))?;

    let claims = state
        .tokens()
        .validate(token)
        .map_err(|err| ApiError::unauthorized(err.to_string()))?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser::from(claims));
    Ok(next.run(request).await)
}

use axum::{Extension, Json, body::Bytes, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiError, AppState, MessageBody, message, parse_payload};
use crate::auth::{Claims, hash_password, verify_password};
use crate::model::{NewUser, User, UserChanges};
use crate::persistence::PersistenceError;

/// Identity of the caller behind a validated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
    pub email: String,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            email: claims.email,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct RegisterPayload {
    username: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct CredentialsPayload {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SessionBody {
    status: &'static str,
    msg: &'static str,
    token: String,
    user: User,
}

pub(super) async fn register(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageBody>), ApiError> {
    let payload: RegisterPayload = parse_payload(&body)?;
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::invalid("username and password are required"));
    }

    let store = state.store();
    if store.find_user_by_username(&payload.username)?.is_some() {
        return Err(ApiError::invalid("this username already exists"));
    }

    let password_hash =
        hash_password(&payload.password).map_err(|_| ApiError::invalid("hashing failed"))?;
    let created = store
        .insert_user(&NewUser {
            username: payload.username,
            name: payload.name,
            email: payload.email,
            password_hash,
        })
        .map_err(|err| match err {
            PersistenceError::Conflict(_) => ApiError::invalid("this username already exists"),
            other => ApiError::from(other),
        })?;

    info!(username = %created.username, "user registered");
    Ok((StatusCode::CREATED, message("User registered successfully")))
}

pub(super) async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SessionBody>), ApiError> {
    let payload: CredentialsPayload = parse_payload(&body)?;
    let user = state
        .store()
        .find_user_by_username(&payload.username)?
        .ok_or_else(|| ApiError::invalid("User not found."))?;

    let matches = verify_password(&payload.password, &user.password_hash)
        .map_err(|err| ApiError::internal(err.to_string()))?;
    if !matches {
        return Err(ApiError::unauthorized("Password doesn't match"));
    }

    let token = state
        .tokens()
        .issue(&user)
        .map_err(|err| ApiError::internal(err.to_string()))?;

    info!(username = %user.username, "user logged in");
    Ok((
        StatusCode::ACCEPTED,
        Json(SessionBody {
            status: "OK",
            msg: "User authenticated",
            token,
            user,
        }),
    ))
}

pub(super) async fn refresh_token(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<SessionBody>, ApiError> {
    let user = state
        .store()
        .find_user_by_username(&caller.username)?
        .ok_or_else(|| ApiError::not_found("Username not found."))?;
    let token = state
        .tokens()
        .issue(&user)
        .map_err(|err| ApiError::internal(err.to_string()))?;

    Ok(Json(SessionBody {
        status: "OK",
        msg: "Token refreshed",
        token,
        user,
    }))
}

pub(super) async fn update_password(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    body: Bytes,
) -> Result<Json<MessageBody>, ApiError> {
    let payload: CredentialsPayload = parse_payload(&body)?;
    if payload.username != caller.username {
        return Err(ApiError::unauthorized(
            "cannot change the password of another user",
        ));
    }
    if payload.password.is_empty() {
        return Err(ApiError::invalid("password is required"));
    }

    let store = state.store();
    if store.find_user_by_username(&payload.username)?.is_none() {
        return Err(ApiError::not_found("Username doesn't exist"));
    }

    let password_hash =
        hash_password(&payload.password).map_err(|_| ApiError::invalid("hashing failed"))?;
    let changes = UserChanges {
        password_hash: Some(password_hash),
        ..UserChanges::default()
    };
    store
        .update_user(&payload.username, &changes)?
        .ok_or_else(|| ApiError::not_found("Username doesn't exist"))?;

    info!(username = %payload.username, "password updated");
    Ok(message("Password updated successfully"))
}

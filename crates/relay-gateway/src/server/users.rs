//! User endpoints
//!
//! Registration, login (issues the chat resumption token) and the count of
//! users currently present in the chat.

use super::response::{ApiResult, ValidatedJson};
use super::GatewayState;
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue},
    Json,
};
use chrono::Duration;
use relay_common::{generate_token, AppError};
use relay_core::{ResumptionToken, User};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Value advertised in the `X-Rate-Limit` login header
pub const RATE_LIMIT: u32 = 100;

/// Path of the chat WebSocket endpoint
pub const CHAT_PATH: &str = "/chat/ws.rtm.start";

/// Body of the registration and login requests
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[serde(rename = "userName", deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Empty username or password"))]
    pub username: String,

    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Empty username or password"))]
    pub password: String,
}

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_string())
}

/// Public view of a registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    #[serde(rename = "userName")]
    pub username: String,
}

/// Login result: where to open the chat connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub url: String,
}

/// Number of users present in the chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveUsersResponse {
    pub count: usize,
}

/// Register a new user
///
/// POST /user
pub async fn create_user(
    State(state): State<GatewayState>,
    ValidatedJson(request): ValidatedJson<CredentialsRequest>,
) -> ApiResult<Json<UserResponse>> {
    if state
        .users()
        .get_by_username(&request.username)
        .await
        .map_err(AppError::from)?
        .is_some()
    {
        return Err(AppError::AlreadyExists(format!(
            "User with username {} already exists",
            request.username
        ))
        .into());
    }

    let password_hash = state.passwords().hash(&request.password)?;
    let user = User::new(request.username, password_hash);
    state.users().create(&user).await.map_err(AppError::from)?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(Json(UserResponse {
        id: user.id,
        username: user.username,
    }))
}

/// Log in and receive a one-time chat URL
///
/// POST /user/login
pub async fn login(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<CredentialsRequest>,
) -> ApiResult<(HeaderMap, Json<LoginResponse>)> {
    let user = state
        .users()
        .get_by_username(&request.username)
        .await
        .map_err(AppError::from)?
        .ok_or(AppError::InvalidCredentials)?;

    state
        .passwords()
        .verify_or_error(&request.password, &user.password_hash)?;

    let ttl = Duration::seconds(state.config().session.token_ttl_seconds);
    let token = ResumptionToken::new(generate_token(), user.id, ttl);
    state.tokens().create(&token).await.map_err(AppError::from)?;

    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map_or_else(|| state.config().gateway.address(), str::to_string);
    let url = format!("ws://{host}{CHAT_PATH}?token={}", token.token);

    let expires = token
        .expires_at
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string();

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        HeaderName::from_static("x-rate-limit"),
        HeaderValue::from(RATE_LIMIT),
    );
    response_headers.insert(
        HeaderName::from_static("x-expires-after"),
        HeaderValue::from_str(&expires).map_err(AppError::internal)?,
    );

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

    Ok((response_headers, Json(LoginResponse { url })))
}

/// Count users present in the chat
///
/// GET /user/active
pub async fn active_users(State(state): State<GatewayState>) -> Json<ActiveUsersResponse> {
    Json(ActiveUsersResponse {
        count: state.registry().present_count(),
    })
}

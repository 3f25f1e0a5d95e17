//! Chat WebSocket handler
//!
//! Checks the resumption token before upgrading, then hands the socket to a
//! `SessionCoordinator`.

use super::response::ApiResult;
use super::GatewayState;
use crate::coordinator::SessionCoordinator;
use crate::session::{FrameSink, SessionError, WebSocketSink, WireFrame};
use axum::{
    extract::{ws::WebSocket, ConnectInfo, Query, State, WebSocketUpgrade},
    response::Response,
};
use futures_util::StreamExt;
use relay_common::AppError;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;

/// Query string of the chat endpoint
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    #[serde(default)]
    pub token: String,
}

/// Chat WebSocket handler
///
/// GET /chat/ws.rtm.start?token=...
pub async fn chat_handler(
    State(state): State<GatewayState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Query(params): Query<ConnectParams>,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    check_token(&state, &params.token).await?;

    let remote_addr = connect_info.map_or_else(
        || "unknown".to_string(),
        |ConnectInfo(addr)| addr.to_string(),
    );
    let token = params.token;

    Ok(ws
        .on_failed_upgrade(|e: axum::Error| {
            let e = SessionError::ConnectionUpgradeFailed(e.to_string());
            tracing::warn!(error = %e, "WebSocket upgrade failed");
        })
        .on_upgrade(move |socket| handle_socket(state, socket, token, remote_addr)))
}

/// Reject tokens that cannot open a session
///
/// A token bound to a live session is accepted even though it has already
/// been consumed from the token store: that is a reconnect.
async fn check_token(state: &GatewayState, token: &str) -> Result<(), AppError> {
    if token.is_empty() {
        return Err(AppError::validation("Access token is required"));
    }

    if state.registry().resolve(token).is_some() {
        return Ok(());
    }

    match state.tokens().get(token).await? {
        Some(_) => Ok(()),
        None => Err(AppError::InvalidToken),
    }
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, socket: WebSocket, token: String, remote_addr: String) {
    tracing::info!(remote_addr = %remote_addr, "WebSocket connection established");

    let (sink, stream) = socket.split();
    let connection: Arc<dyn FrameSink> = Arc::new(WebSocketSink::new(sink));
    let frames = stream.map(|frame| frame.map(WireFrame::from));

    let mut coordinator = SessionCoordinator::new(state.chat().clone(), remote_addr.clone());
    coordinator.run(&token, connection, frames).await;

    tracing::info!(remote_addr = %remote_addr, "WebSocket connection finished");
}

//! Gateway server setup
//!
//! Routes, application state and the server runner.

mod handler;
mod response;
mod state;
mod users;

pub use handler::{chat_handler, ConnectParams};
pub use response::{ApiError, ApiResult, ValidatedJson};
pub use state::GatewayState;
pub use users::{
    active_users, create_user, login, ActiveUsersResponse, CredentialsRequest, LoginResponse,
    UserResponse, CHAT_PATH, RATE_LIMIT,
};

use crate::broadcast::{BroadcastDispatcher, DispatcherConfig};
use crate::coordinator::ChatContext;
use crate::session::SessionRegistry;
use axum::{
    routing::{get, post},
    Router,
};
use relay_common::{AppConfig, AppError};
use relay_store::{InMemoryMessageStore, InMemoryTokenStore, InMemoryUserStore};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/user", post(create_user))
        .route("/user/login", post(login))
        .route("/user/active", get(active_users))
        .route(CHAT_PATH, get(chat_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create stores, registry and dispatcher, and start the dispatcher
///
/// Must be called from within a tokio runtime.
pub fn create_gateway_state(config: AppConfig) -> GatewayState {
    let registry = SessionRegistry::new_shared();
    let users = Arc::new(InMemoryUserStore::new());
    let messages = Arc::new(InMemoryMessageStore::new());
    let tokens = Arc::new(InMemoryTokenStore::new());

    let dispatcher = Arc::new(BroadcastDispatcher::new(
        DispatcherConfig {
            workers: config.session.dispatcher_workers,
        },
        registry.clone(),
        users.clone(),
    ));
    dispatcher.start();

    let chat = ChatContext {
        registry,
        dispatcher,
        users,
        messages,
        tokens,
    };

    GatewayState::new(chat, config)
}

/// Serve the application until `shutdown` completes
pub async fn run_server<F>(app: Router, addr: &str, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| AppError::Config(format!("Failed to read local address: {e}")))?;

    tracing::info!("Gateway listening on http://{}", local_addr);
    tracing::info!("Chat endpoint at ws://{}{}", local_addr, CHAT_PATH);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.gateway.address();

    let state = create_gateway_state(config);
    let dispatcher = state.dispatcher();

    let app = create_app(state);
    run_server(app, &addr, shutdown_signal()).await?;

    dispatcher.shutdown().await;
    tracing::info!("Gateway stopped");

    Ok(())
}

/// Resolve on Ctrl-C
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

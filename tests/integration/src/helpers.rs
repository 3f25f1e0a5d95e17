//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers, making HTTP requests,
//! and driving chat WebSocket connections.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Result};
use futures_util::{SinkExt, StreamExt};
use relay_common::AppConfig;
use relay_gateway::{create_app, create_gateway_state};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::fixtures::{ActiveUsersResponse, ChatFrame, Credentials, LoginResponse, UserResponse};

/// How long a chat client waits for the next frame
const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_gateway_state(config);
        let app = create_app(state);

        // Port 0 lets the OS pick a free port
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .ok();
        });

        // Wait for server to be ready
        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            addr,
            client,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Chat endpoint URL with an arbitrary query string
    pub fn chat_url(&self, query: &str) -> String {
        format!("ws://{}{}{}", self.addr, relay_gateway::server::CHAT_PATH, query)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).json(body).send().await?)
    }

    /// Register a user and return the created record
    pub async fn register(&self, credentials: &Credentials) -> Result<UserResponse> {
        let response = self.post("/user", credentials).await?;
        assert_json(response, StatusCode::OK).await
    }

    /// Log in and return the connect URL
    pub async fn login(&self, credentials: &Credentials) -> Result<String> {
        let response = self.post("/user/login", credentials).await?;
        let body: LoginResponse = assert_json(response, StatusCode::OK).await?;
        Ok(body.url)
    }

    /// Register, log in and connect a fresh user
    pub async fn join(&self) -> Result<(Credentials, ChatClient)> {
        let credentials = Credentials::unique();
        self.register(&credentials).await?;
        let url = self.login(&credentials).await?;
        let client = ChatClient::connect(&url).await?;
        Ok((credentials, client))
    }

    /// Current presence count
    pub async fn active_count(&self) -> Result<usize> {
        let response = self.get("/user/active").await?;
        let body: ActiveUsersResponse = assert_json(response, StatusCode::OK).await?;
        Ok(body.count)
    }

    /// Poll the presence count until it reaches `expected`
    pub async fn wait_for_active(&self, expected: usize) -> Result<()> {
        for _ in 0..100 {
            if self.active_count().await? == expected {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        bail!("Active count never reached {expected}")
    }
}

/// Create a test configuration
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.session.dispatcher_workers = 4;
    config
}

/// A connected chat client
pub struct ChatClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl ChatClient {
    /// Connect using a URL returned by login
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _) = connect_async(url).await?;
        Ok(Self { stream })
    }

    /// Attempt a connection that the server is expected to refuse
    ///
    /// Returns the HTTP status of the refused upgrade.
    pub async fn rejected(url: &str) -> Result<StatusCode> {
        match connect_async(url).await {
            Ok(_) => bail!("Connection to {url} was accepted"),
            Err(tungstenite::Error::Http(response)) => {
                Ok(StatusCode::from_u16(response.status().as_u16())?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Send a chat message
    pub async fn say(&mut self, body: &str) -> Result<()> {
        let frame = serde_json::json!({ "message": body }).to_string();
        self.send_raw(frame).await
    }

    /// Send an arbitrary text frame
    pub async fn send_raw(&mut self, text: String) -> Result<()> {
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    /// Wait for the next text frame and parse it as JSON
    pub async fn next_json<T: DeserializeOwned>(&mut self) -> Result<T> {
        loop {
            let next = tokio::time::timeout(FRAME_TIMEOUT, self.stream.next()).await;
            match next {
                Err(_) => bail!("Timed out waiting for a frame"),
                Ok(None) => bail!("Connection closed"),
                Ok(Some(Err(e))) => return Err(e.into()),
                Ok(Some(Ok(Message::Text(text)))) => return Ok(serde_json::from_str(&text)?),
                Ok(Some(Ok(Message::Close(_)))) => bail!("Connection closed by server"),
                Ok(Some(Ok(_))) => {}
            }
        }
    }

    /// Wait for the next chat message
    pub async fn next_frame(&mut self) -> Result<ChatFrame> {
        self.next_json().await
    }

    /// Wait until the server closes the connection
    ///
    /// Text frames received before the close are returned.
    pub async fn closed(&mut self) -> Result<Vec<String>> {
        let mut pending = Vec::new();
        loop {
            let next = tokio::time::timeout(FRAME_TIMEOUT, self.stream.next()).await;
            match next {
                Err(_) => bail!("Timed out waiting for the connection to close"),
                Ok(None | Some(Err(_) | Ok(Message::Close(_)))) => return Ok(pending),
                Ok(Some(Ok(Message::Text(text)))) => pending.push(text),
                Ok(Some(Ok(_))) => {}
            }
        }
    }

    /// Close the connection from the client side
    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

//! Dashboard API Client
//!
//! HTTP collaborator that logs in and fetches the JSON payloads the views
//! seed themselves from. The views only see the [`DashboardApi`] trait.

use crate::models::{DashboardPayload, LoginRequest, LoginResponse, SessionUser};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

/// Token sent when no one has signed in
pub const DEMO_TOKEN: &str = "demo";

/// Data endpoints exposed by the dashboard API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Users,
    Products,
    Analytics,
    Dashboard,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Users => "/api/users",
            Endpoint::Products => "/api/products",
            Endpoint::Analytics => "/api/analytics",
            Endpoint::Dashboard => "/api/dashboard",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Source of dashboard data
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Exchange credentials for a token and remember it
    async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ClientError>;

    /// Fetch the raw JSON payload of an endpoint
    async fn fetch(&self, endpoint: Endpoint) -> Result<serde_json::Value, ClientError>;
}

/// Fetch and decode the overview payload
pub async fn fetch_dashboard(api: &dyn DashboardApi) -> Result<DashboardPayload, ClientError> {
    let payload = api.fetch(Endpoint::Dashboard).await?;
    serde_json::from_value(payload).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "https://task-api-eight-flax.vercel.app")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://task-api-eight-flax.vercel.app".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

/// Token and signed-in user, held in memory only
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<String>,
    user: Option<SessionUser>,
}

impl Session {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            user: None,
        }
    }

    /// Token for the `Authorization` header; `"demo"` when signed out
    pub fn bearer(&self) -> &str {
        self.token.as_deref().unwrap_or(DEMO_TOKEN)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn sign_in(&mut self, token: String, user: SessionUser) {
        self.token = Some(token);
        self.user = Some(user);
    }

    pub fn logout(&mut self) {
        self.token = None;
        self.user = None;
    }
}

/// reqwest-backed [`DashboardApi`]
pub struct DashboardClient {
    client: Client,
    config: ClientConfig,
    session: RwLock<Session>,
}

impl DashboardClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_session(config, Session::default())
    }

    pub fn with_session(config: ClientConfig, session: Session) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            config,
            session: RwLock::new(session),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn logout(&self) {
        self.session.write().await.logout();
        tracing::info!("Signed out");
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl DashboardApi for DashboardClient {
    async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .client
            .post(self.url("/api/login"))
            .json(&body)
            .send()
            .await
            .map_err(classify)?;

        if !response.status().is_success() {
            tracing::warn!(status = response.status().as_u16(), "Login rejected");
            return Err(ClientError::LoginFailed);
        }

        let result: LoginResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        let token = result.token.ok_or(ClientError::NoToken)?;

        let user = SessionUser {
            id: result.id,
            email: result.email,
        };
        self.session.write().await.sign_in(token, user.clone());
        tracing::info!(email = user.email.as_deref().unwrap_or(""), "Signed in");

        Ok(user)
    }

    async fn fetch(&self, endpoint: Endpoint) -> Result<serde_json::Value, ClientError> {
        let bearer = self.session.read().await.bearer().to_string();

        let response = self
            .client
            .get(self.url(endpoint.path()))
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        tracing::debug!(%endpoint, "Fetched payload");
        Ok(payload)
    }
}

fn classify(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout
    } else if e.is_connect() {
        ClientError::Unavailable
    } else {
        ClientError::Request(e)
    }
}

/// Errors that can occur when talking to the dashboard API
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Dashboard API unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Login failed. Check your credentials.")]
    LoginFailed,

    #[error("No token received.")]
    NoToken,

    #[error("Malformed response: {0}")]
    Decode(String),
}

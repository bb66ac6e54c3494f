//! The API client itself.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use log::{debug, info, warn};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use jw_model::{
    Envelope, GraphData, LoginRequest, LoginResponse, MonitoringZone, SensorReading, WarningResult,
};
use jw_session::{demo_session, Session, SessionHandle};
use jw_sync::MonitorSource;

use crate::error::ClientError;
use crate::notice::{Notice, NoticeSink};

/// Default API endpoint for a locally run server.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:48912";

/// Environment override for the API endpoint.
pub const SERVER_ENV: &str = "JELLYWATCH_SERVER";

/// Per-request timeout, covering connect through body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Pick the server URL: explicit flag first, then the environment, then the
/// local default.
pub fn resolve_server(explicit: Option<&str>) -> String {
    if let Some(url) = explicit {
        return url.to_string();
    }
    match std::env::var(SERVER_ENV) {
        Ok(url) if !url.is_empty() => url,
        _ => DEFAULT_SERVER.to_string(),
    }
}

/// Authenticated client over the monitoring API.
///
/// Cheap to clone; clones share the HTTP connection pool, the session
/// handle, and the notice sink.
#[derive(Clone)]
pub struct MonitorClient {
    http: reqwest::Client,
    base: String,
    session: Arc<SessionHandle>,
    notices: Arc<dyn NoticeSink>,
    demo: bool,
}

impl MonitorClient {
    pub fn new(
        server: &str,
        session: Arc<SessionHandle>,
        notices: Arc<dyn NoticeSink>,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building http client")?;
        Ok(MonitorClient {
            http,
            base: server.trim_end_matches('/').to_string(),
            session,
            notices,
            demo: false,
        })
    }

    /// Check logins locally against the demo credentials instead of calling
    /// the server. Data endpoints still go over the wire.
    pub fn with_demo_login(mut self) -> Self {
        self.demo = true;
        self
    }

    pub fn session(&self) -> &Arc<SessionHandle> {
        &self.session
    }

    /// Authenticate and persist the resulting session.
    ///
    /// A 401 here means bad credentials, not an expired session; it must not
    /// trip the expiry gate.
    pub async fn login(&self, username: &str, password: &str) -> anyhow::Result<Session> {
        if self.demo {
            let Some(session) = demo_session(username, password) else {
                self.notices
                    .notify(Notice::Error("Invalid username or password".to_string()));
                return Err(ClientError::BadCredentials.into());
            };
            self.session.establish(session.clone())?;
            info!("demo login as {username}");
            return Ok(session);
        }

        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let request = self.authorized(self.http.post(self.url("/api/auth/login")).json(&body));
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                self.notices
                    .notify(Notice::Error(format!("Login request failed: {e}")));
                return Err(ClientError::Transport(e).into());
            }
        };
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.notices
                .notify(Notice::Error("Invalid username or password".to_string()));
            return Err(ClientError::BadCredentials.into());
        }
        if !status.is_success() {
            let detail = error_detail(status, &response.text().await.unwrap_or_default());
            self.notices.notify(Notice::Error(detail.clone()));
            return Err(ClientError::Status { status, detail }.into());
        }
        let envelope: Envelope<LoginResponse> = response.json().await.map_err(|e| {
            self.notices
                .notify(Notice::Error("Malformed server response".to_string()));
            ClientError::Decode(e)
        })?;
        let grant = envelope.into_data();
        let session = Session::new(grant.access_token, username);
        self.session.establish(session.clone())?;
        info!("logged in as {username}");
        Ok(session)
    }

    /// Drop the session. Purely local; the server holds no login state.
    pub fn logout(&self) -> anyhow::Result<()> {
        self.session.clear()?;
        info!("logged out");
        Ok(())
    }

    pub async fn zones(&self) -> Result<Vec<MonitoringZone>, ClientError> {
        self.get_json("/api/monitor/zones").await
    }

    pub async fn realtime(&self) -> Result<Vec<SensorReading>, ClientError> {
        self.get_json("/api/monitor/realtime").await
    }

    pub async fn history(&self, zone_id: i64) -> Result<Vec<SensorReading>, ClientError> {
        self.get_json(&format!("/api/monitor/history/{zone_id}")).await
    }

    pub async fn graph(&self) -> Result<GraphData, ClientError> {
        self.get_json("/api/kg/graph").await
    }

    pub async fn predict(&self) -> Result<WarningResult, ClientError> {
        let request = self.authorized(self.http.post(self.url("/api/analysis/predict")));
        self.execute(request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let request = self.authorized(self.http.get(self.url(path)));
        self.execute(request).await
    }

    /// Send a prepared request and unwrap the response envelope.
    ///
    /// Every failure leg emits a notice here, so calling views only stop
    /// their loading indicator. A 401 triggers the one-shot session
    /// teardown.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                self.notices.notify(Notice::Error(format!("Request failed: {e}")));
                return Err(ClientError::Transport(e));
            }
        };
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            let detail = error_detail(status, &response.text().await.unwrap_or_default());
            self.notices.notify(Notice::Error(detail.clone()));
            return Err(ClientError::Status { status, detail });
        }
        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            self.notices
                .notify(Notice::Error("Malformed server response".to_string()));
            ClientError::Decode(e)
        })?;
        if !envelope.message.is_empty() {
            debug!("server message: {}", envelope.message);
        }
        Ok(envelope.into_data())
    }

    fn handle_unauthorized(&self) {
        if self.session.expire() {
            warn!("session rejected by server, logging out");
            self.notices.notify(Notice::SessionExpired);
        }
    }
}

impl MonitorSource for MonitorClient {
    fn fetch_zones(&self) -> impl Future<Output = anyhow::Result<Vec<MonitoringZone>>> + Send {
        async move { Ok(self.zones().await?) }
    }

    fn fetch_realtime(&self) -> impl Future<Output = anyhow::Result<Vec<SensorReading>>> + Send {
        async move { Ok(self.realtime().await?) }
    }

    fn fetch_history(
        &self,
        zone_id: i64,
    ) -> impl Future<Output = anyhow::Result<Vec<SensorReading>>> + Send {
        async move { Ok(self.history(zone_id).await?) }
    }
}

/// Pull a human-readable message out of a non-2xx body, which may carry a
/// `{"detail": ...}` payload.
fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(s)) => return s.clone(),
            Some(other) if !other.is_null() => return other.to_string(),
            _ => {}
        }
    }
    format!("Server returned {status}")
}

use crate::core::errors::PanelError;
use crate::core::kernel::session::Session;
use async_trait::async_trait;
use reqwest::header::SET_COOKIE;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{instrument, trace};

/// Request payload shapes the panel APIs use.
pub enum Payload<'a> {
    Empty,
    Json(&'a Value),
    /// Form-encoded body. Only the Marzban token endpoint uses this.
    Form(&'a [(&'a str, &'a str)]),
}

/// An HTTP reply with its headers still visible.
///
/// The JSON-returning `RestClient` methods cover normal operations; session
/// providers go through `request_raw` because the 3x-ui login hands back its
/// credential in `Set-Cookie` headers, not in the body.
#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub reason: String,
    pub set_cookie: Vec<String>,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON, translating failure to `MalformedResponse`.
    pub fn json(&self) -> Result<Value, PanelError> {
        serde_json::from_str(&self.body).map_err(|e| {
            PanelError::MalformedResponse(format!("response body is not valid JSON: {}", e))
        })
    }
}

/// REST client trait for talking to one remote panel
///
/// This trait provides a unified interface for HTTP operations across the
/// supported panel backends. The session argument carries the already
/// acquired authentication artifact; `None` means an unauthenticated call.
#[async_trait]
pub trait RestClient: Send + Sync {
    /// Make a GET request
    async fn get(&self, endpoint: &str, session: Option<&Session>) -> Result<Value, PanelError>;

    /// Make a GET request with strongly-typed response
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        session: Option<&Session>,
    ) -> Result<T, PanelError>;

    /// Make a POST request with a JSON body
    async fn post(
        &self,
        endpoint: &str,
        body: &Value,
        session: Option<&Session>,
    ) -> Result<Value, PanelError>;

    /// Make a POST request with strongly-typed response
    async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
        session: Option<&Session>,
    ) -> Result<T, PanelError>;

    /// Make a PUT request with a JSON body
    async fn put(
        &self,
        endpoint: &str,
        body: &Value,
        session: Option<&Session>,
    ) -> Result<Value, PanelError>;

    /// Make a PUT request with strongly-typed response
    async fn put_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
        session: Option<&Session>,
    ) -> Result<T, PanelError>;

    /// Make a DELETE request
    async fn delete(&self, endpoint: &str, session: Option<&Session>)
        -> Result<Value, PanelError>;

    /// Make a request and return the reply with headers intact.
    ///
    /// Status-based error translation is the caller's job here; only
    /// network-layer failures are translated.
    async fn request_raw(
        &self,
        method: Method,
        endpoint: &str,
        payload: Payload<'_>,
        session: Option<&Session>,
    ) -> Result<RawResponse, PanelError>;
}

/// Configuration for the REST client
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Base URL of the panel, without a trailing slash
    pub base_url: String,
    /// Panel name for logging and tracing
    pub panel_name: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string to include in requests
    pub user_agent: String,
}

impl RestClientConfig {
    pub fn new(base_url: String, panel_name: String) -> Self {
        Self {
            base_url,
            panel_name,
            timeout_seconds: 10,
            user_agent: "panelbridge/0.1".to_string(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Set the user agent string
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Builder for creating REST client instances
pub struct RestClientBuilder {
    config: RestClientConfig,
}

impl RestClientBuilder {
    pub fn new(config: RestClientConfig) -> Self {
        Self { config }
    }

    /// Build the REST client
    pub fn build(self) -> Result<ReqwestRest, PanelError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(self.config.timeout_seconds))
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(|e| {
                PanelError::InvalidParameters(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(ReqwestRest {
            client,
            config: self.config,
        })
    }
}

/// Implementation of `RestClient` using reqwest
#[derive(Clone, Debug)]
pub struct ReqwestRest {
    client: Client,
    config: RestClientConfig,
}

impl ReqwestRest {
    pub fn new(base_url: String, panel_name: String) -> Result<Self, PanelError> {
        let config = RestClientConfig::new(base_url, panel_name);
        RestClientBuilder::new(config).build()
    }

    /// Build the full URL for an endpoint
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url, endpoint)
    }

    /// Translate a network-layer send failure.
    fn translate_send_error(e: &reqwest::Error) -> PanelError {
        if e.is_timeout() {
            PanelError::Unreachable(e.to_string())
        } else if e.is_connect() {
            PanelError::Offline(e.to_string())
        } else {
            PanelError::ConnectionFailed(e.to_string())
        }
    }

    /// Pull a human-readable message out of an error body, if one exists.
    /// Marzban reports `detail`, 3x-ui reports `msg`.
    fn extract_error_message(value: &Value) -> Option<String> {
        for key in ["detail", "message", "msg"] {
            match value.get(key) {
                Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
                Some(Value::Null) | None => {}
                // Marzban validation errors carry structured detail
                Some(other) => return Some(other.to_string()),
            }
        }
        None
    }

    /// Translate a non-2xx reply into `RemoteHttp`.
    fn remote_error(status: StatusCode, body: &str) -> PanelError {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .as_ref()
            .and_then(Self::extract_error_message)
            .unwrap_or_else(|| {
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("unknown status")
                )
            });

        PanelError::RemoteHttp {
            status: status.as_u16(),
            message,
        }
    }

    /// Handle the response and extract JSON
    #[instrument(skip(self, response), fields(panel = %self.config.panel_name, status = %response.status()))]
    async fn handle_response(&self, response: Response) -> Result<Value, PanelError> {
        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            PanelError::ConnectionFailed(format!("Failed to read response body: {}", e))
        })?;

        trace!("Response body: {}", response_text);

        if status.is_success() {
            serde_json::from_str(&response_text).map_err(|e| {
                PanelError::MalformedResponse(format!("Failed to parse JSON response: {}", e))
            })
        } else {
            Err(Self::remote_error(status, &response_text))
        }
    }

    /// Make a request with the given parameters
    #[instrument(skip(self, payload, session), fields(panel = %self.config.panel_name, method = %method, endpoint = %endpoint))]
    async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        payload: Payload<'_>,
        session: Option<&Session>,
    ) -> Result<Response, PanelError> {
        let url = self.build_url(endpoint);
        let mut request = self.client.request(method, &url);

        if let Some(session) = session {
            let (name, value) = session.header();
            request = request.header(name, value);
        }

        request = match payload {
            Payload::Empty => request,
            Payload::Json(body) => request
                .header("Content-Type", "application/json")
                .json(body),
            Payload::Form(fields) => request.form(fields),
        };

        request
            .send()
            .await
            .map_err(|e| Self::translate_send_error(&e))
    }

    fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, PanelError> {
        serde_json::from_value(value)
            .map_err(|e| PanelError::MalformedResponse(format!("Failed to deserialize JSON: {}", e)))
    }
}

#[async_trait]
impl RestClient for ReqwestRest {
    #[instrument(skip(self, session), fields(panel = %self.config.panel_name, endpoint = %endpoint))]
    async fn get(&self, endpoint: &str, session: Option<&Session>) -> Result<Value, PanelError> {
        let response = self
            .make_request(Method::GET, endpoint, Payload::Empty, session)
            .await?;
        self.handle_response(response).await
    }

    #[instrument(skip(self, session), fields(panel = %self.config.panel_name, endpoint = %endpoint))]
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        session: Option<&Session>,
    ) -> Result<T, PanelError> {
        self.get(endpoint, session).await.and_then(Self::from_value)
    }

    #[instrument(skip(self, body, session), fields(panel = %self.config.panel_name, endpoint = %endpoint))]
    async fn post(
        &self,
        endpoint: &str,
        body: &Value,
        session: Option<&Session>,
    ) -> Result<Value, PanelError> {
        let response = self
            .make_request(Method::POST, endpoint, Payload::Json(body), session)
            .await?;
        self.handle_response(response).await
    }

    #[instrument(skip(self, body, session), fields(panel = %self.config.panel_name, endpoint = %endpoint))]
    async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
        session: Option<&Session>,
    ) -> Result<T, PanelError> {
        self.post(endpoint, body, session)
            .await
            .and_then(Self::from_value)
    }

    #[instrument(skip(self, body, session), fields(panel = %self.config.panel_name, endpoint = %endpoint))]
    async fn put(
        &self,
        endpoint: &str,
        body: &Value,
        session: Option<&Session>,
    ) -> Result<Value, PanelError> {
        let response = self
            .make_request(Method::PUT, endpoint, Payload::Json(body), session)
            .await?;
        self.handle_response(response).await
    }

    #[instrument(skip(self, body, session), fields(panel = %self.config.panel_name, endpoint = %endpoint))]
    async fn put_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
        session: Option<&Session>,
    ) -> Result<T, PanelError> {
        self.put(endpoint, body, session)
            .await
            .and_then(Self::from_value)
    }

    #[instrument(skip(self, session), fields(panel = %self.config.panel_name, endpoint = %endpoint))]
    async fn delete(
        &self,
        endpoint: &str,
        session: Option<&Session>,
    ) -> Result<Value, PanelError> {
        let response = self
            .make_request(Method::DELETE, endpoint, Payload::Empty, session)
            .await?;
        self.handle_response(response).await
    }

    #[instrument(skip(self, payload, session), fields(panel = %self.config.panel_name, method = %method, endpoint = %endpoint))]
    async fn request_raw(
        &self,
        method: Method,
        endpoint: &str,
        payload: Payload<'_>,
        session: Option<&Session>,
    ) -> Result<RawResponse, PanelError> {
        let response = self.make_request(method, endpoint, payload, session).await?;

        let status = response.status();
        let set_cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let body = response.text().await.map_err(|e| {
            PanelError::ConnectionFailed(format!("Failed to read response body: {}", e))
        })?;

        Ok(RawResponse {
            status: status.as_u16(),
            reason: status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string(),
            set_cookie,
            body,
        })
    }
}

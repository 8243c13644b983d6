use crate::core::config::PanelConfig;
use crate::core::errors::PanelError;
use crate::core::kernel::{Payload, RestClient, Session, SessionProvider};
use async_trait::async_trait;
use reqwest::Method;
use secrecy::{ExposeSecret, Secret};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

/// Cookie-based login against `POST {base}/login`.
///
/// The panel answers 200 for both good and bad credentials; the body's
/// `success` flag is the real verdict, and the session itself arrives in
/// `Set-Cookie` headers.
pub struct ThreeXUiSessionProvider<R: RestClient> {
    rest: Arc<R>,
    username: String,
    password: Secret<String>,
}

impl<R: RestClient> ThreeXUiSessionProvider<R> {
    pub fn new(rest: Arc<R>, config: &PanelConfig) -> Self {
        Self {
            rest,
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }
}

#[async_trait]
impl<R: RestClient> SessionProvider for ThreeXUiSessionProvider<R> {
    #[instrument(skip(self), fields(panel = "threexui", username = %self.username))]
    async fn acquire(&self) -> Result<Session, PanelError> {
        let body = json!({
            "username": self.username,
            "password": self.password.expose_secret(),
        });

        let reply = self
            .rest
            .request_raw(Method::POST, "/login", Payload::Json(&body), None)
            .await?;

        // 5xx means the panel itself is broken; the body is not worth parsing.
        if reply.status >= 500 {
            return Err(PanelError::RemoteHttp {
                status: reply.status,
                message: format!("HTTP {}: {}", reply.status, reply.reason),
            });
        }

        let value = reply.json()?;
        let success = value
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if !success {
            let msg = value
                .get("msg")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or("login rejected by panel");
            return Err(PanelError::InvalidCredentials(msg.to_string()));
        }

        if reply.set_cookie.is_empty() {
            return Err(PanelError::MalformedResponse(
                "login succeeded but no session cookie was set".to_string(),
            ));
        }

        Ok(Session::Cookies(reply.set_cookie))
    }
}

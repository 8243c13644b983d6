use crate::core::config::PanelConfig;
use crate::core::errors::PanelError;
use crate::core::kernel::{Payload, RestClient, Session, SessionProvider};
use crate::panels::marzban::types::MarzbanToken;
use async_trait::async_trait;
use reqwest::Method;
use secrecy::{ExposeSecret, Secret};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Bearer-token login against `POST {base}/api/admin/token`.
///
/// Unlike every other Marzban call this one is form-encoded, the panel
/// speaks OAuth2 password flow here.
pub struct MarzbanSessionProvider<R: RestClient> {
    rest: Arc<R>,
    username: String,
    password: Secret<String>,
}

impl<R: RestClient> MarzbanSessionProvider<R> {
    pub fn new(rest: Arc<R>, config: &PanelConfig) -> Self {
        Self {
            rest,
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }
}

#[async_trait]
impl<R: RestClient> SessionProvider for MarzbanSessionProvider<R> {
    #[instrument(skip(self), fields(panel = "marzban", username = %self.username))]
    async fn acquire(&self) -> Result<Session, PanelError> {
        let fields = [
            ("username", self.username.as_str()),
            ("password", self.password.expose_secret().as_str()),
        ];

        let reply = self
            .rest
            .request_raw(
                Method::POST,
                "/api/admin/token",
                Payload::Form(&fields),
                None,
            )
            .await?;

        if !reply.is_success() {
            let detail = reply
                .json()
                .ok()
                .and_then(|v| v.get("detail").map(detail_text));

            // 401 is a straight rejection; 422 means the form itself was
            // refused, which for a login amounts to the same thing.
            if reply.status == 401 || reply.status == 403 || reply.status == 422 {
                return Err(PanelError::InvalidCredentials(
                    detail.unwrap_or_else(|| "authentication rejected by panel".to_string()),
                ));
            }

            return Err(PanelError::RemoteHttp {
                status: reply.status,
                message: detail
                    .unwrap_or_else(|| format!("HTTP {}: {}", reply.status, reply.reason)),
            });
        }

        let token: MarzbanToken = serde_json::from_value(reply.json()?).map_err(|e| {
            PanelError::MalformedResponse(format!("unexpected token response: {}", e))
        })?;

        if token.access_token.is_empty() {
            return Err(PanelError::MalformedResponse(
                "token response carries an empty access_token".to_string(),
            ));
        }

        Ok(Session::Bearer(token.access_token))
    }
}

fn detail_text(detail: &Value) -> String {
    match detail {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

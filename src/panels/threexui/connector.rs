use crate::core::{
    config::PanelConfig,
    errors::PanelError,
    kernel::{RestClient, SessionProvider},
    traits::{AdminManagement, PanelConnector, SystemInspection, UserManagement},
    types::{
        AdminAccount, AdminSpec, ConnectionStatus, Inbound, ManagedUser, NodeInfo, SystemStats,
        UserSpec,
    },
};
use crate::panels::threexui::converters::{
    client_from_spec, convert_inbound, managed_user_from_spec,
};
use crate::panels::threexui::rest::ThreeXUiRestClient;
use crate::panels::threexui::session::ThreeXUiSessionProvider;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

const KIND: &str = "threexui";

/// 3x-ui connector. Stateless between calls: every operation acquires its
/// own session and drops it afterwards.
pub struct ThreeXUiConnector<R: RestClient> {
    rest: ThreeXUiRestClient<R>,
    sessions: ThreeXUiSessionProvider<R>,
    config: PanelConfig,
}

impl<R: RestClient> ThreeXUiConnector<R> {
    /// Create a new connector with dependency injection. The rest client and
    /// the session provider share one transport.
    pub fn new(rest: Arc<R>, config: PanelConfig) -> Self {
        Self {
            rest: ThreeXUiRestClient::new(Arc::clone(&rest)),
            sessions: ThreeXUiSessionProvider::new(rest, &config),
            config,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn unsupported(operation: &'static str) -> PanelError {
        PanelError::Unsupported {
            kind: KIND,
            operation,
        }
    }

    fn inbound_id(spec: &UserSpec) -> Result<u64, PanelError> {
        spec.inbound_id.ok_or_else(|| {
            PanelError::InvalidParameters("3x-ui requires an inbound_id".to_string())
        })
    }
}

#[async_trait]
impl<R: RestClient> SystemInspection for ThreeXUiConnector<R> {
    #[instrument(skip(self), fields(panel = KIND))]
    async fn check_connection(&self) -> Result<ConnectionStatus, PanelError> {
        // A valid login cookie alone does not prove the API works; the
        // admin-listing probe exercises an authenticated endpoint too.
        self.list_admins().await?;
        Ok(ConnectionStatus::ok("Connection successful"))
    }

    #[instrument(skip(self), fields(panel = KIND))]
    async fn system_stats(&self) -> Result<SystemStats, PanelError> {
        let session = self.sessions.acquire().await?;
        let inbounds = self.rest.list_inbounds(&session).await?;

        // The 3x-ui management API exposes no host metrics. Everything the
        // panel cannot report stays None; numbers are never invented.
        Ok(SystemStats {
            inbounds: Some(inbounds.len() as u64),
            ..SystemStats::default()
        })
    }

    #[instrument(skip(self), fields(panel = KIND))]
    async fn list_inbounds(&self) -> Result<Vec<Inbound>, PanelError> {
        let session = self.sessions.acquire().await?;
        let inbounds = self.rest.list_inbounds(&session).await?;
        Ok(inbounds.into_iter().map(convert_inbound).collect())
    }

    async fn list_nodes(&self) -> Result<Vec<NodeInfo>, PanelError> {
        Err(Self::unsupported("ListNodes"))
    }
}

#[async_trait]
impl<R: RestClient> UserManagement for ThreeXUiConnector<R> {
    #[instrument(skip(self, spec), fields(panel = KIND, username = %spec.username))]
    async fn create_user(&self, spec: &UserSpec) -> Result<ManagedUser, PanelError> {
        let inbound_id = Self::inbound_id(spec)?;
        let client = client_from_spec(spec)?;

        let session = self.sessions.acquire().await?;
        self.rest.add_client(&session, inbound_id, &client).await?;
        Ok(managed_user_from_spec(spec))
    }

    #[instrument(skip(self, spec), fields(panel = KIND, user = %user))]
    async fn update_user(&self, user: &str, spec: &UserSpec) -> Result<ManagedUser, PanelError> {
        let inbound_id = Self::inbound_id(spec)?;
        // The path parameter identifies the client; the settings blob must
        // carry the same UUID or the panel creates a duplicate.
        let mut spec = spec.clone();
        spec.client_id = Some(user.to_string());
        let client = client_from_spec(&spec)?;

        let session = self.sessions.acquire().await?;
        self.rest
            .update_client(&session, user, inbound_id, &client)
            .await?;
        Ok(managed_user_from_spec(&spec))
    }

    #[instrument(skip(self), fields(panel = KIND, user = %user))]
    async fn delete_user(&self, user: &str) -> Result<(), PanelError> {
        let session = self.sessions.acquire().await?;
        self.rest.delete_client(&session, user).await
    }

    #[instrument(skip(self), fields(panel = KIND, user = %user))]
    async fn reset_user_traffic(&self, user: &str) -> Result<(), PanelError> {
        let session = self.sessions.acquire().await?;
        self.rest.reset_client_traffic(&session, user).await
    }
}

#[async_trait]
impl<R: RestClient> AdminManagement for ThreeXUiConnector<R> {
    #[instrument(skip(self), fields(panel = KIND))]
    async fn list_admins(&self) -> Result<Vec<AdminAccount>, PanelError> {
        // 3x-ui has exactly one administrator: the login account itself.
        // The inbound-list probe still runs so a dead session surfaces as an
        // error instead of a fabricated success.
        let session = self.sessions.acquire().await?;
        self.rest.list_inbounds(&session).await?;

        Ok(vec![AdminAccount {
            username: self.config.username.clone(),
            is_sudo: true,
            telegram_id: None,
        }])
    }

    async fn create_admin(&self, _spec: &AdminSpec) -> Result<AdminAccount, PanelError> {
        Err(Self::unsupported("CreateAdmin"))
    }

    async fn update_admin(
        &self,
        _admin: &str,
        _spec: &AdminSpec,
    ) -> Result<AdminAccount, PanelError> {
        Err(Self::unsupported("UpdateAdmin"))
    }

    async fn delete_admin(&self, _admin: &str) -> Result<(), PanelError> {
        Err(Self::unsupported("DeleteAdmin"))
    }
}

impl<R: RestClient> PanelConnector for ThreeXUiConnector<R> {}

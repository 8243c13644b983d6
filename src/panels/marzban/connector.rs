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
use crate::panels::marzban::converters::{
    admin_payload, convert_admin, convert_inbounds, convert_node, convert_user,
    create_user_payload, stats_from, update_user_payload,
};
use crate::panels::marzban::rest::MarzbanRestClient;
use crate::panels::marzban::session::MarzbanSessionProvider;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

const KIND: &str = "marzban";

/// Marzban connector. Stateless between calls; each operation acquires a
/// fresh bearer token and runs its HTTP sequence under it.
pub struct MarzbanConnector<R: RestClient> {
    rest: MarzbanRestClient<R>,
    sessions: MarzbanSessionProvider<R>,
    config: PanelConfig,
}

impl<R: RestClient> MarzbanConnector<R> {
    /// Create a new connector with dependency injection. The rest client and
    /// the session provider share one transport.
    pub fn new(rest: Arc<R>, config: PanelConfig) -> Self {
        Self {
            rest: MarzbanRestClient::new(Arc::clone(&rest)),
            sessions: MarzbanSessionProvider::new(rest, &config),
            config,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

#[async_trait]
impl<R: RestClient> SystemInspection for MarzbanConnector<R> {
    #[instrument(skip(self), fields(panel = KIND))]
    async fn check_connection(&self) -> Result<ConnectionStatus, PanelError> {
        // Obtaining a token already exercises credentials and reachability;
        // no follow-up probe is needed for this backend.
        self.sessions.acquire().await?;
        Ok(ConnectionStatus::ok("Connection successful"))
    }

    #[instrument(skip(self), fields(panel = KIND))]
    async fn system_stats(&self) -> Result<SystemStats, PanelError> {
        let session = self.sessions.acquire().await?;
        let system = self.rest.get_system(&session).await?;
        let users = self.rest.list_users(&session).await?;
        Ok(stats_from(system, &users.users))
    }

    #[instrument(skip(self), fields(panel = KIND))]
    async fn list_inbounds(&self) -> Result<Vec<Inbound>, PanelError> {
        let session = self.sessions.acquire().await?;
        let value = self.rest.list_inbounds(&session).await?;
        convert_inbounds(value)
    }

    #[instrument(skip(self), fields(panel = KIND))]
    async fn list_nodes(&self) -> Result<Vec<NodeInfo>, PanelError> {
        let session = self.sessions.acquire().await?;
        let nodes = self.rest.list_nodes(&session).await?;
        Ok(nodes.into_iter().map(convert_node).collect())
    }
}

#[async_trait]
impl<R: RestClient> UserManagement for MarzbanConnector<R> {
    #[instrument(skip(self, spec), fields(panel = KIND, username = %spec.username))]
    async fn create_user(&self, spec: &UserSpec) -> Result<ManagedUser, PanelError> {
        let body = create_user_payload(spec);
        let session = self.sessions.acquire().await?;
        let user = self.rest.create_user(&session, &body).await?;
        Ok(convert_user(user))
    }

    #[instrument(skip(self, spec), fields(panel = KIND, user = %user))]
    async fn update_user(&self, user: &str, spec: &UserSpec) -> Result<ManagedUser, PanelError> {
        let body = update_user_payload(spec);
        let session = self.sessions.acquire().await?;
        let user = self.rest.update_user(&session, user, &body).await?;
        Ok(convert_user(user))
    }

    #[instrument(skip(self), fields(panel = KIND, user = %user))]
    async fn delete_user(&self, user: &str) -> Result<(), PanelError> {
        let session = self.sessions.acquire().await?;
        self.rest.delete_user(&session, user).await
    }

    #[instrument(skip(self), fields(panel = KIND, user = %user))]
    async fn reset_user_traffic(&self, user: &str) -> Result<(), PanelError> {
        let session = self.sessions.acquire().await?;
        self.rest.reset_user_traffic(&session, user).await
    }
}

#[async_trait]
impl<R: RestClient> AdminManagement for MarzbanConnector<R> {
    #[instrument(skip(self), fields(panel = KIND))]
    async fn list_admins(&self) -> Result<Vec<AdminAccount>, PanelError> {
        let session = self.sessions.acquire().await?;
        let admins = self.rest.list_admins(&session).await?;
        Ok(admins.into_iter().map(convert_admin).collect())
    }

    #[instrument(skip(self, spec), fields(panel = KIND, username = %spec.username))]
    async fn create_admin(&self, spec: &AdminSpec) -> Result<AdminAccount, PanelError> {
        let body = admin_payload(spec);
        let session = self.sessions.acquire().await?;
        let admin = self.rest.create_admin(&session, &body).await?;
        Ok(convert_admin(admin))
    }

    #[instrument(skip(self, spec), fields(panel = KIND, admin = %admin))]
    async fn update_admin(
        &self,
        admin: &str,
        spec: &AdminSpec,
    ) -> Result<AdminAccount, PanelError> {
        let body = admin_payload(spec);
        let session = self.sessions.acquire().await?;
        let admin = self.rest.update_admin(&session, admin, &body).await?;
        Ok(convert_admin(admin))
    }

    #[instrument(skip(self), fields(panel = KIND, admin = %admin))]
    async fn delete_admin(&self, admin: &str) -> Result<(), PanelError> {
        let session = self.sessions.acquire().await?;
        self.rest.delete_admin(&session, admin).await
    }
}

impl<R: RestClient> PanelConnector for MarzbanConnector<R> {}

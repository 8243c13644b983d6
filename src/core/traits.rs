use crate::core::{
    errors::PanelError,
    types::{
        AdminAccount, AdminSpec, ConnectionStatus, Inbound, ManagedUser, NodeInfo, SystemStats,
        UserSpec,
    },
};
use async_trait::async_trait;

#[async_trait]
pub trait SystemInspection {
    /// Prove the panel is reachable and the credentials work.
    async fn check_connection(&self) -> Result<ConnectionStatus, PanelError>;

    /// Fetch system statistics. Fields the backend cannot report are `None`.
    async fn system_stats(&self) -> Result<SystemStats, PanelError>;

    /// List configured inbounds/proxies.
    async fn list_inbounds(&self) -> Result<Vec<Inbound>, PanelError>;

    /// List worker nodes. Backends without a node concept return
    /// `PanelError::Unsupported`.
    async fn list_nodes(&self) -> Result<Vec<NodeInfo>, PanelError>;
}

#[async_trait]
pub trait UserManagement {
    /// Provision a managed user on the panel.
    async fn create_user(&self, spec: &UserSpec) -> Result<ManagedUser, PanelError>;

    /// Update an existing user. `user` is the backend's identifying key
    /// (client UUID for 3x-ui, username for Marzban).
    async fn update_user(&self, user: &str, spec: &UserSpec) -> Result<ManagedUser, PanelError>;

    async fn delete_user(&self, user: &str) -> Result<(), PanelError>;

    async fn reset_user_traffic(&self, user: &str) -> Result<(), PanelError>;
}

#[async_trait]
pub trait AdminManagement {
    async fn list_admins(&self) -> Result<Vec<AdminAccount>, PanelError>;
    async fn create_admin(&self, spec: &AdminSpec) -> Result<AdminAccount, PanelError>;
    async fn update_admin(&self, admin: &str, spec: &AdminSpec)
        -> Result<AdminAccount, PanelError>;
    async fn delete_admin(&self, admin: &str) -> Result<(), PanelError>;
}

/// Composite trait implemented by every backend connector. The gateway
/// dispatches through this as a trait object, one connector per call.
pub trait PanelConnector:
    SystemInspection + UserManagement + AdminManagement + Send + Sync
{
}

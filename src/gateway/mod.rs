use crate::core::{
    config::PanelConfig,
    errors::PanelError,
    traits::PanelConnector,
    types::{
        AdminAccount, AdminSpec, ConnectionStatus, Inbound, ManagedUser, NodeInfo, PanelKind,
        PanelRecord, SystemStats, UserSpec,
    },
};
use crate::panels::{marzban, threexui};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use tracing::instrument;

/// The closed set of abstract operations the gateway can run against any
/// panel, with their typed parameter bags.
#[derive(Debug, Clone)]
pub enum Operation {
    TestConnection,
    GetSystemStats,
    ListInbounds,
    CreateUser(UserSpec),
    UpdateUser { user: String, spec: UserSpec },
    DeleteUser { user: String },
    ResetUserTraffic { user: String },
    ListAdmins,
    CreateAdmin(AdminSpec),
    UpdateAdmin { admin: String, spec: AdminSpec },
    DeleteAdmin { admin: String },
    ListNodes,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TestConnection => "TestConnection",
            Self::GetSystemStats => "GetSystemStats",
            Self::ListInbounds => "ListInbounds",
            Self::CreateUser(_) => "CreateUser",
            Self::UpdateUser { .. } => "UpdateUser",
            Self::DeleteUser { .. } => "DeleteUser",
            Self::ResetUserTraffic { .. } => "ResetUserTraffic",
            Self::ListAdmins => "ListAdmins",
            Self::CreateAdmin(_) => "CreateAdmin",
            Self::UpdateAdmin { .. } => "UpdateAdmin",
            Self::DeleteAdmin { .. } => "DeleteAdmin",
            Self::ListNodes => "ListNodes",
        }
    }
}

/// Success payloads, one variant per operation family.
#[derive(Debug, Clone)]
pub enum OperationOutput {
    Connection(ConnectionStatus),
    Stats(SystemStats),
    Inbounds(Vec<Inbound>),
    User(ManagedUser),
    Admins(Vec<AdminAccount>),
    Admin(AdminAccount),
    Nodes(Vec<NodeInfo>),
    Done,
}

/// Storage collaborator owned by the surrounding application.
#[async_trait]
pub trait PanelStore: Send + Sync {
    async fn get_panel(&self, panel_id: i64) -> Result<Option<PanelRecord>, PanelError>;
}

/// Facade over both backends: resolves the panel record, picks the
/// connector by kind, and runs one operation.
///
/// Stateless across calls by design: no session cache and no connection
/// reuse between invocations, so concurrent `execute` calls need no
/// locking and legitimately hold independent remote sessions.
pub struct PanelGateway<S: PanelStore> {
    store: S,
}

impl<S: PanelStore> PanelGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Run one abstract operation against the panel identified by
    /// `panel_id`. A missing record fails before any HTTP is attempted;
    /// a session-provider failure returns with no partial work done.
    #[instrument(skip(self, operation), fields(panel_id = panel_id, operation = operation.name()))]
    pub async fn execute(
        &self,
        panel_id: i64,
        operation: Operation,
    ) -> Result<OperationOutput, PanelError> {
        let record = self
            .store
            .get_panel(panel_id)
            .await?
            .ok_or(PanelError::PanelNotFound(panel_id))?;

        let config = PanelConfig::new(
            record.base_url.clone(),
            record.username.clone(),
            record.password.expose_secret().clone(),
        );
        let connector = connect(record.kind, config)?;

        dispatch(connector.as_ref(), operation).await
    }

    /// Probe raw credentials without touching storage. Used by the route
    /// layer before a `PanelRecord` exists (panel creation form).
    #[instrument(skip(self, password), fields(kind = %kind, base_url = %base_url))]
    pub async fn test_connection(
        &self,
        base_url: &str,
        username: &str,
        password: String,
        kind: PanelKind,
    ) -> ConnectionStatus {
        let config = PanelConfig::new(base_url, username, password);

        let connector = match connect(kind, config) {
            Ok(connector) => connector,
            Err(e) => return failure_status(&e),
        };

        match connector.check_connection().await {
            Ok(status) => status,
            Err(e) => failure_status(&e),
        }
    }
}

/// Select the backend connector for a panel kind. The match is exhaustive:
/// adding a kind without wiring a connector does not compile.
pub fn connect(
    kind: PanelKind,
    config: PanelConfig,
) -> Result<Box<dyn PanelConnector>, PanelError> {
    match kind {
        PanelKind::ThreeXUi => Ok(Box::new(threexui::build_connector(config)?)),
        PanelKind::Marzban => Ok(Box::new(marzban::build_connector(config)?)),
    }
}

async fn dispatch(
    connector: &dyn PanelConnector,
    operation: Operation,
) -> Result<OperationOutput, PanelError> {
    match operation {
        Operation::TestConnection => {
            // Connectivity problems are this operation's answer, not its
            // failure mode.
            let status = match connector.check_connection().await {
                Ok(status) => status,
                Err(e) => failure_status(&e),
            };
            Ok(OperationOutput::Connection(status))
        }
        Operation::GetSystemStats => connector.system_stats().await.map(OperationOutput::Stats),
        Operation::ListInbounds => connector.list_inbounds().await.map(OperationOutput::Inbounds),
        Operation::CreateUser(spec) => {
            connector.create_user(&spec).await.map(OperationOutput::User)
        }
        Operation::UpdateUser { user, spec } => connector
            .update_user(&user, &spec)
            .await
            .map(OperationOutput::User),
        Operation::DeleteUser { user } => connector
            .delete_user(&user)
            .await
            .map(|()| OperationOutput::Done),
        Operation::ResetUserTraffic { user } => connector
            .reset_user_traffic(&user)
            .await
            .map(|()| OperationOutput::Done),
        Operation::ListAdmins => connector.list_admins().await.map(OperationOutput::Admins),
        Operation::CreateAdmin(spec) => connector
            .create_admin(&spec)
            .await
            .map(OperationOutput::Admin),
        Operation::UpdateAdmin { admin, spec } => connector
            .update_admin(&admin, &spec)
            .await
            .map(OperationOutput::Admin),
        Operation::DeleteAdmin { admin } => connector
            .delete_admin(&admin)
            .await
            .map(|()| OperationOutput::Done),
        Operation::ListNodes => connector.list_nodes().await.map(OperationOutput::Nodes),
    }
}

/// Map an error to the user-facing connectivity verdict.
fn failure_status(err: &PanelError) -> ConnectionStatus {
    match err {
        PanelError::InvalidCredentials(_) => ConnectionStatus::failed("Invalid credentials"),
        PanelError::Unreachable(_) => ConnectionStatus::failed("Panel timed out"),
        PanelError::Offline(_) => ConnectionStatus::failed("Panel is offline"),
        other => ConnectionStatus::failed(other.to_string()),
    }
}

use super::types as xui_types;
use crate::core::errors::PanelError;
use crate::core::types::{Inbound, ManagedUser, UserSpec, UserStatus};

/// Convert a 3x-ui inbound to the core inbound type.
pub fn convert_inbound(inbound: xui_types::XuiInbound) -> Inbound {
    let total_clients = inbound
        .client_stats
        .as_ref()
        .map(|stats| stats.len() as u64);

    Inbound {
        id: inbound.id.to_string(),
        tag: inbound.remark,
        protocol: inbound.protocol,
        port: Some(inbound.port),
        enabled: inbound.enable,
        total_clients,
    }
}

/// Build the wire-level client entry from an abstract user spec.
///
/// 3x-ui needs the client UUID up front (the panel does not hand one back),
/// so the caller must supply it in the spec.
pub fn client_from_spec(spec: &UserSpec) -> Result<xui_types::XuiClient, PanelError> {
    let client_id = spec
        .client_id
        .clone()
        .ok_or_else(|| PanelError::InvalidParameters("3x-ui requires a client_id".to_string()))?;

    Ok(xui_types::XuiClient {
        id: client_id,
        email: spec.username.clone(),
        total_gb: spec.data_limit.unwrap_or(0),
        // Abstract expiry is unix seconds; the panel wants milliseconds.
        expiry_time: spec.expire_at.map_or(0, |secs| secs * 1000),
        enable: !matches!(spec.status, Some(UserStatus::Disabled)),
        flow: String::new(),
    })
}

/// 3x-ui's mutation endpoints return `obj: null`, so the managed-user view
/// is echoed from the spec that was just applied.
pub fn managed_user_from_spec(spec: &UserSpec) -> ManagedUser {
    ManagedUser {
        username: spec.username.clone(),
        status: Some(spec.status.unwrap_or(UserStatus::Active)),
        data_limit: spec.data_limit,
        used_traffic: None,
        expire_at: spec.expire_at,
        subscription_url: None,
        client_id: spec.client_id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> UserSpec {
        UserSpec::new("alice")
            .with_data_limit(10 * 1024 * 1024 * 1024)
            .with_expire_at(1_700_000_000)
            .with_inbound(3, "uuid-alice")
    }

    #[test]
    fn client_expiry_is_milliseconds() {
        let client = client_from_spec(&spec()).unwrap();
        assert_eq!(client.expiry_time, 1_700_000_000_000);
        assert_eq!(client.email, "alice");
        assert_eq!(client.total_gb, 10 * 1024 * 1024 * 1024);
    }

    #[test]
    fn missing_client_id_is_rejected() {
        let spec = UserSpec::new("bob");
        assert!(matches!(
            client_from_spec(&spec),
            Err(PanelError::InvalidParameters(_))
        ));
    }
}

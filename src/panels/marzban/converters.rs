use super::types as marzban_types;
use crate::core::errors::PanelError;
use crate::core::types::{
    conversion, AdminAccount, AdminSpec, Inbound, ManagedUser, NodeInfo, SystemStats,
    TrafficResetStrategy, UserSpec, UserStatus,
};
use serde_json::{json, Map, Value};

/// Body of `POST /api/user`. Marzban requires the reset strategy and status
/// fields, so absent spec values get the panel's documented defaults.
pub fn create_user_payload(spec: &UserSpec) -> Value {
    let mut body = json!({
        "username": spec.username,
        "data_limit": spec.data_limit,
        "expire": spec.expire_at,
        "data_limit_reset_strategy": spec
            .reset_strategy
            .unwrap_or(TrafficResetStrategy::NoReset)
            .as_str(),
        "status": spec.status.unwrap_or(UserStatus::Active).as_str(),
        "proxies": spec.proxies.clone().unwrap_or_else(|| json!({})),
    });

    if let Some(note) = &spec.note {
        body["note"] = json!(note);
    }

    body
}

/// Body of `PUT /api/user/{username}`: partial, only fields the caller set.
pub fn update_user_payload(spec: &UserSpec) -> Value {
    let mut body = Map::new();

    if let Some(limit) = spec.data_limit {
        body.insert("data_limit".to_string(), json!(limit));
    }
    if let Some(expire) = spec.expire_at {
        body.insert("expire".to_string(), json!(expire));
    }
    if let Some(strategy) = spec.reset_strategy {
        body.insert(
            "data_limit_reset_strategy".to_string(),
            json!(strategy.as_str()),
        );
    }
    if let Some(status) = spec.status {
        body.insert("status".to_string(), json!(status.as_str()));
    }
    if let Some(note) = &spec.note {
        body.insert("note".to_string(), json!(note));
    }
    if let Some(proxies) = &spec.proxies {
        body.insert("proxies".to_string(), proxies.clone());
    }

    Value::Object(body)
}

pub fn admin_payload(spec: &AdminSpec) -> Value {
    let mut body = json!({
        "username": spec.username,
        "is_sudo": spec.is_sudo,
    });

    if let Some(password) = &spec.password {
        body["password"] = json!(password);
    }
    if let Some(telegram_id) = spec.telegram_id {
        body["telegram_id"] = json!(telegram_id);
    }

    body
}

pub fn parse_status(status: &str) -> Option<UserStatus> {
    match status {
        "active" => Some(UserStatus::Active),
        "disabled" => Some(UserStatus::Disabled),
        "limited" => Some(UserStatus::Limited),
        "expired" => Some(UserStatus::Expired),
        "on_hold" => Some(UserStatus::OnHold),
        _ => None,
    }
}

/// Convert a Marzban user to the core managed-user type.
pub fn convert_user(user: marzban_types::MarzbanUser) -> ManagedUser {
    ManagedUser {
        username: user.username,
        status: user.status.as_deref().and_then(parse_status),
        data_limit: user.data_limit,
        used_traffic: user.used_traffic,
        expire_at: user.expire,
        subscription_url: user.subscription_url,
        client_id: None,
    }
}

pub fn convert_admin(admin: marzban_types::MarzbanAdmin) -> AdminAccount {
    AdminAccount {
        username: admin.username,
        is_sudo: admin.is_sudo,
        telegram_id: admin.telegram_id,
    }
}

pub fn convert_node(node: marzban_types::MarzbanNode) -> NodeInfo {
    NodeInfo {
        id: node.id,
        name: node.name,
        address: node.address,
        port: node.port,
        status: node.status,
        xray_version: node.xray_version,
    }
}

/// Merge host metrics and the user list into the backend-agnostic stats
/// record. User counts come from filtering the actual list by status.
pub fn stats_from(
    system: marzban_types::MarzbanSystemInfo,
    users: &[marzban_types::MarzbanUser],
) -> SystemStats {
    let count_status = |wanted: &str| -> u64 {
        users
            .iter()
            .filter(|u| u.status.as_deref() == Some(wanted))
            .count() as u64
    };

    SystemStats {
        cpu_percent: system.cpu_usage,
        memory_percent: conversion::percent(system.mem_used, system.mem_total),
        disk_percent: conversion::percent(system.disk_used, system.disk_total),
        uptime_secs: system.uptime,
        version: system.version,
        total_users: Some(users.len() as u64),
        active_users: Some(count_status("active")),
        expired_users: Some(count_status("expired")),
        inbounds: None,
    }
}

/// `GET /api/inbounds` answers an object keyed by protocol, each value a
/// list of inbound entries. Older builds answer a flat array; accept both.
pub fn convert_inbounds(value: Value) -> Result<Vec<Inbound>, PanelError> {
    match value {
        Value::Object(by_protocol) => {
            let mut inbounds = Vec::new();
            for (protocol, entries) in by_protocol {
                let Value::Array(entries) = entries else {
                    return Err(PanelError::MalformedResponse(format!(
                        "inbound group '{}' is not a list",
                        protocol
                    )));
                };
                for entry in entries {
                    inbounds.push(inbound_from_entry(&protocol, &entry)?);
                }
            }
            Ok(inbounds)
        }
        Value::Array(entries) => entries
            .iter()
            .map(|entry| {
                let protocol = entry
                    .get("protocol")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string();
                inbound_from_entry(&protocol, entry)
            })
            .collect(),
        _ => Err(PanelError::MalformedResponse(
            "inbound list is neither an object nor an array".to_string(),
        )),
    }
}

fn inbound_from_entry(protocol: &str, entry: &Value) -> Result<Inbound, PanelError> {
    let tag = entry
        .get("tag")
        .and_then(Value::as_str)
        .ok_or_else(|| PanelError::MalformedResponse("inbound entry has no tag".to_string()))?;

    let port = entry
        .get("port")
        .and_then(Value::as_u64)
        .and_then(|p| u16::try_from(p).ok());

    Ok(Inbound {
        // Marzban inbounds have no numeric id; the tag is the stable key.
        id: tag.to_string(),
        tag: tag.to_string(),
        protocol: protocol.to_string(),
        port,
        enabled: true,
        total_clients: None,
    })
}

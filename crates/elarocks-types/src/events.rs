//! Sysmon event records and the `SysmonEvent` GraphQL union.
//!
//! Field names follow the snake_case column names written by the ingest
//! pipeline and are exposed unchanged in the GraphQL schema. Numeric and
//! boolean fields decode leniently (see [`crate::de`]).

use async_graphql::{SimpleObject, Union};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::de::{comma_list, native_or_text};
use crate::enums::NodeType;

// ---------------------------------------------------------------------------
// Event 13 -- Registry value set
// ---------------------------------------------------------------------------

/// Sysmon event 13: a registry value was written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, SimpleObject, TS)]
#[graphql(name = "RegValueSetEve", rename_fields = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub struct RegistryValueSetEvent {
    /// Winlogbeat agent host name.
    #[serde(default)]
    pub agent_name: Option<String>,
    /// Winlogbeat agent identifier.
    #[serde(default)]
    pub agent_id: Option<String>,
    /// Sysmon event label (`Registry value set`).
    #[serde(default)]
    pub event_action: Option<String>,
    /// Event time as written by Sysmon (`UtcTime`).
    #[serde(default)]
    pub utc_time: Option<String>,
    /// Registry operation (`SetValue`).
    #[serde(default)]
    pub event_type: Option<String>,
    /// GUID of the writing process.
    #[serde(default)]
    pub process_guid: Option<String>,
    /// PID of the writing process.
    #[serde(default, deserialize_with = "native_or_text")]
    pub process_id: Option<u32>,
    /// Image path of the writing process.
    #[serde(default)]
    pub image: Option<String>,
    /// Registry key path that was written.
    #[serde(default)]
    pub target_object: Option<String>,
    /// Value written.
    #[serde(default)]
    pub details: Option<String>,
    /// Account the process ran as.
    #[serde(default)]
    pub user: Option<String>,
}

// ---------------------------------------------------------------------------
// Event 1 -- Process Create
// ---------------------------------------------------------------------------

/// Sysmon event 1: a process was created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, SimpleObject, TS)]
#[graphql(name = "ProcessCreateEve", rename_fields = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub struct ProcessCreateEvent {
    /// Winlogbeat agent host name.
    #[serde(default)]
    pub agent_name: Option<String>,
    /// Winlogbeat agent identifier.
    #[serde(default)]
    pub agent_id: Option<String>,
    /// Sysmon event label (`Process Create`).
    #[serde(default)]
    pub event_action: Option<String>,
    /// Event time as written by Sysmon (`UtcTime`).
    #[serde(default)]
    pub utc_time: Option<String>,
    /// GUID of the new process.
    #[serde(default)]
    pub process_guid: Option<String>,
    /// PID of the new process.
    #[serde(default, deserialize_with = "native_or_text")]
    pub process_id: Option<u32>,
    /// Image path of the new process.
    #[serde(default)]
    pub image: Option<String>,
    /// File version from the image's version resource.
    #[serde(default)]
    pub file_version: Option<String>,
    /// File description from the image's version resource.
    #[serde(default)]
    pub description: Option<String>,
    /// Product name from the image's version resource.
    #[serde(default)]
    pub product: Option<String>,
    /// Company name from the image's version resource.
    #[serde(default)]
    pub company: Option<String>,
    /// Original file name from the image's version resource.
    #[serde(default)]
    pub original_file_name: Option<String>,
    /// Full command line.
    #[serde(default)]
    pub command_line: Option<String>,
    /// Working directory at launch.
    #[serde(default)]
    pub current_directory: Option<String>,
    /// Account the process runs as.
    #[serde(default)]
    pub user: Option<String>,
    /// Logon session GUID.
    #[serde(default)]
    pub logon_guid: Option<String>,
    /// Logon session id (hex, e.g. `0x3e7`).
    #[serde(default)]
    pub logon_id: Option<String>,
    /// Terminal session id.
    #[serde(default, deserialize_with = "native_or_text")]
    pub terminal_session_id: Option<u32>,
    /// Integrity level (`High`, `Medium`, `System`).
    #[serde(default)]
    pub integrity_level: Option<String>,
    /// Image hashes, one `ALGO=HEX` entry per algorithm.
    #[serde(default, deserialize_with = "comma_list")]
    pub hashes: Vec<String>,
    /// GUID of the parent process.
    #[serde(default)]
    pub parent_process_guid: Option<String>,
    /// PID of the parent process.
    #[serde(default, deserialize_with = "native_or_text")]
    pub parent_process_id: Option<u32>,
    /// Image path of the parent process.
    #[serde(default)]
    pub parent_image: Option<String>,
    /// Command line of the parent process.
    #[serde(default)]
    pub parent_command_line: Option<String>,
    /// Account the parent process runs as.
    #[serde(default)]
    pub parent_user: Option<String>,
}

// ---------------------------------------------------------------------------
// Event 3 -- Network connection detected
// ---------------------------------------------------------------------------

/// Sysmon event 3: a TCP/UDP connection was observed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, SimpleObject, TS)]
#[graphql(name = "NetworkConnectionEve", rename_fields = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub struct NetworkConnectionEvent {
    /// Winlogbeat agent host name.
    #[serde(default)]
    pub agent_name: Option<String>,
    /// Winlogbeat agent identifier.
    #[serde(default)]
    pub agent_id: Option<String>,
    /// Sysmon event label (`Network connection detected`).
    #[serde(default)]
    pub event_action: Option<String>,
    /// Event time as written by Sysmon (`UtcTime`).
    #[serde(default)]
    pub utc_time: Option<String>,
    /// GUID of the connecting process.
    #[serde(default)]
    pub process_guid: Option<String>,
    /// PID of the connecting process.
    #[serde(default, deserialize_with = "native_or_text")]
    pub process_id: Option<u32>,
    /// Image path of the connecting process.
    #[serde(default)]
    pub image: Option<String>,
    /// Account the process runs as.
    #[serde(default)]
    pub user: Option<String>,
    /// Transport protocol (`tcp`, `udp`).
    #[serde(default)]
    pub protocol: Option<String>,
    /// Whether the local process initiated the connection.
    #[serde(default, deserialize_with = "native_or_text")]
    pub initiated: Option<bool>,
    /// Whether the source address is IPv6.
    #[serde(default, deserialize_with = "native_or_text")]
    pub source_is_ipv6: Option<bool>,
    /// Source address.
    #[serde(default)]
    pub source_ip: Option<String>,
    /// Source host name.
    #[serde(default)]
    pub source_hostname: Option<String>,
    /// Source port.
    #[serde(default, deserialize_with = "native_or_text")]
    pub source_port: Option<u16>,
    /// Source port service name.
    #[serde(default)]
    pub source_port_name: Option<String>,
    /// Whether the destination address is IPv6.
    #[serde(default, deserialize_with = "native_or_text")]
    pub destination_is_ipv6: Option<bool>,
    /// Destination address.
    #[serde(default)]
    pub destination_ip: Option<String>,
    /// Destination host name.
    #[serde(default)]
    pub destination_hostname: Option<String>,
    /// Destination port.
    #[serde(default, deserialize_with = "native_or_text")]
    pub destination_port: Option<u16>,
    /// Destination port service name.
    #[serde(default)]
    pub destination_port_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Union
// ---------------------------------------------------------------------------

/// Any served Sysmon event. Exposed as the `SysmonEvent` GraphQL union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Union)]
#[serde(untagged)]
#[allow(clippy::large_enum_variant)]
pub enum SysmonEvent {
    /// `RegValueSetEve` member.
    RegistryValueSet(RegistryValueSetEvent),
    /// `ProcessCreateEve` member.
    ProcessCreate(ProcessCreateEvent),
    /// `NetworkConnectionEve` member.
    NetworkConnection(NetworkConnectionEvent),
}

impl SysmonEvent {
    /// Decode a cached JSON payload, picking the member type from the
    /// payload's shape via [`resolve_type`].
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the payload does not fit the
    /// resolved record type.
    pub fn from_payload(payload: serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::decode(resolve_type(&payload), payload)
    }

    /// Decode a cached JSON payload as a known node type.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the payload does not fit the
    /// record type of `node_type`.
    pub fn decode(
        node_type: NodeType,
        payload: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match node_type {
            NodeType::RegistryValueSet => Self::RegistryValueSet(serde_json::from_value(payload)?),
            NodeType::NetworkConnection => {
                Self::NetworkConnection(serde_json::from_value(payload)?)
            }
            NodeType::ProcessCreate => Self::ProcessCreate(serde_json::from_value(payload)?),
        })
    }

    /// The node type of this event.
    pub const fn node_type(&self) -> NodeType {
        match self {
            Self::RegistryValueSet(_) => NodeType::RegistryValueSet,
            Self::ProcessCreate(_) => NodeType::ProcessCreate,
            Self::NetworkConnection(_) => NodeType::NetworkConnection,
        }
    }

    /// PID of the process the event is about.
    pub const fn process_id(&self) -> Option<u32> {
        match self {
            Self::RegistryValueSet(e) => e.process_id,
            Self::ProcessCreate(e) => e.process_id,
            Self::NetworkConnection(e) => e.process_id,
        }
    }

    /// Account the process runs as.
    pub fn user(&self) -> Option<&str> {
        match self {
            Self::RegistryValueSet(e) => e.user.as_deref(),
            Self::ProcessCreate(e) => e.user.as_deref(),
            Self::NetworkConnection(e) => e.user.as_deref(),
        }
    }

    /// Winlogbeat agent identifier.
    pub fn agent_id(&self) -> Option<&str> {
        match self {
            Self::RegistryValueSet(e) => e.agent_id.as_deref(),
            Self::ProcessCreate(e) => e.agent_id.as_deref(),
            Self::NetworkConnection(e) => e.agent_id.as_deref(),
        }
    }
}

/// Pick the union member for a raw payload.
///
/// A truthy `event_type` means a registry event, otherwise a truthy
/// `protocol` means a network event, otherwise the payload is treated as
/// a process creation.
pub fn resolve_type(payload: &serde_json::Value) -> NodeType {
    if is_truthy(payload.get("event_type")) {
        NodeType::RegistryValueSet
    } else if is_truthy(payload.get("protocol")) {
        NodeType::NetworkConnection
    } else {
        NodeType::ProcessCreate
    }
}

fn is_truthy(value: Option<&serde_json::Value>) -> bool {
    use serde_json::Value;

    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

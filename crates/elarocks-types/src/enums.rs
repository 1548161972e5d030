//! Enumeration types for Sysmon events.
//!
//! [`NodeType`] is the label Sysmon writes into `event.action`. The same
//! label prefixes every record key in the cache and tags every row in the
//! time index, so it is the join point between the two stores.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Label of a Sysmon event kind served by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum NodeType {
    /// Sysmon event 13, `Registry value set`.
    #[serde(rename = "Registry value set")]
    RegistryValueSet,
    /// Sysmon event 1, `Process Create`.
    #[serde(rename = "Process Create")]
    ProcessCreate,
    /// Sysmon event 3, `Network connection detected`.
    #[serde(rename = "Network connection detected")]
    NetworkConnection,
}

impl NodeType {
    /// All node types in `eventList` concatenation order.
    pub const ALL: [Self; 3] = [
        Self::ProcessCreate,
        Self::RegistryValueSet,
        Self::NetworkConnection,
    ];

    /// The label stored in `event.action` and used as the key prefix.
    pub const fn label(self) -> &'static str {
        match self {
            Self::RegistryValueSet => "Registry value set",
            Self::ProcessCreate => "Process Create",
            Self::NetworkConnection => "Network connection detected",
        }
    }

    /// Name of the GraphQL object type (and typed query field).
    pub const fn graphql_name(self) -> &'static str {
        match self {
            Self::RegistryValueSet => "RegValueSetEve",
            Self::ProcessCreate => "ProcessCreateEve",
            Self::NetworkConnection => "NetworkConnectionEve",
        }
    }

    /// Sysmon event code (`event.code` in Winlogbeat indices).
    pub const fn event_code(self) -> u32 {
        match self {
            Self::ProcessCreate => 1,
            Self::NetworkConnection => 3,
            Self::RegistryValueSet => 13,
        }
    }

    /// Look up a node type by Sysmon event code.
    pub const fn from_event_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::ProcessCreate),
            3 => Some(Self::NetworkConnection),
            13 => Some(Self::RegistryValueSet),
            _ => None,
        }
    }

    /// Look up a node type by its GraphQL type name.
    pub fn from_graphql_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.graphql_name() == name)
    }

    /// Build the cache key `{label}_{savedtime}` for a record.
    pub fn cache_key(self, savedtime: &str) -> String {
        format!("{}_{savedtime}", self.label())
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A node type label that is not one of the served Sysmon events.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid node type: {0}")]
pub struct UnknownNodeType(pub String);

impl FromStr for NodeType {
    type Err = UnknownNodeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.label() == s)
            .ok_or_else(|| UnknownNodeType(s.to_owned()))
    }
}
